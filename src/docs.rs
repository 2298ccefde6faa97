use crate::api::attendance::{
    AttendanceListResponse, AttendanceQuery, SubmitActionRequest, TodayStatusResponse,
};
use crate::api::employee::UpsertEmployeeConfig;
use crate::api::sync::{SyncItemResult, SyncRequest, SyncResponse};
use crate::engine::replay::{PendingAction, PendingState};
use crate::model::attendance::{AttendanceAction, AttendanceRecord, AttendanceStatus};
use crate::model::employee_config::EmployeeConfig;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendly API",
        version = "1.0.0",
        description = r#"
## Employee attendance service

Tracks the four daily attendance actions (check-in, break-in, break-out,
check-out) against per-employee office-hours configuration.

### 🔹 Key Features
- **Action submission**
  - Classifies each check-in as on-time / grace / late, grace-window and
    overnight-shift aware
  - Enforces the legal action order through an explicit per-day state machine
  - One break cycle per day; break overruns are flagged, never blocking
- **Offline sync**
  - Replays a device's queued actions in order, classifying each outcome as
    synced, permanently rejected, or still pending
- **Review**
  - Current-day status per employee, and paginated administrative listing
- **Employee directory**
  - Per-employee office hours, grace period, and break allowance

### 📦 Response Format
- JSON-based RESTful responses
- Guard violations return `{"error": "..."}` with status 400

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::submit,
        crate::api::attendance::today_status,
        crate::api::attendance::list_attendance,

        crate::api::sync::sync,

        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::upsert_employee
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceStatus,
            AttendanceAction,
            SubmitActionRequest,
            TodayStatusResponse,
            AttendanceQuery,
            AttendanceListResponse,
            PendingAction,
            PendingState,
            SyncRequest,
            SyncItemResult,
            SyncResponse,
            EmployeeConfig,
            UpsertEmployeeConfig
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance action and review APIs"),
        (name = "Sync", description = "Offline queue reconciliation APIs"),
        (name = "Employee", description = "Employee configuration APIs"),
    )
)]
pub struct ApiDoc;
