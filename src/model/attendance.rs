use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Check-in classification relative to the configured office start time.
/// Fixed at check-in, never recomputed afterward.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AttendanceStatus {
    OnTime,
    Grace,
    Late,
}

/// The four daily actions, in their only legal order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceAction {
    Checkin,
    Breakin,
    Breakout,
    Checkout,
}

/// Progress of an employee's day, derived from field presence on the
/// persisted record. One-way: Empty → CheckedIn → (OnBreak → BreakDone) → CheckedOut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    Empty,
    CheckedIn,
    OnBreak,
    BreakDone,
    CheckedOut,
}

impl DayState {
    pub fn of(record: Option<&AttendanceRecord>) -> Self {
        let Some(r) = record else {
            return DayState::Empty;
        };
        if r.check_out.is_some() {
            DayState::CheckedOut
        } else if r.break_out.is_some() {
            DayState::BreakDone
        } else if r.break_in.is_some() {
            DayState::OnBreak
        } else {
            DayState::CheckedIn
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "8f14e45f-ea3a-4c5b-9d1e-000000000001",
        "employee_id": "MUH002",
        "employee_name": "Muhammad Hassan",
        "date": "2026-01-05",
        "check_in": "2026-01-05T13:07:00Z",
        "check_out": null,
        "break_in": null,
        "break_out": null,
        "status": "grace",
        "break_duration_seconds": null,
        "break_overrun": false,
        "version": 0
    })
)]
pub struct AttendanceRecord {
    #[schema(example = "8f14e45f-ea3a-4c5b-9d1e-000000000001")]
    pub id: String,

    #[schema(example = "MUH002")]
    pub employee_id: String,

    #[schema(example = "Muhammad Hassan")]
    pub employee_name: String,

    /// UTC calendar date of the accepted check-in; immutable once created.
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2026-01-05T13:07:00Z", value_type = String, format = "date-time", nullable = true)]
    pub check_in: Option<DateTime<Utc>>,

    #[schema(example = "2026-01-05T21:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub check_out: Option<DateTime<Utc>>,

    #[schema(example = "2026-01-05T17:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub break_in: Option<DateTime<Utc>>,

    #[schema(example = "2026-01-05T17:45:00Z", value_type = String, format = "date-time", nullable = true)]
    pub break_out: Option<DateTime<Utc>>,

    #[schema(example = "grace")]
    pub status: AttendanceStatus,

    /// Whole seconds between break_in and break_out; set exactly when both exist.
    #[schema(example = 2700, nullable = true)]
    pub break_duration_seconds: Option<i64>,

    /// True when the completed break exceeded the configured allowance.
    #[schema(example = false)]
    pub break_overrun: bool,

    /// Optimistic-concurrency token, incremented on every update.
    #[schema(example = 0)]
    pub version: u64,
}

impl AttendanceRecord {
    pub fn state(&self) -> DayState {
        DayState::of(Some(self))
    }
}
