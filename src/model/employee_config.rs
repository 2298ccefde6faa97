use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-employee office-hours configuration, provisioned by HR and read-only
/// for the attendance engine.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "employee_id": "MUH003",
        "employee_name": "Muhammad Hamdan",
        "office_start_time": "17:00:00",
        "office_end_time": "01:00:00",
        "required_hours": 8,
        "flexible_start": false,
        "grace_period_minutes": 10,
        "max_break_duration_minutes": 90
    })
)]
pub struct EmployeeConfig {
    #[schema(example = "MUH003")]
    pub employee_id: String,

    #[schema(example = "Muhammad Hamdan")]
    pub employee_name: String,

    #[schema(example = "17:00:00", value_type = String, format = "time")]
    pub office_start_time: NaiveTime,

    /// End before start denotes an overnight shift (e.g. 17:00–01:00).
    #[schema(example = "01:00:00", value_type = String, format = "time")]
    pub office_end_time: NaiveTime,

    #[schema(example = 8)]
    pub required_hours: u32,

    /// Flexible-start employees are always on time; they are expected to
    /// complete `required_hours` before checking out instead.
    #[schema(example = false)]
    pub flexible_start: bool,

    #[schema(example = 10)]
    pub grace_period_minutes: u32,

    /// Exceeding this never blocks check-out; it is flagged for reporting.
    #[schema(example = 90)]
    pub max_break_duration_minutes: u32,
}

impl EmployeeConfig {
    /// A shift that spans midnight, e.g. 17:00–01:00.
    pub fn is_overnight_shift(&self) -> bool {
        self.office_start_time > self.office_end_time
    }
}
