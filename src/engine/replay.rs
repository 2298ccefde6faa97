use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceAction, AttendanceRecord};
use crate::service::attendance::SubmitError;

/// An attendance action a device queued while offline. `timestamp` is the
/// server-time estimate captured when the action was originally initiated,
/// not when it is replayed. Classification must use the captured instant.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "1767590400000",
        "employeeId": "MUH002",
        "employeeName": "Muhammad Hassan",
        "action": "checkin",
        "timestamp": "2026-01-05T13:02:00Z"
    })
)]
pub struct PendingAction {
    /// Client-assigned queue entry id, echoed back in the sync response.
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub action: AttendanceAction,
    #[schema(value_type = String, format = "date-time")]
    pub timestamp: DateTime<Utc>,
}

/// Lifecycle of a queue entry. A device drops entries once they leave
/// `Pending`; `PermanentlyRejected` means the server state already reflects
/// the intended outcome (or superseded it), so retrying can never succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PendingState {
    Pending,
    Synced,
    PermanentlyRejected,
}

/// What to do with a queue entry after one replay attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayDisposition {
    /// Applied server-side; drop from the queue.
    Completed,
    /// Permanent rejection; drop from the queue, retrying would never succeed.
    Discarded,
    /// Transient failure; keep queued for the next sync pass.
    Retained,
}

impl ReplayDisposition {
    pub fn terminal_state(self) -> PendingState {
        match self {
            ReplayDisposition::Completed => PendingState::Synced,
            ReplayDisposition::Discarded => PendingState::PermanentlyRejected,
            ReplayDisposition::Retained => PendingState::Pending,
        }
    }
}

/// Classify one replay outcome.
///
/// Guard violations and missing configuration are permanent: the state that
/// caused them will not change by retrying the same action. Version conflicts
/// and storage failures are transient.
pub fn disposition(outcome: &Result<AttendanceRecord, SubmitError>) -> ReplayDisposition {
    match outcome {
        Ok(_) => ReplayDisposition::Completed,
        Err(SubmitError::Rejected(_)) | Err(SubmitError::UnknownEmployee) => {
            ReplayDisposition::Discarded
        }
        Err(SubmitError::Conflict) | Err(SubmitError::Storage(_)) => ReplayDisposition::Retained,
    }
}
