use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::directory::EmployeeDirectory;
use crate::engine::replay::{self, PendingAction, PendingState};
use crate::model::attendance::AttendanceRecord;
use crate::service::attendance;

#[derive(Deserialize, ToSchema)]
pub struct SyncRequest {
    /// The device's pending queue, oldest first.
    pub items: Vec<PendingAction>,
}

#[derive(Serialize, ToSchema)]
pub struct SyncItemResult {
    /// The client-assigned queue entry id.
    pub id: String,
    #[schema(example = "synced")]
    pub state: PendingState,
    /// The rejection message when the entry was permanently rejected.
    #[schema(example = "Already checked in today", nullable = true)]
    pub error: Option<String>,
    pub record: Option<AttendanceRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct SyncResponse {
    pub results: Vec<SyncItemResult>,
}

/// Replay a device's offline queue
///
/// Entries replay independently and in queue order; one entry's permanent
/// rejection never stops the ones behind it. The client keeps only entries
/// that come back `pending`.
#[utoipa::path(
    post,
    path = "/api/attendance/sync",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Per-entry terminal states, in queue order", body = SyncResponse),
    ),
    tag = "Sync"
)]
pub async fn sync(
    pool: web::Data<MySqlPool>,
    directory: web::Data<EmployeeDirectory>,
    body: web::Json<SyncRequest>,
) -> actix_web::Result<impl Responder> {
    let mut results = Vec::with_capacity(body.items.len());

    for item in &body.items {
        let outcome = attendance::submit_action(
            pool.get_ref(),
            directory.get_ref(),
            &item.employee_id,
            &item.employee_name,
            item.action,
            // The instant captured when the action was initiated, so a replay
            // an hour later still classifies against the original time.
            item.timestamp,
        )
        .await;

        let state = replay::disposition(&outcome).terminal_state();
        let (record, error) = match outcome {
            Ok(record) => (Some(record), None),
            Err(err) => (None, Some(err.to_string())),
        };

        results.push(SyncItemResult {
            id: item.id.clone(),
            state,
            error,
            record,
        });
    }

    Ok(HttpResponse::Ok().json(SyncResponse { results }))
}
