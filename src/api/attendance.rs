use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::directory::EmployeeDirectory;
use crate::model::attendance::{AttendanceAction, AttendanceRecord, AttendanceStatus};
use crate::service::attendance::{self, RecordFilter, SubmitError};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "employeeId": "MUH002",
        "employeeName": "Muhammad Hassan",
        "action": "checkin",
        "timestamp": "2026-01-05T13:07:00Z"
    })
)]
pub struct SubmitActionRequest {
    pub employee_id: String,
    pub employee_name: String,
    pub action: AttendanceAction,
    #[schema(value_type = String, format = "date-time")]
    pub timestamp: DateTime<Utc>,
}

/// Map a submit outcome to the HTTP surface shared by the live and sync paths.
pub fn error_response(err: SubmitError) -> actix_web::Result<HttpResponse> {
    match err {
        SubmitError::Rejected(_) | SubmitError::UnknownEmployee => {
            Ok(HttpResponse::BadRequest().json(json!({ "error": err.to_string() })))
        }
        SubmitError::Conflict => {
            Ok(HttpResponse::Conflict().json(json!({ "error": err.to_string() })))
        }
        SubmitError::Storage(e) => {
            error!(error = %e, "attendance storage failure");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Submit one attendance action
#[utoipa::path(
    post,
    path = "/api/attendance/submit",
    request_body = SubmitActionRequest,
    responses(
        (status = 201, description = "Action accepted; the current-day record", body = AttendanceRecord),
        (status = 400, description = "Guard violation or unknown employee", body = Object, example = json!({
            "error": "Already checked in today"
        })),
        (status = 409, description = "Lost a concurrent update race", body = Object, example = json!({
            "error": "Attendance record was updated concurrently"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn submit(
    pool: web::Data<MySqlPool>,
    directory: web::Data<EmployeeDirectory>,
    body: web::Json<SubmitActionRequest>,
) -> actix_web::Result<impl Responder> {
    let req = body.into_inner();

    match attendance::submit_action(
        pool.get_ref(),
        directory.get_ref(),
        &req.employee_id,
        &req.employee_name,
        req.action,
        req.timestamp,
    )
    .await
    {
        Ok(record) => Ok(HttpResponse::Created().json(record)),
        Err(err) => error_response(err),
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayStatusResponse {
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub check_in_time: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub check_out_time: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub break_in_time: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub break_out_time: Option<DateTime<Utc>>,
    #[schema(example = "on_time", nullable = true)]
    pub status: Option<AttendanceStatus>,
    #[schema(example = 2700, nullable = true)]
    pub break_duration_seconds: Option<i64>,
    #[schema(example = "09:00:00", value_type = String, format = "time")]
    pub office_start_time: NaiveTime,
    #[schema(example = "17:00:00", value_type = String, format = "time")]
    pub office_end_time: NaiveTime,
}

/// Current-day record for an employee
#[utoipa::path(
    get,
    path = "/api/attendance/today/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee identifier")
    ),
    responses(
        (status = 200, description = "Today's record, or all-null fields plus office hours", body = TodayStatusResponse),
        (status = 400, description = "Unknown employee", body = Object, example = json!({
            "error": "Employee configuration not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn today_status(
    pool: web::Data<MySqlPool>,
    directory: web::Data<EmployeeDirectory>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    match attendance::today_status(pool.get_ref(), directory.get_ref(), &employee_id, Utc::now())
        .await
    {
        Ok((config, record)) => {
            let record = record.unwrap_or_else(|| empty_snapshot(&config.employee_id));
            Ok(HttpResponse::Ok().json(TodayStatusResponse {
                check_in_time: record.check_in,
                check_out_time: record.check_out,
                break_in_time: record.break_in,
                break_out_time: record.break_out,
                status: record.check_in.map(|_| record.status),
                break_duration_seconds: record.break_duration_seconds,
                office_start_time: config.office_start_time,
                office_end_time: config.office_end_time,
            }))
        }
        Err(err) => error_response(err),
    }
}

fn empty_snapshot(employee_id: &str) -> AttendanceRecord {
    AttendanceRecord {
        id: String::new(),
        employee_id: employee_id.to_string(),
        employee_name: String::new(),
        date: Utc::now().date_naive(),
        check_in: None,
        check_out: None,
        break_in: None,
        break_out: None,
        status: AttendanceStatus::OnTime,
        break_duration_seconds: None,
        break_overrun: false,
        version: 0,
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Filter by employee ID
    pub employee_id: Option<String>,
    /// Earliest record date (inclusive)
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub from: Option<NaiveDate>,
    /// Latest record date (inclusive)
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub to: Option<NaiveDate>,
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    /// Pagination per page number
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// Administrative attendance review
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Paginated attendance records, newest first", body = AttendanceListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let filter = RecordFilter {
        employee_id: query.employee_id.clone(),
        from: query.from,
        to: query.to,
    };

    let (data, total) = attendance::list_records(pool.get_ref(), &filter, page, per_page)
        .await
        .map_err(|e| {
            error!(error = %e, "attendance list failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data,
        page,
        per_page,
        total,
    }))
}
