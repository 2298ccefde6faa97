use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveTime;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

use crate::directory::EmployeeDirectory;
use crate::model::employee_config::EmployeeConfig;

#[derive(Deserialize, ToSchema)]
pub struct UpsertEmployeeConfig {
    #[schema(example = "MUH002")]
    pub employee_id: String,
    #[schema(example = "Muhammad Hassan")]
    pub employee_name: String,
    #[schema(example = "13:00:00", value_type = String, format = "time")]
    pub office_start_time: NaiveTime,
    #[schema(example = "21:00:00", value_type = String, format = "time")]
    pub office_end_time: NaiveTime,
    #[schema(example = 8)]
    pub required_hours: u32,
    #[schema(example = false)]
    pub flexible_start: bool,
    #[schema(example = 10)]
    pub grace_period_minutes: u32,
    #[schema(example = 90)]
    pub max_break_duration_minutes: u32,
}

/// List employee configurations
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All configured employees", body = [EmployeeConfig]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    directory: web::Data<EmployeeDirectory>,
) -> actix_web::Result<impl Responder> {
    let configs = directory.list().await.map_err(|e| {
        error!(error = %e, "employee config list failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;
    Ok(HttpResponse::Ok().json(configs))
}

/// Fetch one employee configuration
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = String, Path, description = "Employee identifier")
    ),
    responses(
        (status = 200, description = "The employee's configuration", body = EmployeeConfig),
        (status = 404, description = "Unknown employee", body = Object, example = json!({
            "error": "Employee configuration not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    directory: web::Data<EmployeeDirectory>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let config = directory.lookup(&employee_id).await.map_err(|e| {
        error!(error = %e, employee_id = %employee_id, "employee config lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match config {
        Some(config) => Ok(HttpResponse::Ok().json(config)),
        None => Ok(HttpResponse::NotFound()
            .json(json!({ "error": "Employee configuration not found" }))),
    }
}

/// Provision or replace an employee configuration
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = UpsertEmployeeConfig,
    responses(
        (status = 201, description = "Configuration stored", body = EmployeeConfig),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn upsert_employee(
    directory: web::Data<EmployeeDirectory>,
    body: web::Json<UpsertEmployeeConfig>,
) -> actix_web::Result<impl Responder> {
    let req = body.into_inner();
    let config = EmployeeConfig {
        employee_id: req.employee_id,
        employee_name: req.employee_name,
        office_start_time: req.office_start_time,
        office_end_time: req.office_end_time,
        required_hours: req.required_hours,
        flexible_start: req.flexible_start,
        grace_period_minutes: req.grace_period_minutes,
        max_break_duration_minutes: req.max_break_duration_minutes,
    };

    directory.upsert(&config).await.map_err(|e| {
        error!(error = %e, employee_id = %config.employee_id, "employee config upsert failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(config))
}
