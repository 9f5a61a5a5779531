use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    analytics::format_duration_secs, auth::AuthenticatedEmployee, entities::attendance_event,
    errors::ServiceError, ApiResponse, AppState,
};

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/checkin", post(check_in))
        .route("/checkout", post(check_out))
        .route("/status", get(own_status))
        .route("/working-time", get(own_working_time))
        .route("/:employee_id/history", get(history))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkingTimeResponse {
    pub employee_id: Uuid,
    pub total_secs: i64,
    pub total: String,
}

/// Record a check-in for the calling employee
#[utoipa::path(
    post,
    path = "/api/v1/attendance/checkin",
    responses(
        (status = 200, description = "Check-in recorded", body = ApiResponse<attendance_event::Model>),
    ),
    security(("Bearer" = []))
)]
pub async fn check_in(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
) -> Result<Json<ApiResponse<attendance_event::Model>>, ServiceError> {
    let event = state.services.attendance.check_in(caller.id).await?;
    Ok(Json(ApiResponse::success(event)))
}

/// Record a check-out for the calling employee
#[utoipa::path(
    post,
    path = "/api/v1/attendance/checkout",
    responses(
        (status = 200, description = "Check-out recorded", body = ApiResponse<attendance_event::Model>),
    ),
    security(("Bearer" = []))
)]
pub async fn check_out(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
) -> Result<Json<ApiResponse<attendance_event::Model>>, ServiceError> {
    let event = state.services.attendance.check_out(caller.id).await?;
    Ok(Json(ApiResponse::success(event)))
}

/// Latest attendance event for the calling employee
#[utoipa::path(
    get,
    path = "/api/v1/attendance/status",
    responses(
        (status = 200, description = "Latest event, null if none", body = ApiResponse<Option<attendance_event::Model>>),
    ),
    security(("Bearer" = []))
)]
pub async fn own_status(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
) -> Result<Json<ApiResponse<Option<attendance_event::Model>>>, ServiceError> {
    let latest = state.services.attendance.status(caller.id).await?;
    Ok(Json(ApiResponse::success(latest)))
}

/// Work time accumulated over the last 24 hours, ongoing shift included
#[utoipa::path(
    get,
    path = "/api/v1/attendance/working-time",
    responses(
        (status = 200, description = "Accumulated work time", body = ApiResponse<WorkingTimeResponse>),
    ),
    security(("Bearer" = []))
)]
pub async fn own_working_time(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
) -> Result<Json<ApiResponse<WorkingTimeResponse>>, ServiceError> {
    let worked = state
        .services
        .attendance
        .todays_working_time(caller.id, Utc::now())
        .await?;
    let total_secs = worked.num_seconds();
    Ok(Json(ApiResponse::success(WorkingTimeResponse {
        employee_id: caller.id,
        total_secs,
        total: format_duration_secs(total_secs),
    })))
}

/// Full attendance history for an employee (manager only)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/{employee_id}/history",
    params(("employee_id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Events in chronological order", body = ApiResponse<Vec<attendance_event::Model>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn history(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<attendance_event::Model>>>, ServiceError> {
    if caller.id != employee_id {
        caller.require_manager()?;
    }
    let events = state.services.attendance.history(employee_id).await?;
    Ok(Json(ApiResponse::success(events)))
}
