//! Report endpoints, manager only. The period is a path token so an
//! unknown period is rejected before any event is fetched.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    analytics::{Report, ReportPeriod},
    auth::AuthenticatedEmployee,
    errors::ServiceError,
    ApiResponse, AppState,
};

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/:period", get(get_report))
        .route("/:period/export", post(export_report))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExportResponse {
    pub period: ReportPeriod,
    pub path: String,
}

/// Compute the report for a period over the window ending now
#[utoipa::path(
    get,
    path = "/api/v1/reports/{period}",
    params(("period" = String, Path, description = "daily, weekly, monthly or yearly")),
    responses(
        (status = 200, description = "Full report", body = ApiResponse<Report>),
        (status = 400, description = "Unknown period", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 503, description = "Event store unavailable", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_report(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Path(period): Path<String>,
) -> Result<Json<ApiResponse<Report>>, ServiceError> {
    caller.require_manager()?;
    let period = ReportPeriod::parse(&period)?;
    let report = state.services.reports.generate_report(period).await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Compute the report and write its CSV files under the report directory
#[utoipa::path(
    post,
    path = "/api/v1/reports/{period}/export",
    params(("period" = String, Path, description = "daily, weekly, monthly or yearly")),
    responses(
        (status = 200, description = "Report exported", body = ApiResponse<ExportResponse>),
        (status = 400, description = "Unknown period", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 500, description = "Export failed", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn export_report(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Path(period): Path<String>,
) -> Result<Json<ApiResponse<ExportResponse>>, ServiceError> {
    caller.require_manager()?;
    let period = ReportPeriod::parse(&period)?;
    let (_, dir) = state.services.reports.generate_and_export(period).await?;
    Ok(Json(ApiResponse::success(ExportResponse {
        period,
        path: dir.display().to_string(),
    })))
}
