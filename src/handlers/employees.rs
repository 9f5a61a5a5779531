use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::{
    auth::AuthenticatedEmployee,
    entities::employee,
    errors::ServiceError,
    services::employees::{CreateEmployeeRequest, UpdateEmployeeRequest},
    ApiResponse, AppState,
};

pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_employee).get(list_employees))
        .route(
            "/:id",
            get(get_employee)
                .put(update_employee)
                .delete(delete_employee),
        )
}

/// Register a new employee (manager only)
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = ApiResponse<employee::Model>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_employee(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<employee::Model>>), ServiceError> {
    caller.require_manager()?;
    let created = state.services.employees.create_employee(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    responses(
        (status = 200, description = "All employees", body = ApiResponse<Vec<employee::Model>>),
    ),
    security(("Bearer" = []))
)]
pub async fn list_employees(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
) -> Result<Json<ApiResponse<Vec<employee::Model>>>, ServiceError> {
    caller.require_manager()?;
    let employees = state.services.employees.list_employees().await?;
    Ok(Json(ApiResponse::success(employees)))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee found", body = ApiResponse<employee::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_employee(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<employee::Model>>, ServiceError> {
    // employees may look up their own record, managers anyone's
    if caller.id != id {
        caller.require_manager()?;
    }
    let found = state.services.employees.get_employee(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee id")),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Employee updated", body = ApiResponse<employee::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_employee(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Result<Json<ApiResponse<employee::Model>>, ServiceError> {
    caller.require_manager()?;
    let updated = state
        .services
        .employees
        .update_employee(id, request)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    caller.require_manager()?;
    state.services.employees.delete_employee(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
