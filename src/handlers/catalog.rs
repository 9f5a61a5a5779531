//! Food and drink catalog endpoints. Reads are open to any authenticated
//! employee; writes are manager only.

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
    entities::{drink, food},
    errors::ServiceError,
    services::catalog::{CreateItemRequest, UpdateItemRequest},
    ApiResponse, AppState,
};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", post(create_food).get(list_foods))
        .route(
            "/foods/:id",
            get(get_food).put(update_food).delete(delete_food),
        )
        .route("/drinks", post(create_drink).get(list_drinks))
        .route(
            "/drinks/:id",
            get(get_drink).put(update_drink).delete(delete_drink),
        )
}

#[utoipa::path(
    post,
    path = "/api/v1/catalog/foods",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Food created", body = ApiResponse<food::Model>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_food(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<food::Model>>), ServiceError> {
    caller.require_manager()?;
    let created = state.services.catalog.create_food(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/foods",
    responses((status = 200, description = "All foods", body = ApiResponse<Vec<food::Model>>)),
    security(("Bearer" = []))
)]
pub async fn list_foods(
    State(state): State<AppState>,
    _caller: AuthenticatedEmployee,
) -> Result<Json<ApiResponse<Vec<food::Model>>>, ServiceError> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.list_foods().await?,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/foods/{id}",
    params(("id" = Uuid, Path, description = "Food id")),
    responses(
        (status = 200, description = "Food found", body = ApiResponse<food::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_food(
    State(state): State<AppState>,
    _caller: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<food::Model>>, ServiceError> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.get_food(id).await?,
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/catalog/foods/{id}",
    params(("id" = Uuid, Path, description = "Food id")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Food updated", body = ApiResponse<food::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_food(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<ApiResponse<food::Model>>, ServiceError> {
    caller.require_manager()?;
    Ok(Json(ApiResponse::success(
        state.services.catalog.update_food(id, request).await?,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/catalog/foods/{id}",
    params(("id" = Uuid, Path, description = "Food id")),
    responses(
        (status = 204, description = "Food deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_food(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    caller.require_manager()?;
    state.services.catalog.delete_food(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/catalog/drinks",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Drink created", body = ApiResponse<drink::Model>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_drink(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<drink::Model>>), ServiceError> {
    caller.require_manager()?;
    let created = state.services.catalog.create_drink(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/drinks",
    responses((status = 200, description = "All drinks", body = ApiResponse<Vec<drink::Model>>)),
    security(("Bearer" = []))
)]
pub async fn list_drinks(
    State(state): State<AppState>,
    _caller: AuthenticatedEmployee,
) -> Result<Json<ApiResponse<Vec<drink::Model>>>, ServiceError> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.list_drinks().await?,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/drinks/{id}",
    params(("id" = Uuid, Path, description = "Drink id")),
    responses(
        (status = 200, description = "Drink found", body = ApiResponse<drink::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_drink(
    State(state): State<AppState>,
    _caller: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<drink::Model>>, ServiceError> {
    Ok(Json(ApiResponse::success(
        state.services.catalog.get_drink(id).await?,
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/catalog/drinks/{id}",
    params(("id" = Uuid, Path, description = "Drink id")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Drink updated", body = ApiResponse<drink::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_drink(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<ApiResponse<drink::Model>>, ServiceError> {
    caller.require_manager()?;
    Ok(Json(ApiResponse::success(
        state.services.catalog.update_drink(id, request).await?,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/catalog/drinks/{id}",
    params(("id" = Uuid, Path, description = "Drink id")),
    responses(
        (status = 204, description = "Drink deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_drink(
    State(state): State<AppState>,
    caller: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    caller.require_manager()?;
    state.services.catalog.delete_drink(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
