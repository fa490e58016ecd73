use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::addresses::{AddressList, AddressQuery, AddressRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Address,
    response::ApiResponse,
    services::address_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_addresses).post(create_address))
        .route(
            "/{id}",
            get(get_address).put(update_address).delete(delete_address),
        )
}

#[utoipa::path(
    get,
    path = "/api/addresses",
    params(AddressQuery),
    responses(
        (status = 200, description = "Addresses of the current user", body = ApiResponse<AddressList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AddressQuery>,
) -> AppResult<Json<ApiResponse<AddressList>>> {
    let resp = address_service::list_addresses(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/addresses",
    request_body = AddressRequest,
    responses(
        (status = 201, description = "Address created", body = ApiResponse<Address>),
        (status = 400, description = "Missing fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn create_address(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddressRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Address>>)> {
    let resp = address_service::create_address(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/addresses/{id}",
    params(("id" = i64, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address", body = ApiResponse<Address>),
        (status = 403, description = "Address belongs to another user"),
        (status = 404, description = "Address not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn get_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::get_address(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/addresses/{id}",
    params(("id" = i64, Path, description = "Address ID")),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Updated address", body = ApiResponse<Address>),
        (status = 403, description = "Address belongs to another user"),
        (status = 404, description = "Address not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn update_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<AddressRequest>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::update_address(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/addresses/{id}",
    params(("id" = i64, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Deleted address"),
        (status = 403, description = "Address belongs to another user"),
        (status = 404, description = "Address not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = address_service::delete_address(&state, &user, id).await?;
    Ok(Json(resp))
}
