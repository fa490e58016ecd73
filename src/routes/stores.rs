use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::stores::{StoreList, UpdateStoreRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Store,
    response::ApiResponse,
    routes::params::StoreQuery,
    services::store_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stores))
        .route("/mine", get(get_my_store).put(update_my_store))
        .route("/{id}", get(get_store))
}

#[utoipa::path(
    get,
    path = "/api/stores",
    params(StoreQuery),
    responses((status = 200, description = "Stores, oldest first", body = ApiResponse<StoreList>)),
    tag = "Stores"
)]
pub async fn list_stores(
    State(state): State<AppState>,
    Query(query): Query<StoreQuery>,
) -> AppResult<Json<ApiResponse<StoreList>>> {
    Ok(Json(store_service::list_stores(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/stores/mine",
    responses((status = 200, description = "Store of the current user", body = ApiResponse<Store>)),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn get_my_store(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Store>>> {
    Ok(Json(store_service::get_my_store(&state, &user).await?))
}

#[utoipa::path(
    put,
    path = "/api/stores/mine",
    request_body = UpdateStoreRequest,
    responses((status = 200, description = "Updated store", body = ApiResponse<Store>)),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn update_my_store(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateStoreRequest>,
) -> AppResult<Json<ApiResponse<Store>>> {
    Ok(Json(
        store_service::update_my_store(&state, &user, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/stores/{id}",
    params(("id" = i64, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Store", body = ApiResponse<Store>),
        (status = 404, description = "Store not found"),
    ),
    tag = "Stores"
)]
pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Store>>> {
    Ok(Json(store_service::get_store(&state, id).await?))
}
