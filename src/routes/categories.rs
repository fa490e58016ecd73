use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::categories::{CategoryList, CategoryRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "All categories", body = ApiResponse<CategoryList>)),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    Ok(Json(category_service::list_categories(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Category>>> {
    Ok(Json(category_service::get_category(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Category already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = category_service::create_category(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Renamed category", body = ApiResponse<Category>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    Ok(Json(
        category_service::update_category(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted category"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has products"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        category_service::delete_category(&state, &user, id).await?,
    ))
}
