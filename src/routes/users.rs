use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::users::{Profile, UpdateProfileRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(get_profile).put(update_profile))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Profile of the current user", body = ApiResponse<Profile>),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Profile>>> {
    Ok(Json(user_service::get_profile(&state, &user).await?))
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<Profile>),
        (status = 400, description = "Invalid input or region"),
        (status = 409, description = "Email or phone already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    Ok(Json(
        user_service::update_profile(&state, &user, payload).await?,
    ))
}
