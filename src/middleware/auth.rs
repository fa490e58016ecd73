use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{dto::auth::Claims, error::AppError, state::AppState};

/// Identity of the caller, decoded from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub is_admin: bool,
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_admin {
        return Err(AppError::Forbidden("Admin access required".into()));
    }
    Ok(())
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = decoded
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        is_admin: decoded.claims.is_admin,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?
            .trim();

        decode_token(token, &state.config.jwt_secret)
    }
}
