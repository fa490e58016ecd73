use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;

use crate::{
    audit,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        name,
        email,
        phone,
        password,
    } = payload;
    let (name, email, phone) = (
        name.trim().to_string(),
        email.trim().to_lowercase(),
        phone.trim().to_string(),
    );

    let errors = validate_registration(&name, &email, &phone, &password);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let exist: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict("Email is already taken".to_string()));
    }

    let exist: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE phone = $1")
        .bind(phone.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict("Phone is already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;

    // Every user owns exactly one store, created alongside the account.
    let mut tx = state.pool.begin().await?;
    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, phone, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, email, phone, is_admin, created_at
        "#,
    )
    .bind(name.as_str())
    .bind(email.as_str())
    .bind(phone.as_str())
    .bind(password_hash)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO stores (user_id, name) VALUES ($1, $2)")
        .bind(user.id)
        .bind(user.name.as_str())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { phone, password } = payload;
    let row: Option<(i64, bool, String)> =
        sqlx::query_as("SELECT id, is_admin, password_hash FROM users WHERE phone = $1")
            .bind(phone.trim())
            .fetch_optional(&state.pool)
            .await?;

    let (user_id, is_admin, password_hash) = match row {
        Some(r) => r,
        None => return Err(AppError::Unauthorized("Invalid phone or password".into())),
    };

    let parsed_hash = PasswordHash::new(&password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized("Invalid phone or password".into()));
    }

    let token = issue_token(
        user_id,
        is_admin,
        &state.config.jwt_secret,
        state.config.jwt_exp_days,
    )?;

    audit::record(
        &state.pool,
        Some(user_id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
        },
        Some(Meta::empty()),
    ))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn issue_token(user_id: i64, is_admin: bool, secret: &str, exp_days: i64) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(exp_days))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        is_admin,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn validate_registration(name: &str, email: &str, phone: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push("name is required".to_string());
    }
    if !valid_email(email) {
        errors.push("email is invalid".to_string());
    }
    if !valid_phone(phone) {
        errors.push("phone must be 10-15 digits".to_string());
    }
    if !valid_password(password) {
        errors.push("password must be at least 6 characters".to_string());
    }
    errors
}

pub(crate) fn valid_email(email: &str) -> bool {
    email.contains('@') && !email.starts_with('@') && !email.ends_with('@')
}

pub(crate) fn valid_phone(phone: &str) -> bool {
    (10..=15).contains(&phone.len()) && phone.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn valid_password(password: &str) -> bool {
    password.len() >= 6
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_token;

    #[test]
    fn registration_collects_all_errors() {
        let errors = validate_registration("", "nope", "12ab", "123");
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn registration_accepts_valid_input() {
        assert!(validate_registration("Budi", "budi@example.com", "081234567890", "secret1").is_empty());
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let token = issue_token(42, true, "test-secret", 7).unwrap();
        let user = decode_token(&token, "test-secret").unwrap();
        assert_eq!(user.user_id, 42);
        assert!(user.is_admin);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(42, false, "test-secret", 7).unwrap();
        let err = decode_token(&token, "another-secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("secret1").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"secret1", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }
}
