use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::{
    audit,
    dto::users::{Profile, ProfileCity, ProfileProvince, UpdateProfileRequest},
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::{
        auth_service::{hash_password, valid_email, valid_password, valid_phone},
        region_service::{RegionClient, RegionError},
    },
    state::AppState,
};

const BIRTH_DATE_FORMAT: &str = "%d/%m/%Y";

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Profile>> {
    let model = find_user(state, user.user_id).await?;
    let profile = to_profile(&state.regions, model).await;
    Ok(ApiResponse::success("OK", profile, None))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Profile>> {
    let existing = find_user(state, user.user_id).await?;
    let mut errors = Vec::new();

    let name = payload.name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        errors.push("name must not be empty".to_string());
    }
    let email = payload.email.as_deref().map(|e| e.trim().to_lowercase());
    if email.as_deref().is_some_and(|e| !valid_email(e)) {
        errors.push("email is invalid".to_string());
    }
    let phone = payload.phone.as_deref().map(str::trim);
    if phone.is_some_and(|p| !valid_phone(p)) {
        errors.push("phone must be 10-15 digits".to_string());
    }
    if payload.password.as_deref().is_some_and(|p| !valid_password(p)) {
        errors.push("password must be at least 6 characters".to_string());
    }
    let birth_date = match payload.birth_date.as_deref().map(parse_birth_date) {
        Some(Ok(date)) => Some(date),
        Some(Err(message)) => {
            errors.push(message);
            None
        }
        None => None,
    };
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if let Some(email) = email.as_deref() {
        ensure_unique(state, Column::Email, email, user.user_id, "Email is already taken").await?;
    }
    if let Some(phone) = phone {
        ensure_unique(state, Column::Phone, phone, user.user_id, "Phone is already taken").await?;
    }

    let province_id = payload
        .province_id
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.province_id)
        .to_string();
    let city_id = payload
        .city_id
        .as_deref()
        .map(str::trim)
        .unwrap_or(&existing.city_id)
        .to_string();
    if payload.province_id.is_some() || payload.city_id.is_some() {
        check_region(&state.regions, &province_id, &city_id).await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name.to_string());
    }
    if let Some(email) = email {
        active.email = Set(email);
    }
    if let Some(phone) = phone {
        active.phone = Set(phone.to_string());
    }
    if let Some(password) = payload.password.as_deref() {
        active.password_hash = Set(hash_password(password)?);
    }
    if let Some(birth_date) = birth_date {
        active.birth_date = Set(birth_date);
    }
    if let Some(job) = payload.job.as_deref() {
        active.job = Set(job.trim().to_string());
    }
    active.province_id = Set(province_id);
    active.city_id = Set(city_id);
    active.updated_at = Set(Utc::now().into());
    let model = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "profile_update",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    let profile = to_profile(&state.regions, model).await;
    Ok(ApiResponse::success("Updated", profile, Some(Meta::empty())))
}

/// `""` clears the date; anything else must be `dd/mm/yyyy`.
pub fn parse_birth_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, BIRTH_DATE_FORMAT)
        .map(Some)
        .map_err(|_| "birth_date must be dd/mm/yyyy".to_string())
}

/// A city, when set, must exist and belong to the chosen province.
async fn check_region(regions: &RegionClient, province_id: &str, city_id: &str) -> AppResult<()> {
    if province_id.is_empty() {
        if city_id.is_empty() {
            return Ok(());
        }
        return Err(AppError::BadRequest("province_id is required with city_id".into()));
    }

    if city_id.is_empty() {
        return match regions.province(province_id).await {
            Ok(_) => Ok(()),
            Err(RegionError::NotFound | RegionError::InvalidId) => {
                Err(AppError::BadRequest("province_id is invalid".into()))
            }
            Err(err) => Err(err.into()),
        };
    }

    match regions.city(city_id).await {
        Ok(city) if city.province_id == province_id => Ok(()),
        Ok(_) => Err(AppError::BadRequest(
            "city_id does not belong to province_id".into(),
        )),
        Err(RegionError::NotFound | RegionError::InvalidId) => {
            Err(AppError::BadRequest("city_id is invalid".into()))
        }
        Err(err) => Err(err.into()),
    }
}

async fn ensure_unique(
    state: &AppState,
    column: Column,
    value: &str,
    user_id: i64,
    message: &str,
) -> AppResult<()> {
    let taken = Users::find()
        .filter(column.eq(value))
        .filter(Column::Id.ne(user_id))
        .one(&state.orm)
        .await?
        .is_some();
    if taken {
        return Err(AppError::Conflict(message.to_string()));
    }
    Ok(())
}

async fn find_user(state: &AppState, user_id: i64) -> AppResult<UserModel> {
    Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Region names are looked up best effort; an unreachable directory leaves
/// them empty rather than failing the read.
async fn to_profile(regions: &RegionClient, model: UserModel) -> Profile {
    let province_name = if model.province_id.is_empty() {
        String::new()
    } else {
        match regions.province(&model.province_id).await {
            Ok(province) => province.name,
            Err(err) => {
                tracing::warn!(province_id = %model.province_id, error = %err, "province lookup failed");
                String::new()
            }
        }
    };
    let city_name = if model.city_id.is_empty() {
        String::new()
    } else {
        match regions.city(&model.city_id).await {
            Ok(city) => city.name,
            Err(err) => {
                tracing::warn!(city_id = %model.city_id, error = %err, "city lookup failed");
                String::new()
            }
        }
    };

    Profile {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        birth_date: model
            .birth_date
            .map(|d| d.format(BIRTH_DATE_FORMAT).to_string())
            .unwrap_or_default(),
        job: model.job,
        is_admin: model.is_admin,
        province: ProfileProvince {
            id: model.province_id.clone(),
            name: province_name,
        },
        city: ProfileCity {
            id: model.city_id,
            province_id: model.province_id,
            name: city_name,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birth_date_uses_day_first_format() {
        assert_eq!(
            parse_birth_date("17/08/1995"),
            Ok(NaiveDate::from_ymd_opt(1995, 8, 17))
        );
    }

    #[test]
    fn empty_birth_date_clears_it() {
        assert_eq!(parse_birth_date("  "), Ok(None));
    }

    #[test]
    fn iso_birth_date_is_rejected() {
        assert!(parse_birth_date("1995-08-17").is_err());
        assert!(parse_birth_date("31/02/1995").is_err());
    }
}
