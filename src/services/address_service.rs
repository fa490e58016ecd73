use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::{
    audit,
    dto::addresses::{AddressList, AddressQuery, AddressRequest},
    entity::addresses::{ActiveModel, Column, Entity as Addresses, Model as AddressModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Address,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
    query: AddressQuery,
) -> AppResult<ApiResponse<AddressList>> {
    let mut condition = Condition::all().add(Column::UserId.eq(user.user_id));
    if let Some(title) = query.title.as_ref().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        condition = condition.add(Expr::col(Column::Title).ilike(format!("%{}%", title)));
    }

    let items = Addresses::find()
        .filter(condition)
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Address::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        AddressList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_address(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Address>> {
    let address = find_owned(state, user, id).await?;
    Ok(ApiResponse::success("OK", Address::from(address), None))
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let payload = payload.normalized().map_err(AppError::Validation)?;

    let address = ActiveModel {
        id: NotSet,
        user_id: Set(user.user_id),
        title: Set(payload.title),
        recipient_name: Set(payload.recipient_name),
        phone: Set(payload.phone),
        detail: Set(payload.detail),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "address_create",
        "addresses",
        serde_json::json!({ "address_id": address.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Address created",
        Address::from(address),
        Some(Meta::empty()),
    ))
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let existing = find_owned(state, user, id).await?;
    let payload = payload.normalized().map_err(AppError::Validation)?;

    let mut active: ActiveModel = existing.into();
    active.title = Set(payload.title);
    active.recipient_name = Set(payload.recipient_name);
    active.phone = Set(payload.phone);
    active.detail = Set(payload.detail);
    active.updated_at = Set(Utc::now().into());
    let address = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        Address::from(address),
        Some(Meta::empty()),
    ))
}

pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    find_owned(state, user, id).await?;
    Addresses::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_owned(state: &AppState, user: &AuthUser, id: i64) -> AppResult<AddressModel> {
    let address = Addresses::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Address not found"))?;
    if address.user_id != user.user_id {
        return Err(AppError::forbidden());
    }
    Ok(address)
}
