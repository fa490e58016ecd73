use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::{
    dto::stores::{StoreList, UpdateStoreRequest},
    entity::stores::{ActiveModel, Column, Entity as Stores, Model as StoreModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Store,
    response::{ApiResponse, Meta},
    routes::params::StoreQuery,
    state::AppState,
};

pub async fn list_stores(state: &AppState, query: StoreQuery) -> AppResult<ApiResponse<StoreList>> {
    let (page, limit, offset) = query.normalize();

    let mut finder = Stores::find().order_by_asc(Column::Id);
    if let Some(name) = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        finder = finder.filter(Expr::col(Column::Name).ilike(format!("%{}%", name)));
    }

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Store::from)
        .collect();

    Ok(ApiResponse::success(
        "Stores",
        StoreList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_my_store(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Store>> {
    let store = find_by_owner(state, user.user_id).await?;
    Ok(ApiResponse::success("OK", Store::from(store), None))
}

pub async fn get_store(state: &AppState, id: i64) -> AppResult<ApiResponse<Store>> {
    let store = Stores::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Store not found"))?;
    Ok(ApiResponse::success("OK", Store::from(store), None))
}

pub async fn update_my_store(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateStoreRequest,
) -> AppResult<ApiResponse<Store>> {
    let existing = find_by_owner(state, user.user_id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name.map(|n| n.trim().to_string()) {
        if name.is_empty() {
            return Err(AppError::BadRequest("name must not be empty".into()));
        }
        active.name = Set(name);
    }
    if let Some(photo_url) = payload.photo_url {
        active.photo_url = Set(photo_url.trim().to_string());
    }
    active.updated_at = Set(Utc::now().into());
    let store = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        Store::from(store),
        Some(Meta::empty()),
    ))
}

/// The store owned by `user_id`; every registered user has one.
pub async fn find_by_owner(state: &AppState, user_id: i64) -> AppResult<StoreModel> {
    Stores::find()
        .filter(Column::UserId.eq(user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Store not found"))
}
