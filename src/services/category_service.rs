use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};

use crate::{
    audit,
    dto::categories::{CategoryList, CategoryRequest},
    entity::categories::{ActiveModel, Column, Entity as Categories},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    Ok(ApiResponse::success("Ok", CategoryList { items }, None))
}

pub async fn get_category(state: &AppState, id: i64) -> AppResult<ApiResponse<Category>> {
    let category = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found"))?;
    Ok(ApiResponse::success("OK", Category::from(category), None))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let name = category_name(&payload)?;
    ensure_name_free(&state.orm, &name, None).await?;

    let category = ActiveModel {
        id: NotSet,
        name: Set(name),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Category created",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let name = category_name(&payload)?;
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found"))?;
    ensure_name_free(&state.orm, &name, Some(id)).await?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(name);
    let category = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_update",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

/// Deletes an unused category. Products keep a hard reference to their
/// category, so a category still in use is a conflict.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = match Categories::delete_by_id(id).exec(&state.orm).await {
        Ok(result) => result,
        Err(err) if matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) => {
            return Err(AppError::Conflict("Category still has products".into()));
        }
        Err(err) => return Err(err.into()),
    };
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Category not found"));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn category_name(payload: &CategoryRequest) -> AppResult<String> {
    let name = payload.name.trim();
    if name.chars().count() < 2 {
        return Err(AppError::BadRequest(
            "name must be at least 2 characters".into(),
        ));
    }
    Ok(name.to_string())
}

async fn ensure_name_free<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    except: Option<i64>,
) -> AppResult<()> {
    let mut finder = Categories::find().filter(Column::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(conn).await?.is_some() {
        return Err(AppError::Conflict("Category already exists".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_name_is_trimmed() {
        let req = CategoryRequest {
            name: "  Elektronik ".into(),
        };
        assert_eq!(category_name(&req).unwrap(), "Elektronik");
    }

    #[test]
    fn single_character_name_is_rejected() {
        let req = CategoryRequest { name: " x ".into() };
        assert!(matches!(category_name(&req), Err(AppError::BadRequest(_))));
    }
}
