use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::{
        categories::Entity as Categories,
        product_photos::{
            ActiveModel as PhotoActive, Column as PhotoCol, Entity as ProductPhotos,
            Model as PhotoModel,
        },
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::store_service,
    state::AppState,
};

const SLUG_ATTEMPTS: usize = 1000;

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }
    if let Some(store_id) = query.store_id {
        condition = condition.add(Column::StoreId.eq(store_id));
    }
    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::ConsumerPrice.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::ConsumerPrice.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::ConsumerPrice,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let products = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    let mut photos: HashMap<i64, Vec<PhotoModel>> = HashMap::new();
    for photo in ProductPhotos::find()
        .filter(PhotoCol::ProductId.is_in(ids))
        .order_by_asc(PhotoCol::Id)
        .all(&state.orm)
        .await?
    {
        photos.entry(photo.product_id).or_default().push(photo);
    }

    let items = products
        .into_iter()
        .map(|p| {
            let product_photos = photos.remove(&p.id).unwrap_or_default();
            Product::from_entity(p, product_photos)
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: i64) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    let product = with_photos(&state.orm, product).await?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let store = store_service::find_by_owner(state, user.user_id).await?;

    let mut errors = Vec::new();
    let name = payload.name.trim().to_string();
    if name.chars().count() < 3 {
        errors.push("name must be at least 3 characters".to_string());
    }
    if payload.reseller_price < 0 || payload.consumer_price < 0 || payload.stock < 0 {
        errors.push("reseller_price, consumer_price and stock must be >= 0".to_string());
    }
    if Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        errors.push("category_id is invalid".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let txn = state.orm.begin().await?;
    let slug = unique_slug(&txn, &name).await?;
    let product = ActiveModel {
        id: NotSet,
        store_id: Set(store.id),
        category_id: Set(payload.category_id),
        name: Set(name),
        slug: Set(slug),
        reseller_price: Set(payload.reseller_price),
        consumer_price: Set(payload.consumer_price),
        stock: Set(payload.stock),
        description: Set(payload.description.trim().to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    add_photos(&txn, product.id, payload.photo_urls).await?;
    let product = with_photos(&txn, product).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = find_owned(state, user, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name.map(|n| n.trim().to_string()) {
        if name.chars().count() < 3 {
            return Err(AppError::BadRequest(
                "name must be at least 3 characters".into(),
            ));
        }
        active.name = Set(name);
    }
    if let Some(category_id) = payload.category_id {
        if Categories::find_by_id(category_id)
            .one(&state.orm)
            .await?
            .is_none()
        {
            return Err(AppError::BadRequest("category_id is invalid".into()));
        }
        active.category_id = Set(category_id);
    }
    for (value, field) in [
        (payload.reseller_price, "reseller_price"),
        (payload.consumer_price, "consumer_price"),
        (payload.stock.map(i64::from), "stock"),
    ] {
        if value.is_some_and(|v| v < 0) {
            return Err(AppError::BadRequest(format!("{field} must be >= 0")));
        }
    }
    if let Some(price) = payload.reseller_price {
        active.reseller_price = Set(price);
    }
    if let Some(price) = payload.consumer_price {
        active.consumer_price = Set(price);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(description) = payload.description {
        active.description = Set(description.trim().to_string());
    }
    active.updated_at = Set(Utc::now().into());

    let txn = state.orm.begin().await?;
    let product = active.update(&txn).await?;
    add_photos(&txn, product.id, payload.photo_urls).await?;
    let product = with_photos(&txn, product).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

/// Removes a product. Snapshots taken by earlier orders are kept.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    find_owned(state, user, id).await?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Product not found"));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Lowercases, collapses non-alphanumeric runs into `-` and trims dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

async fn unique_slug<C: ConnectionTrait>(conn: &C, name: &str) -> AppResult<String> {
    let mut base = slugify(name);
    if base.is_empty() {
        base = format!("product-{}", Utc::now().timestamp());
    }

    let mut slug = base.clone();
    for i in 1..=SLUG_ATTEMPTS {
        let taken = Products::find()
            .filter(Column::Slug.eq(slug.as_str()))
            .one(conn)
            .await?
            .is_some();
        if !taken {
            return Ok(slug);
        }
        slug = format!("{base}-{i}");
    }
    Err(AppError::Conflict("Could not generate a unique slug".into()))
}

async fn add_photos<C: ConnectionTrait>(conn: &C, product_id: i64, urls: Vec<String>) -> AppResult<()> {
    let photos: Vec<PhotoActive> = urls
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .map(|url| PhotoActive {
            id: NotSet,
            product_id: Set(product_id),
            url: Set(url),
            created_at: NotSet,
        })
        .collect();
    if photos.is_empty() {
        return Ok(());
    }
    ProductPhotos::insert_many(photos).exec(conn).await?;
    Ok(())
}

async fn with_photos<C: ConnectionTrait>(conn: &C, product: ProductModel) -> AppResult<Product> {
    let photos = ProductPhotos::find()
        .filter(PhotoCol::ProductId.eq(product.id))
        .order_by_asc(PhotoCol::Id)
        .all(conn)
        .await?;
    Ok(Product::from_entity(product, photos))
}

async fn find_owned(state: &AppState, user: &AuthUser, id: i64) -> AppResult<ProductModel> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    let store = store_service::find_by_owner(state, user.user_id).await?;
    if product.store_id != store.id {
        return Err(AppError::forbidden());
    }
    Ok(product)
}
