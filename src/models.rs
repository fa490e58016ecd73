use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::entity::{
    addresses::Model as AddressModel, categories::Model as CategoryModel,
    product_photos::Model as PhotoModel, products::Model as ProductModel,
    stores::Model as StoreModel, users::Model as UserModel,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Store {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductPhoto {
    pub id: i64,
    pub product_id: i64,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub store_id: i64,
    pub category_id: i64,
    pub name: String,
    pub slug: String,
    pub reseller_price: i64,
    pub consumer_price: i64,
    pub stock: i32,
    pub description: String,
    pub photos: Vec<ProductPhoto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub recipient_name: String,
    pub phone: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            is_admin: model.is_admin,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<StoreModel> for Store {
    fn from(model: StoreModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            photo_url: model.photo_url,
        }
    }
}

impl From<CategoryModel> for Category {
    fn from(model: CategoryModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

impl From<PhotoModel> for ProductPhoto {
    fn from(model: PhotoModel) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            url: model.url,
        }
    }
}

impl From<AddressModel> for Address {
    fn from(model: AddressModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            recipient_name: model.recipient_name,
            phone: model.phone,
            detail: model.detail,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl Product {
    pub fn from_entity(model: ProductModel, photos: Vec<PhotoModel>) -> Self {
        Self {
            id: model.id,
            store_id: model.store_id,
            category_id: model.category_id,
            name: model.name,
            slug: model.slug,
            reseller_price: model.reseller_price,
            consumer_price: model.consumer_price,
            stock: model.stock,
            description: model.description,
            photos: photos.into_iter().map(ProductPhoto::from).collect(),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
