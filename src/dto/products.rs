use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub category_id: i64,
    pub reseller_price: i64,
    pub consumer_price: i64,
    pub stock: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub reseller_price: Option<i64>,
    pub consumer_price: Option<i64>,
    pub stock: Option<i32>,
    pub description: Option<String>,
    /// Appended to the existing photos.
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
