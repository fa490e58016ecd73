use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Category;

/// Body for creating or renaming a category.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}
