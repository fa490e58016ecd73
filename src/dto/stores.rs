use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Store;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct StoreList {
    #[schema(value_type = Vec<Store>)]
    pub items: Vec<Store>,
}
