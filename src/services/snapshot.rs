use sea_orm::{ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::{
    entity::{
        product_photos::{Column as PhotoCol, Entity as ProductPhotos, Model as PhotoModel},
        product_snapshots::ActiveModel as SnapshotActive,
        products::{Entity as Products, Model as ProductModel},
    },
    error::OrderError,
};

/// Sellable facts of a product, copied at order time and not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDraft {
    pub product_id: i64,
    pub name: String,
    pub slug: String,
    pub reseller_price: i64,
    pub consumer_price: i64,
    pub description: String,
    pub store_id: i64,
    pub category_id: i64,
    pub photo_urls: Vec<String>,
}

impl SnapshotDraft {
    pub fn from_product(product: &ProductModel, photos: &[PhotoModel]) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            reseller_price: product.reseller_price,
            consumer_price: product.consumer_price,
            description: product.description.clone(),
            store_id: product.store_id,
            category_id: product.category_id,
            photo_urls: photos.iter().map(|p| p.url.clone()).collect(),
        }
    }

    pub fn into_active_model(self) -> Result<SnapshotActive, serde_json::Error> {
        let photos_json = serde_json::to_string(&self.photo_urls)?;
        Ok(SnapshotActive {
            id: NotSet,
            product_id: Set(self.product_id),
            name: Set(self.name),
            slug: Set(self.slug),
            reseller_price: Set(self.reseller_price),
            consumer_price: Set(self.consumer_price),
            description: Set(self.description),
            store_id: Set(self.store_id),
            category_id: Set(self.category_id),
            photos_json: Set(photos_json),
            created_at: NotSet,
        })
    }
}

/// Loads the live product with its photos and copies it into a draft.
pub async fn snapshot<C: ConnectionTrait>(
    conn: &C,
    product_id: i64,
) -> Result<SnapshotDraft, OrderError> {
    let product = Products::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or(OrderError::ProductNotFound(product_id))?;

    let photos = ProductPhotos::find()
        .filter(PhotoCol::ProductId.eq(product_id))
        .order_by_asc(PhotoCol::Id)
        .all(conn)
        .await?;

    Ok(SnapshotDraft::from_product(&product, &photos))
}

/// Decodes a stored photo list. A malformed value reads as no photos so
/// that historical orders stay readable.
pub fn decode_photos(photos_json: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(photos_json) {
        Ok(urls) => urls,
        Err(err) => {
            tracing::warn!(error = %err, "malformed snapshot photos");
            Vec::new()
        }
    }
}
