use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub payment_method: String,
    pub shipping_address_id: i64,
    pub lines: Vec<OrderLineRequest>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedOrder {
    pub id: i64,
}

/// One page of the caller's orders, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderPage {
    pub data: Vec<OrderView>,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderView {
    pub id: i64,
    pub total_price: i64,
    pub invoice_code: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub shipping_address: ShippingAddressView,
    pub items: Vec<OrderLineView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ShippingAddressView {
    pub id: i64,
    pub title: String,
    pub recipient_name: String,
    pub phone: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderLineView {
    pub product: SnapshotView,
    pub store: StoreRef,
    pub quantity: i32,
    pub line_total: i64,
}

/// Product as it was when the order was placed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SnapshotView {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub reseller_price: i64,
    pub consumer_price: i64,
    pub description: String,
    pub store: StoreRef,
    pub category: CategoryRef,
    pub photos: Vec<SnapshotPhoto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StoreRef {
    pub id: i64,
    pub name: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SnapshotPhoto {
    pub product_id: i64,
    pub url: String,
}
