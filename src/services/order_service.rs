use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    db::OrmConn,
    dto::orders::{
        CategoryRef, CreateOrderRequest, CreatedOrder, OrderLineRequest, OrderLineView, OrderPage,
        OrderView, ShippingAddressView, SnapshotPhoto, SnapshotView, StoreRef,
    },
    entity::{
        addresses::{Entity as Addresses, Model as AddressModel},
        categories::{Column as CategoryCol, Entity as Categories},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        product_snapshots::{Column as SnapshotCol, Entity as ProductSnapshots},
        stores::{Column as StoreCol, Entity as Stores},
    },
    error::{AppError, AppResult, OrderError},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::{
        snapshot::{self, SnapshotDraft, decode_photos},
        stock,
    },
    state::AppState,
};

const INVOICE_ATTEMPTS: usize = 3;

/// A validated order that has not been written yet.
#[derive(Debug, Clone)]
pub struct OrderPlan {
    pub user_id: i64,
    pub shipping_address_id: i64,
    pub payment_method: String,
    pub total_price: i64,
    pub lines: Vec<PlannedLine>,
}

#[derive(Debug, Clone)]
pub struct PlannedLine {
    pub snapshot: SnapshotDraft,
    pub quantity: i32,
    pub line_total: i64,
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<CreatedOrder>> {
    let order_id = place_order(&state.orm, user.user_id, &payload).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        CreatedOrder { id: order_id },
        Some(Meta::empty()),
    ))
}

/// Validates, snapshots and persists an order in a single transaction.
///
/// The transaction is only committed on success. Returning early, or the
/// caller dropping this future, drops the transaction, which rolls back the
/// order, its snapshots, its line items and every stock decrement.
pub async fn place_order(
    orm: &OrmConn,
    user_id: i64,
    payload: &CreateOrderRequest,
) -> Result<i64, OrderError> {
    let txn = orm.begin().await?;

    let plan = match plan_order(&txn, user_id, payload).await {
        Ok(plan) => plan,
        Err(err) => {
            tracing::info!(user_id, error = %err, "order rejected");
            return Err(err);
        }
    };

    let order_id = match persist_order(&txn, &plan).await {
        Ok(id) => id,
        Err(err) => {
            tracing::warn!(user_id, error = %err, "order rolled back");
            return Err(err);
        }
    };

    txn.commit().await?;
    tracing::info!(
        order_id,
        user_id,
        total_price = plan.total_price,
        lines = plan.lines.len(),
        "order created"
    );
    Ok(order_id)
}

/// Resolves the address and every product, building the snapshots and totals.
pub async fn plan_order<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    payload: &CreateOrderRequest,
) -> Result<OrderPlan, OrderError> {
    let address = Addresses::find_by_id(payload.shipping_address_id)
        .one(conn)
        .await?
        .ok_or(OrderError::AddressNotFound(payload.shipping_address_id))?;
    if address.user_id != user_id {
        return Err(OrderError::AddressNotOwned(address.id));
    }

    let payment_method = payload.payment_method.trim();
    if payment_method.is_empty() {
        return Err(OrderError::MissingPaymentMethod);
    }
    validate_lines(&payload.lines)?;

    let mut total_price: i64 = 0;
    let mut lines = Vec::with_capacity(payload.lines.len());
    for line in &payload.lines {
        let draft = snapshot::snapshot(conn, line.product_id).await?;
        let line_total = line_total(draft.consumer_price, line.quantity, line.product_id)?;
        total_price = total_price
            .checked_add(line_total)
            .ok_or(OrderError::TotalOverflow {
                product_id: line.product_id,
            })?;
        lines.push(PlannedLine {
            snapshot: draft,
            quantity: line.quantity,
            line_total,
        });
    }

    Ok(OrderPlan {
        user_id,
        shipping_address_id: address.id,
        payment_method: payment_method.to_string(),
        total_price,
        lines,
    })
}

pub fn validate_lines(lines: &[OrderLineRequest]) -> Result<(), OrderError> {
    if lines.is_empty() {
        return Err(OrderError::EmptyOrder);
    }
    if let Some(line) = lines.iter().find(|line| line.quantity <= 0) {
        return Err(OrderError::InvalidQuantity {
            product_id: line.product_id,
        });
    }
    Ok(())
}

pub fn line_total(unit_price: i64, quantity: i32, product_id: i64) -> Result<i64, OrderError> {
    if quantity <= 0 {
        return Err(OrderError::InvalidQuantity { product_id });
    }
    unit_price
        .checked_mul(i64::from(quantity))
        .ok_or(OrderError::TotalOverflow { product_id })
}

/// `INV-<unix seconds>-<8 random hex digits>`.
pub fn invoice_code() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("INV-{}-{}", Utc::now().timestamp(), &suffix[..8]).to_uppercase()
}

async fn persist_order(txn: &DatabaseTransaction, plan: &OrderPlan) -> Result<i64, OrderError> {
    let order = insert_order(txn, plan).await?;

    for line in &plan.lines {
        let snapshot = line.snapshot.clone().into_active_model()?.insert(txn).await?;

        OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            product_snapshot_id: Set(snapshot.id),
            store_id: Set(snapshot.store_id),
            quantity: Set(line.quantity),
            line_total: Set(line.line_total),
            created_at: NotSet,
        }
        .insert(txn)
        .await?;
    }

    for (product_id, quantity) in stock_claims(&plan.lines)? {
        stock::decrement(txn, product_id, quantity).await?;
    }

    Ok(order.id)
}

/// Total quantity per product, in ascending product id order.
///
/// Product rows are locked by the decrements in this order, so two orders
/// over the same products always lock them in the same sequence and cannot
/// deadlock each other.
pub fn stock_claims(lines: &[PlannedLine]) -> Result<Vec<(i64, i32)>, OrderError> {
    let mut claims: BTreeMap<i64, i32> = BTreeMap::new();
    for line in lines {
        let product_id = line.snapshot.product_id;
        let claimed = claims.entry(product_id).or_insert(0);
        *claimed = claimed
            .checked_add(line.quantity)
            .ok_or(OrderError::InvalidQuantity { product_id })?;
    }
    Ok(claims.into_iter().collect())
}

/// Inserts the order row, retrying under a savepoint if the invoice code
/// collides with an existing one.
async fn insert_order(txn: &DatabaseTransaction, plan: &OrderPlan) -> Result<OrderModel, OrderError> {
    for _ in 0..INVOICE_ATTEMPTS {
        let savepoint = txn.begin().await?;
        let inserted = OrderActive {
            id: NotSet,
            user_id: Set(plan.user_id),
            shipping_address_id: Set(plan.shipping_address_id),
            total_price: Set(plan.total_price),
            invoice_code: Set(invoice_code()),
            payment_method: Set(plan.payment_method.clone()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&savepoint)
        .await;

        match inserted {
            Ok(order) => {
                savepoint.commit().await?;
                return Ok(order);
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                tracing::warn!("invoice code collision, retrying");
                savepoint.rollback().await?;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(OrderError::InvoiceExhausted)
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderPage>> {
    let (page, limit, offset) = query.normalize();

    let finder = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut data = Vec::with_capacity(orders.len());
    for order in orders {
        data.push(build_order_view(&state.orm, order).await?);
    }

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderPage { data, page, limit },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    order_id: i64,
) -> AppResult<ApiResponse<OrderView>> {
    let view = read_order(&state.orm, user.user_id, order_id).await?;
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

/// Absence is `NotFound` for every caller; someone else's order is `Forbidden`.
pub async fn read_order<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    order_id: i64,
) -> AppResult<OrderView> {
    let order = Orders::find_by_id(order_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    if order.user_id != user_id {
        return Err(AppError::forbidden());
    }
    build_order_view(conn, order).await
}

async fn build_order_view<C: ConnectionTrait>(conn: &C, order: OrderModel) -> AppResult<OrderView> {
    let address = Addresses::find_by_id(order.shipping_address_id)
        .one(conn)
        .await?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Id)
        .all(conn)
        .await?;

    let snapshot_ids: Vec<i64> = items.iter().map(|i| i.product_snapshot_id).collect();
    let snapshots: HashMap<i64, _> = ProductSnapshots::find()
        .filter(SnapshotCol::Id.is_in(snapshot_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let store_ids: Vec<i64> = snapshots.values().map(|s| s.store_id).collect();
    let stores: HashMap<i64, StoreRef> = Stores::find()
        .filter(StoreCol::Id.is_in(store_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| {
            (
                s.id,
                StoreRef {
                    id: s.id,
                    name: s.name,
                    photo_url: s.photo_url,
                },
            )
        })
        .collect();

    let category_ids: Vec<i64> = snapshots.values().map(|s| s.category_id).collect();
    let categories: HashMap<i64, CategoryRef> = Categories::find()
        .filter(CategoryCol::Id.is_in(category_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, CategoryRef { id: c.id, name: c.name }))
        .collect();

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let snap = snapshots.get(&item.product_snapshot_id).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "order item {} references missing snapshot {}",
                item.id,
                item.product_snapshot_id
            ))
        })?;

        let store = stores
            .get(&snap.store_id)
            .cloned()
            .unwrap_or_else(|| StoreRef {
                id: snap.store_id,
                name: String::new(),
                photo_url: String::new(),
            });
        let category = categories
            .get(&snap.category_id)
            .cloned()
            .unwrap_or_else(|| CategoryRef {
                id: snap.category_id,
                name: String::new(),
            });
        let photos = decode_photos(&snap.photos_json)
            .into_iter()
            .map(|url| SnapshotPhoto {
                product_id: snap.product_id,
                url,
            })
            .collect();

        lines.push(OrderLineView {
            product: SnapshotView {
                id: snap.product_id,
                name: snap.name.clone(),
                slug: snap.slug.clone(),
                reseller_price: snap.reseller_price,
                consumer_price: snap.consumer_price,
                description: snap.description.clone(),
                store: store.clone(),
                category,
                photos,
            },
            store,
            quantity: item.quantity,
            line_total: item.line_total,
        });
    }

    Ok(OrderView {
        id: order.id,
        total_price: order.total_price,
        invoice_code: order.invoice_code,
        payment_method: order.payment_method,
        created_at: order.created_at.with_timezone(&Utc),
        shipping_address: address_view(order.shipping_address_id, address),
        items: lines,
    })
}

fn address_view(id: i64, address: Option<AddressModel>) -> ShippingAddressView {
    match address {
        Some(a) => ShippingAddressView {
            id: a.id,
            title: a.title,
            recipient_name: a.recipient_name,
            phone: a.phone,
            detail: a.detail,
        },
        None => ShippingAddressView {
            id,
            title: String::new(),
            recipient_name: String::new(),
            phone: String::new(),
            detail: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i64, quantity: i32) -> OrderLineRequest {
        OrderLineRequest {
            product_id,
            quantity,
        }
    }

    fn planned(product_id: i64, quantity: i32) -> PlannedLine {
        PlannedLine {
            snapshot: SnapshotDraft {
                product_id,
                name: format!("product {product_id}"),
                slug: format!("product-{product_id}"),
                reseller_price: 1000,
                consumer_price: 1200,
                description: String::new(),
                store_id: 1,
                category_id: 1,
                photo_urls: Vec::new(),
            },
            quantity,
            line_total: 1200 * i64::from(quantity),
        }
    }

    #[test]
    fn stock_claims_are_sorted_by_product() {
        let claims = stock_claims(&[planned(9, 1), planned(3, 2), planned(5, 1)]).unwrap();
        assert_eq!(claims, vec![(3, 2), (5, 1), (9, 1)]);
    }

    #[test]
    fn stock_claims_merge_repeated_products() {
        let claims = stock_claims(&[planned(4, 2), planned(1, 1), planned(4, 3)]).unwrap();
        assert_eq!(claims, vec![(1, 1), (4, 5)]);
    }

    #[test]
    fn stock_claims_reject_quantity_overflow() {
        assert!(matches!(
            stock_claims(&[planned(7, i32::MAX), planned(7, 1)]),
            Err(OrderError::InvalidQuantity { product_id: 7 })
        ));
    }

    #[test]
    fn line_total_multiplies_unit_price() {
        assert_eq!(line_total(120000, 2, 1).unwrap(), 240000);
    }

    #[test]
    fn line_total_rejects_overflow() {
        assert!(matches!(
            line_total(i64::MAX, 2, 9),
            Err(OrderError::TotalOverflow { product_id: 9 })
        ));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert!(matches!(
            validate_lines(&[line(1, 2), line(2, 0)]),
            Err(OrderError::InvalidQuantity { product_id: 2 })
        ));
        assert!(matches!(
            validate_lines(&[line(3, -1)]),
            Err(OrderError::InvalidQuantity { product_id: 3 })
        ));
    }

    #[test]
    fn empty_lines_are_rejected() {
        assert!(matches!(validate_lines(&[]), Err(OrderError::EmptyOrder)));
    }

    #[test]
    fn invoice_code_has_prefix_timestamp_and_suffix() {
        let code = invoice_code();
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn invoice_codes_differ_within_the_same_second() {
        assert_ne!(invoice_code(), invoice_code());
    }
}
