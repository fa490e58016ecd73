use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::orders::{CreateOrderRequest, CreatedOrder, OrderPage, OrderView},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/{order_id}", get(get_order))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders of the current user, newest first", body = ApiResponse<OrderPage>),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderPage>>> {
    let resp = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<CreatedOrder>),
        (status = 400, description = "Invalid quantity, empty order or missing payment method"),
        (status = 403, description = "Shipping address belongs to another user"),
        (status = 404, description = "Shipping address or product not found"),
        (status = 409, description = "Insufficient stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CreatedOrder>>)> {
    let resp = order_service::create_order(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    params(
        ("order_id" = i64, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order detail", body = ApiResponse<OrderView>),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = order_service::get_order(&state, &user, order_id).await?;
    Ok(Json(resp))
}
