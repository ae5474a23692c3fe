//! Buyer-facing order endpoints.
//!
//! ```text
//! POST /api/v1/orders/checkout
//! POST /api/v1/orders
//! GET  /api/v1/orders?page=1&limit=12
//! GET  /api/v1/orders/{orderId}
//! PUT  /api/v1/orders/{orderId}/cancel
//! ```
//!
//! `{orderId}` is either the order UUID or its `ORD-…` number.

use actix_web::{HttpResponse, get, post, put, web};

use crate::domain::ports::{CheckoutRequest, DirectOrderRequest};
use crate::domain::{ApiResult, Error};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::{
    CancelOrderBody, CheckoutBody, DirectOrderBody, OrderResponse, PageQuery, Paged,
};
use crate::inbound::http::envelope::{Envelope, created, ok};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_order_id, parse_page};

/// Turn the caller's cart into an order.
#[utoipa::path(
    post,
    path = "/api/v1/orders/checkout",
    request_body = CheckoutBody,
    responses(
        (status = 201, description = "Order placed", body = Envelope<OrderResponse>),
        (status = 400, description = "Invalid request or empty cart", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "A cart product no longer exists", body = Error),
        (status = 409, description = "Insufficient stock or inactive product", body = Error)
    ),
    tags = ["orders"],
    operation_id = "checkout"
)]
#[post("/orders/checkout")]
pub async fn checkout(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CheckoutBody>,
) -> ApiResult<HttpResponse> {
    let request = CheckoutRequest::try_from(payload.into_inner())?;
    let order = state.orders.checkout(caller.actor(), request).await?;
    Ok(created(OrderResponse::from(order)))
}

/// Buy one product without touching the cart.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = DirectOrderBody,
    responses(
        (status = 201, description = "Order placed", body = Envelope<OrderResponse>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Unknown product", body = Error),
        (status = 409, description = "Insufficient stock or inactive product", body = Error)
    ),
    tags = ["orders"],
    operation_id = "placeDirectOrder"
)]
#[post("/orders")]
pub async fn place_direct_order(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<DirectOrderBody>,
) -> ApiResult<HttpResponse> {
    let request = DirectOrderRequest::try_from(payload.into_inner())?;
    let order = state
        .orders
        .place_direct_order(caller.actor(), request)
        .await?;
    Ok(created(OrderResponse::from(order)))
}

/// The caller's orders, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of orders", body = Envelope<Paged<OrderResponse>>),
        (status = 400, description = "Invalid paging", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listMyOrders"
)]
#[get("/orders")]
pub async fn list_my_orders(
    state: web::Data<HttpState>,
    caller: Authenticated,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let page = parse_page(query.page, query.limit)?;
    let orders = state
        .orders_query
        .list_my_orders(caller.actor(), page)
        .await?;
    Ok(ok(Paged::from_page(orders, OrderResponse::from)))
}

/// Fetch one order.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{orderId}",
    params(("orderId" = String, Path, description = "Order UUID or number")),
    responses(
        (status = 200, description = "Order", body = Envelope<OrderResponse>),
        (status = 400, description = "Malformed order reference", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Order belongs to someone else", body = Error),
        (status = 404, description = "Unknown order", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{order_id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let order_id = parse_order_id(&path, FieldName::new("orderId"))?;
    let order = state.orders_query.get_order(caller.actor(), order_id).await?;
    Ok(ok(OrderResponse::from(order)))
}

/// Cancel one of the caller's orders.
///
/// The body is optional; `{"reason":"…"}` is appended to the order notes.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{orderId}/cancel",
    params(("orderId" = String, Path, description = "Order UUID or number")),
    request_body(content = CancelOrderBody, description = "Optional cancellation reason"),
    responses(
        (status = 200, description = "Cancelled order", body = Envelope<OrderResponse>),
        (status = 400, description = "Malformed order reference", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Order belongs to someone else", body = Error),
        (status = 404, description = "Unknown order", body = Error),
        (status = 409, description = "Order is delivered or already cancelled", body = Error)
    ),
    tags = ["orders"],
    operation_id = "cancelOrder"
)]
#[put("/orders/{order_id}/cancel")]
pub async fn cancel_order(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: Option<web::Json<CancelOrderBody>>,
) -> ApiResult<HttpResponse> {
    let order_id = parse_order_id(&path, FieldName::new("orderId"))?;
    let reason = payload.and_then(|body| body.into_inner().reason);
    let order = state
        .orders
        .cancel_order(caller.actor(), order_id, reason)
        .await?;
    Ok(ok(OrderResponse::from(order)))
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
