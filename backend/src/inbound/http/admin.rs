//! Operator endpoints for fulfilment, payment verification and the catalogue.
//!
//! ```text
//! GET /api/v1/admin/orders?status=pending&paymentStatus=pending_verification
//! PUT /api/v1/admin/orders/{orderId}/status    {"status":"shipped"}
//! PUT /api/v1/admin/orders/{orderId}/tracking  {"trackingNumber":"LK123"}
//! PUT /api/v1/admin/orders/{orderId}/payment   {"action":"reject","reason":"illegible slip"}
//! POST   /api/v1/admin/products              {"sku":"SEI-SRPD55","price":"180.00",...}
//! PUT    /api/v1/admin/products/{productId}  {"sku":"SEI-SRPD55","price":"175.00",...}
//! DELETE /api/v1/admin/products/{productId}
//! PUT /api/v1/admin/products/{productId}/stock  {"delta":-2}
//! PUT /api/v1/admin/products/{productId}/active {"isActive":false}
//! ```
//!
//! Role checks live in the domain services; these handlers only translate.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::json;

use crate::domain::ports::{OrderListFilter, VerificationDecision};
use crate::domain::{ApiResult, Error};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::{
    ActiveFlagBody, AdminOrderListQuery, CreateProductBody, OrderResponse, Paged,
    PaymentDecisionBody, ProductDetailsBody, ProductResponse, StatusUpdateBody,
    StockAdjustmentBody, TrackingUpdateBody,
};
use crate::inbound::http::envelope::{Envelope, created, ok};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_field, parse_optional_field, parse_order_id, parse_page, parse_product_id,
};

fn parse_decision(body: PaymentDecisionBody) -> Result<VerificationDecision, Error> {
    let action = body.action.trim().to_ascii_lowercase();
    match action.as_str() {
        "approve" => Ok(VerificationDecision::Approve),
        "reject" => Ok(VerificationDecision::Reject {
            reason: body.reason,
        }),
        _ => Err(Error::invalid_request("action must be approve or reject").with_details(
            json!({ "field": "action", "value": body.action, "code": "invalid_value" }),
        )),
    }
}

/// Every order, filtered by status and payment status.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    params(AdminOrderListQuery),
    responses(
        (status = 200, description = "Page of orders", body = Envelope<Paged<OrderResponse>>),
        (status = 400, description = "Invalid filter or paging", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Operators only", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listOrders"
)]
#[get("/admin/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    caller: Authenticated,
    query: web::Query<AdminOrderListQuery>,
) -> ApiResult<HttpResponse> {
    let page = parse_page(query.page, query.limit)?;
    let filter = OrderListFilter {
        user_id: None,
        status: parse_optional_field(query.status.as_deref(), FieldName::new("status"))?,
        payment_status: parse_optional_field(
            query.payment_status.as_deref(),
            FieldName::new("paymentStatus"),
        )?,
    };
    let orders = state
        .orders_query
        .list_orders(caller.actor(), filter, page)
        .await?;
    Ok(ok(Paged::from_page(orders, OrderResponse::from)))
}

/// Move an order along the fulfilment table.
#[utoipa::path(
    put,
    path = "/api/v1/admin/orders/{orderId}/status",
    params(("orderId" = String, Path, description = "Order UUID or number")),
    request_body = StatusUpdateBody,
    responses(
        (status = 200, description = "Updated order", body = Envelope<OrderResponse>),
        (status = 400, description = "Unknown status", body = Error),
        (status = 403, description = "Operators only", body = Error),
        (status = 404, description = "Unknown order", body = Error),
        (status = 409, description = "Transition not allowed or concurrent update", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updateOrderStatus"
)]
#[put("/admin/orders/{order_id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<StatusUpdateBody>,
) -> ApiResult<HttpResponse> {
    let order_id = parse_order_id(&path, FieldName::new("orderId"))?;
    let StatusUpdateBody {
        status: raw_status,
        reason,
    } = payload.into_inner();
    let status = parse_field(&raw_status, FieldName::new("status"))?;
    let order = state
        .orders
        .update_status(caller.actor(), order_id, status, reason)
        .await?;
    Ok(ok(OrderResponse::from(order)))
}

/// Record the carrier tracking number.
#[utoipa::path(
    put,
    path = "/api/v1/admin/orders/{orderId}/tracking",
    params(("orderId" = String, Path, description = "Order UUID or number")),
    request_body = TrackingUpdateBody,
    responses(
        (status = 200, description = "Updated order", body = Envelope<OrderResponse>),
        (status = 400, description = "Blank or overlong tracking number", body = Error),
        (status = 403, description = "Operators only", body = Error),
        (status = 404, description = "Unknown order", body = Error),
        (status = 409, description = "Order is cancelled", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updateTrackingNumber"
)]
#[put("/admin/orders/{order_id}/tracking")]
pub async fn update_tracking(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<TrackingUpdateBody>,
) -> ApiResult<HttpResponse> {
    let order_id = parse_order_id(&path, FieldName::new("orderId"))?;
    let order = state
        .orders
        .update_tracking(caller.actor(), order_id, payload.into_inner().tracking_number)
        .await?;
    Ok(ok(OrderResponse::from(order)))
}

/// Approve or reject submitted payment proof.
#[utoipa::path(
    put,
    path = "/api/v1/admin/orders/{orderId}/payment",
    params(("orderId" = String, Path, description = "Order UUID or number")),
    request_body = PaymentDecisionBody,
    responses(
        (status = 200, description = "Updated order", body = Envelope<OrderResponse>),
        (status = 400, description = "Unknown action", body = Error),
        (status = 403, description = "Operators only", body = Error),
        (status = 404, description = "Unknown order", body = Error),
        (status = 409, description = "Payment is not awaiting verification", body = Error)
    ),
    tags = ["admin"],
    operation_id = "verifyPayment"
)]
#[put("/admin/orders/{order_id}/payment")]
pub async fn verify_payment(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<PaymentDecisionBody>,
) -> ApiResult<HttpResponse> {
    let order_id = parse_order_id(&path, FieldName::new("orderId"))?;
    let decision = parse_decision(payload.into_inner())?;
    let order = state
        .orders
        .verify_payment(caller.actor(), order_id, decision)
        .await?;
    Ok(ok(OrderResponse::from(order)))
}

/// Add a product to the catalogue.
#[utoipa::path(
    post,
    path = "/api/v1/admin/products",
    request_body = CreateProductBody,
    responses(
        (status = 201, description = "Created product", body = Envelope<ProductResponse>),
        (status = 400, description = "Invalid product fields", body = Error),
        (status = 403, description = "Operators only", body = Error),
        (status = 409, description = "SKU already in use", body = Error)
    ),
    tags = ["admin"],
    operation_id = "createProduct"
)]
#[post("/admin/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CreateProductBody>,
) -> ApiResult<HttpResponse> {
    let product = state
        .stock
        .create_product(caller.actor(), payload.into_inner().try_into()?)
        .await?;
    Ok(created(ProductResponse::from(product)))
}

/// Replace a product's details; stock is left alone.
#[utoipa::path(
    put,
    path = "/api/v1/admin/products/{productId}",
    params(("productId" = String, Path, description = "Product UUID")),
    request_body = ProductDetailsBody,
    responses(
        (status = 200, description = "Updated product", body = Envelope<ProductResponse>),
        (status = 400, description = "Malformed id or invalid fields", body = Error),
        (status = 403, description = "Operators only", body = Error),
        (status = 404, description = "Unknown product", body = Error),
        (status = 409, description = "SKU already in use", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updateProduct"
)]
#[put("/admin/products/{product_id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<ProductDetailsBody>,
) -> ApiResult<HttpResponse> {
    let product_id = parse_product_id(&path, FieldName::new("productId"))?;
    let product = state
        .stock
        .update_product(caller.actor(), product_id, payload.into_inner().try_into()?)
        .await?;
    Ok(ok(ProductResponse::from(product)))
}

/// Withdraw a product from sale; the row is kept for order history.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/{productId}",
    params(("productId" = String, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Hidden product", body = Envelope<ProductResponse>),
        (status = 400, description = "Malformed id", body = Error),
        (status = 403, description = "Operators only", body = Error),
        (status = 404, description = "Unknown product", body = Error)
    ),
    tags = ["admin"],
    operation_id = "deleteProduct"
)]
#[delete("/admin/products/{product_id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let product_id = parse_product_id(&path, FieldName::new("productId"))?;
    let product = state
        .stock
        .delete_product(caller.actor(), product_id)
        .await?;
    Ok(ok(ProductResponse::from(product)))
}

/// Apply a signed stock delta.
#[utoipa::path(
    put,
    path = "/api/v1/admin/products/{productId}/stock",
    params(("productId" = String, Path, description = "Product UUID")),
    request_body = StockAdjustmentBody,
    responses(
        (status = 200, description = "Updated product", body = Envelope<ProductResponse>),
        (status = 400, description = "Malformed id", body = Error),
        (status = 403, description = "Operators only", body = Error),
        (status = 404, description = "Unknown product", body = Error),
        (status = 409, description = "Stock would go negative", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adjustStock"
)]
#[put("/admin/products/{product_id}/stock")]
pub async fn adjust_stock(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<StockAdjustmentBody>,
) -> ApiResult<HttpResponse> {
    let product_id = parse_product_id(&path, FieldName::new("productId"))?;
    let product = state
        .stock
        .adjust_stock(caller.actor(), product_id, payload.delta)
        .await?;
    Ok(ok(ProductResponse::from(product)))
}

/// Show or hide a product.
#[utoipa::path(
    put,
    path = "/api/v1/admin/products/{productId}/active",
    params(("productId" = String, Path, description = "Product UUID")),
    request_body = ActiveFlagBody,
    responses(
        (status = 200, description = "Updated product", body = Envelope<ProductResponse>),
        (status = 400, description = "Malformed id", body = Error),
        (status = 403, description = "Operators only", body = Error),
        (status = 404, description = "Unknown product", body = Error)
    ),
    tags = ["admin"],
    operation_id = "setProductActive"
)]
#[put("/admin/products/{product_id}/active")]
pub async fn set_active(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<ActiveFlagBody>,
) -> ApiResult<HttpResponse> {
    let product_id = parse_product_id(&path, FieldName::new("productId"))?;
    let product = state
        .stock
        .set_active(caller.actor(), product_id, payload.is_active)
        .await?;
    Ok(ok(ProductResponse::from(product)))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
