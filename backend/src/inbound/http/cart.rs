//! Cart endpoints for the authenticated buyer.
//!
//! ```text
//! GET    /api/v1/cart
//! POST   /api/v1/cart              {"productId":"…","quantity":2}
//! DELETE /api/v1/cart
//! PUT    /api/v1/cart/{productId}  {"quantity":3}
//! DELETE /api/v1/cart/{productId}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{ApiResult, Error};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::{AddCartItemRequest, CartResponse, SetCartQuantityRequest};
use crate::inbound::http::envelope::{Envelope, ok};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_product_id, parse_quantity};

/// The caller's cart.
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "Cart", body = Envelope<CartResponse>),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["cart"],
    operation_id = "viewCart"
)]
#[get("/cart")]
pub async fn view_cart(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let cart = state.cart.view_cart(caller.user_id()).await?;
    Ok(ok(CartResponse::from(cart)))
}

/// Add units of a product, merging with an existing line.
#[utoipa::path(
    post,
    path = "/api/v1/cart",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Updated cart", body = Envelope<CartResponse>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Unknown product", body = Error),
        (status = 409, description = "Inactive product or insufficient stock", body = Error)
    ),
    tags = ["cart"],
    operation_id = "addCartItem"
)]
#[post("/cart")]
pub async fn add_item(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<AddCartItemRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let product_id = parse_product_id(&body.product_id, FieldName::new("productId"))?;
    let quantity = parse_quantity(body.quantity.unwrap_or(1), FieldName::new("quantity"))?;
    let cart = state
        .cart
        .add_item(caller.user_id(), product_id, quantity)
        .await?;
    Ok(ok(CartResponse::from(cart)))
}

/// Empty the cart.
#[utoipa::path(
    delete,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "Empty cart", body = Envelope<CartResponse>),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["cart"],
    operation_id = "clearCart"
)]
#[delete("/cart")]
pub async fn clear_cart(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let cart = state.cart.clear_cart(caller.user_id()).await?;
    Ok(ok(CartResponse::from(cart)))
}

/// Replace a line's quantity.
#[utoipa::path(
    put,
    path = "/api/v1/cart/{productId}",
    params(("productId" = String, Path, description = "Product UUID")),
    request_body = SetCartQuantityRequest,
    responses(
        (status = 200, description = "Updated cart", body = Envelope<CartResponse>),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Product not in cart", body = Error),
        (status = 409, description = "Insufficient stock", body = Error)
    ),
    tags = ["cart"],
    operation_id = "setCartQuantity"
)]
#[put("/cart/{product_id}")]
pub async fn set_quantity(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<SetCartQuantityRequest>,
) -> ApiResult<HttpResponse> {
    let product_id = parse_product_id(&path, FieldName::new("productId"))?;
    let quantity = parse_quantity(payload.quantity, FieldName::new("quantity"))?;
    let cart = state
        .cart
        .set_quantity(caller.user_id(), product_id, quantity)
        .await?;
    Ok(ok(CartResponse::from(cart)))
}

/// Remove a line.
#[utoipa::path(
    delete,
    path = "/api/v1/cart/{productId}",
    params(("productId" = String, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Updated cart", body = Envelope<CartResponse>),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Product not in cart", body = Error)
    ),
    tags = ["cart"],
    operation_id = "removeCartItem"
)]
#[delete("/cart/{product_id}")]
pub async fn remove_item(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let product_id = parse_product_id(&path, FieldName::new("productId"))?;
    let cart = state.cart.remove_item(caller.user_id(), product_id).await?;
    Ok(ok(CartResponse::from(cart)))
}
