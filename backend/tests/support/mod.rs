//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`; each
//! pulls this module in with `mod support;` and uses only what it needs.
#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::test::{self, TestRequest};
use serde_json::{Value, json};
use storefront::domain::Actor;
use storefront::test_support::TestStorefront;

/// Call `app` and decode the JSON body, `Null` when empty.
pub async fn send<S, B>(app: &S, req: TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let bytes = test::read_body(res).await;
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let body = serde_json::from_slice(&bytes).expect("response body is JSON");
    (status, body)
}

/// String at a JSON pointer.
pub fn text<'a>(body: &'a Value, pointer: &str) -> Option<&'a str> {
    body.pointer(pointer).and_then(Value::as_str)
}

/// Attach a bearer token for `actor`.
pub fn authed(shop: &TestStorefront, actor: &Actor, req: TestRequest) -> TestRequest {
    req.insert_header(shop.bearer(actor).expect("token issued"))
}

/// Shipping and payment fields shared by checkout and direct orders.
pub fn order_fields(method: &str, proof: Option<&str>) -> Value {
    json!({
        "shippingAddress": "12 Temple Road",
        "shippingCity": "Kandy",
        "shippingProvince": "Central",
        "shippingPostalCode": "20000",
        "paymentMethod": method,
        "paymentProof": proof,
    })
}

/// `POST /api/v1/orders` for a single product.
pub fn direct_order(
    shop: &TestStorefront,
    actor: &Actor,
    product_id: &str,
    quantity: u32,
    method: &str,
    proof: Option<&str>,
) -> TestRequest {
    let mut body = order_fields(method, proof);
    body["productId"] = json!(product_id);
    body["quantity"] = json!(quantity);
    authed(
        shop,
        actor,
        TestRequest::post().uri("/api/v1/orders").set_json(body),
    )
}

/// Signed gateway notification.
pub fn notification(shop: &TestStorefront, gateway: &str, body: &Value) -> TestRequest {
    let bytes = serde_json::to_vec(body).expect("serialisable body");
    TestRequest::post()
        .uri(&format!("/api/v1/payments/notifications/{gateway}"))
        .insert_header(ContentType::json())
        .insert_header(shop.signature(&bytes).expect("signed"))
        .set_payload(bytes)
}

/// Units on hand for `product_id`, read from the store.
pub async fn stock(shop: &TestStorefront, product_id: storefront::domain::ProductId) -> u32 {
    shop.product(product_id)
        .await
        .expect("store readable")
        .expect("product exists")
        .quantity_on_hand
}
