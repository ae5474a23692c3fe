//! Test helpers for inbound HTTP handlers.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use serde_json::{Value, json};

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

/// Checkout body paying with `method`.
pub fn checkout_body(method: &str, proof: Option<&str>) -> Value {
    json!({
        "shippingAddress": "42 Galle Road",
        "shippingCity": "Colombo",
        "shippingProvince": "Western",
        "shippingPostalCode": "00300",
        "paymentMethod": method,
        "paymentProof": proof,
    })
}
