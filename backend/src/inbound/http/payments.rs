//! Payment status reads and gateway notifications.
//!
//! ```text
//! GET  /api/v1/payments/{orderId}
//! POST /api/v1/payments/notifications/{gateway}   X-Gateway-Signature: <hex>
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde_json::json;

use crate::domain::ports::PaymentNotification;
use crate::domain::{ApiResult, Error, Gateway};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::dto::{
    PaymentNotificationBody, PaymentOverviewResponse, ReconciliationResponse,
};
use crate::inbound::http::envelope::{Envelope, ok};
use crate::inbound::http::signature::{SIGNATURE_HEADER, WebhookVerifier};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_field, parse_order_id};

/// Payment status and ledger records for an order.
#[utoipa::path(
    get,
    path = "/api/v1/payments/{orderId}",
    params(("orderId" = String, Path, description = "Order UUID or number")),
    responses(
        (status = 200, description = "Payment overview", body = Envelope<PaymentOverviewResponse>),
        (status = 400, description = "Malformed order reference", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Order belongs to someone else", body = Error),
        (status = 404, description = "Unknown order", body = Error)
    ),
    tags = ["payments"],
    operation_id = "getPaymentStatus"
)]
#[get("/payments/{order_id}")]
pub async fn payment_status(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let order_id = parse_order_id(&path, FieldName::new("orderId"))?;
    let overview = state
        .orders_query
        .payment_overview(caller.actor(), order_id)
        .await?;
    Ok(ok(PaymentOverviewResponse::from(overview)))
}

fn decode_notification(body: &[u8]) -> Result<PaymentNotificationBody, Error> {
    serde_json::from_slice(body).map_err(|err| {
        Error::invalid_request("notification body is not valid JSON")
            .with_details(json!({ "field": "body", "reason": err.to_string() }))
    })
}

/// Apply a signed gateway notification.
///
/// The signature covers the raw body, so it is checked before the body is
/// parsed. Replaying a notification converges on the same ledger record.
#[utoipa::path(
    post,
    path = "/api/v1/payments/notifications/{gateway}",
    params(
        ("gateway" = String, Path, description = "`card_gateway_a` or `card_gateway_b`"),
        ("X-Gateway-Signature" = String, Header, description = "Hex HMAC-SHA256 of the body")
    ),
    request_body = PaymentNotificationBody,
    responses(
        (status = 200, description = "Notification applied", body = Envelope<ReconciliationResponse>),
        (status = 400, description = "Unknown gateway, status or malformed body", body = Error),
        (status = 401, description = "Missing or bad signature", body = Error),
        (status = 404, description = "Unknown order", body = Error),
        (status = 409, description = "Reference belongs to another order or concurrent update", body = Error)
    ),
    tags = ["payments"],
    operation_id = "paymentNotification",
    security([])
)]
#[post("/payments/notifications/{gateway}")]
pub async fn payment_notification(
    state: web::Data<HttpState>,
    verifier: web::Data<WebhookVerifier>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    verifier.verify(&body, signature)?;

    let gateway: Gateway = parse_field(&path, FieldName::new("gateway"))?;
    let payload = decode_notification(&body)?;
    let order_id = parse_order_id(&payload.order_id, FieldName::new("orderId"))?;
    let outcome = state
        .reconciliation
        .reconcile(PaymentNotification {
            gateway,
            order_id,
            status_code: payload.status,
            external_reference: payload.transaction_reference,
            metadata: payload.metadata.unwrap_or_default(),
        })
        .await?;
    Ok(ok(ReconciliationResponse::from(outcome)))
}

#[cfg(test)]
#[path = "payments_tests.rs"]
mod tests;
