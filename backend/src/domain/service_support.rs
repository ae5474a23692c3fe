//! Shared helpers for the domain services: role checks and mapping of driven
//! port failures onto domain errors.

use serde_json::json;
use tracing::{error, warn};

use super::ports::{
    CartRepositoryError, OrderRepositoryError, PaymentRepositoryError, ProductRepositoryError,
};
use super::{
    Actor, Error, OrderTransitionError, OrderValidationError, QuantityError,
};

pub(crate) fn require_operator(actor: &Actor) -> Result<(), Error> {
    if actor.is_operator() {
        Ok(())
    } else {
        Err(Error::forbidden("operator role required"))
    }
}

fn unavailable(store: &str, message: &str) -> Error {
    error!(store, %message, "storage unavailable");
    Error::service_unavailable(format!("{store} store is unavailable"))
}

fn query_failure(store: &str, message: &str) -> Error {
    error!(store, %message, "storage query failed");
    Error::internal(format!("{store} store query failed: {message}"))
}

pub(crate) fn map_product_error(error: ProductRepositoryError) -> Error {
    match error {
        ProductRepositoryError::Connection { message } => unavailable("catalogue", &message),
        ProductRepositoryError::Query { message } => query_failure("catalogue", &message),
        ProductRepositoryError::DuplicateSku { sku } => {
            Error::conflict(format!("sku {sku} is already in use"))
                .with_details(json!({ "field": "sku", "sku": sku }))
        }
        ProductRepositoryError::InsufficientStock {
            product_id,
            available,
        } => Error::conflict(format!(
            "insufficient stock for product {product_id}"
        ))
        .with_details(json!({
            "productId": product_id,
            "available": available,
        })),
    }
}

pub(crate) fn map_cart_error(error: CartRepositoryError) -> Error {
    match error {
        CartRepositoryError::Connection { message } => unavailable("cart", &message),
        CartRepositoryError::Query { message } => query_failure("cart", &message),
    }
}

pub(crate) fn map_payment_error(error: PaymentRepositoryError) -> Error {
    match error {
        PaymentRepositoryError::Connection { message } => unavailable("payment", &message),
        PaymentRepositoryError::Query { message } => query_failure("payment", &message),
        PaymentRepositoryError::DuplicateReference { external_reference } => {
            Error::conflict("payment reference is already recorded")
                .with_details(json!({ "externalReference": external_reference }))
        }
    }
}

pub(crate) fn map_order_error(error: OrderRepositoryError) -> Error {
    match error {
        OrderRepositoryError::Connection { message } => unavailable("order", &message),
        OrderRepositoryError::Query { message } => query_failure("order", &message),
        OrderRepositoryError::ProductNotFound { product_id } => {
            Error::not_found(format!("product {product_id} not found"))
                .with_details(json!({ "productId": product_id }))
        }
        OrderRepositoryError::ProductUnavailable { product_id } => {
            Error::conflict(format!("product {product_id} is not available"))
                .with_details(json!({ "productId": product_id }))
        }
        OrderRepositoryError::InsufficientStock {
            product_id,
            requested,
            available,
        } => insufficient_stock(&product_id.to_string(), requested, available),
        OrderRepositoryError::RevisionMismatch { order_id, expected } => {
            Error::conflict("order was modified concurrently; reload and retry").with_details(
                json!({ "orderId": order_id, "expectedRevision": expected }),
            )
        }
        OrderRepositoryError::LockConflict { message } => {
            warn!(%message, "order write lost a lock race");
            Error::conflict("order could not be written due to concurrent activity; retry")
                .with_details(json!({ "retryable": true }))
        }
        OrderRepositoryError::DuplicatePayment { external_reference } => {
            Error::conflict("payment reference is already recorded")
                .with_details(json!({ "externalReference": external_reference }))
        }
    }
}

pub(crate) fn insufficient_stock(product: &str, requested: u32, available: u32) -> Error {
    Error::conflict(format!("insufficient stock for product {product}")).with_details(json!({
        "productId": product,
        "requested": requested,
        "available": available,
    }))
}

pub(crate) fn map_transition_error(error: OrderTransitionError) -> Error {
    let details = match &error {
        OrderTransitionError::NotCancellable { status } => json!({ "status": status }),
        OrderTransitionError::InvalidTransition { from, to } => json!({
            "from": from,
            "to": to,
            "allowed": from.allowed_targets(),
        }),
        OrderTransitionError::PaymentNotAwaitingVerification { payment_status } => {
            json!({ "paymentStatus": payment_status })
        }
        OrderTransitionError::TrackingOnCancelledOrder => json!({ "status": "cancelled" }),
    };
    Error::conflict(error.to_string()).with_details(details)
}

pub(crate) fn map_validation_error(error: OrderValidationError) -> Error {
    let details = match &error {
        OrderValidationError::EmptyField { field }
        | OrderValidationError::FieldTooLong { field, .. } => json!({ "field": field }),
        OrderValidationError::MissingPaymentProof { .. } => json!({ "field": "paymentProof" }),
        OrderValidationError::NoLines => json!({ "field": "items" }),
        OrderValidationError::UnknownStatus(value) => {
            json!({ "field": "status", "value": value })
        }
        OrderValidationError::UnknownPaymentMethod(value) => {
            json!({ "field": "paymentMethod", "value": value })
        }
        OrderValidationError::UnknownPaymentStatus(value) => {
            json!({ "field": "paymentStatus", "value": value })
        }
        OrderValidationError::InvalidOrderId => json!({ "field": "orderId" }),
        OrderValidationError::TotalOverflow => json!({ "field": "totalAmount" }),
    };
    Error::invalid_request(error.to_string()).with_details(details)
}

pub(crate) fn map_quantity_error(error: QuantityError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "field": "quantity" }))
}
