//! Driving port for order lifecycle mutations.

use async_trait::async_trait;

use crate::domain::{
    Actor, Error, Order, OrderId, OrderStatus, PaymentMethod, ProductId, Quantity,
    ShippingAddress,
};

/// Checkout of the caller's whole cart.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Delivery address.
    pub shipping: ShippingAddress,
    /// How the buyer pays.
    pub payment_method: PaymentMethod,
    /// Proof-of-payment reference; required for bank transfers.
    pub payment_proof: Option<String>,
    /// Buyer's notes.
    pub notes: Option<String>,
}

/// Purchase of a single product without touching the cart.
#[derive(Debug, Clone)]
pub struct DirectOrderRequest {
    /// Product to buy.
    pub product_id: ProductId,
    /// Units to buy.
    pub quantity: Quantity,
    /// Delivery address.
    pub shipping: ShippingAddress,
    /// How the buyer pays.
    pub payment_method: PaymentMethod,
    /// Proof-of-payment reference; required for bank transfers.
    pub payment_proof: Option<String>,
    /// Buyer's notes.
    pub notes: Option<String>,
}

/// Operator decision on submitted payment proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationDecision {
    /// Accept the proof.
    Approve,
    /// Reject the proof, optionally saying why.
    Reject {
        /// Reason recorded in the order notes.
        reason: Option<String>,
    },
}

/// Driving port for order placement and state changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderCommand: Send + Sync {
    /// Turn the caller's cart into an order, reserving stock and clearing the
    /// cart in one unit of work.
    async fn checkout(&self, actor: &Actor, request: CheckoutRequest) -> Result<Order, Error>;

    /// Order a single product directly.
    async fn place_direct_order(
        &self,
        actor: &Actor,
        request: DirectOrderRequest,
    ) -> Result<Order, Error>;

    /// Cancel one of the caller's orders, returning stock and refunding.
    async fn cancel_order(
        &self,
        actor: &Actor,
        order_id: OrderId,
        reason: Option<String>,
    ) -> Result<Order, Error>;

    /// Operator status change following the transition table.
    async fn update_status(
        &self,
        actor: &Actor,
        order_id: OrderId,
        status: OrderStatus,
        reason: Option<String>,
    ) -> Result<Order, Error>;

    /// Operator tracking number update.
    async fn update_tracking(
        &self,
        actor: &Actor,
        order_id: OrderId,
        tracking_number: String,
    ) -> Result<Order, Error>;

    /// Operator approval or rejection of submitted payment proof.
    async fn verify_payment(
        &self,
        actor: &Actor,
        order_id: OrderId,
        decision: VerificationDecision,
    ) -> Result<Order, Error>;
}
