//! Port for atomic order persistence.
//!
//! Placement and every later mutation are single units of work: adapters
//! either apply all of the described writes or none of them.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Order, OrderId, OrderStatus, PaymentRecord, PaymentStatus, ProductId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "order repository query failed: {message}",
        /// A line references a product that does not exist.
        ProductNotFound { product_id: ProductId } =>
            "product {product_id} not found",
        /// A line references an inactive product.
        ProductUnavailable { product_id: ProductId } =>
            "product {product_id} is not available",
        /// The conditional stock decrement failed.
        InsufficientStock { product_id: ProductId, requested: u32, available: u32 } =>
            "insufficient stock for product {product_id}: requested {requested}, available {available}",
        /// The order changed since it was read.
        RevisionMismatch { order_id: OrderId, expected: u32 } =>
            "order {order_id} was modified concurrently (expected revision {expected})",
        /// The unit of work lost a lock race with a concurrent writer.
        LockConflict { message: String } =>
            "order write conflicted with a concurrent transaction: {message}",
        /// Another record already uses the gateway reference.
        DuplicatePayment { external_reference: String } =>
            "payment reference {external_reference} is already recorded",
    }
}

/// Writes performed when an order is placed.
#[derive(Debug, Clone)]
pub struct OrderPlacement {
    /// The new order with its lines; each line's quantity is reserved with a
    /// conditional stock decrement.
    pub order: Order,
    /// Ledger record created alongside the order.
    pub payment: Option<PaymentRecord>,
    /// Cart lines to remove in the same unit of work; empty for direct
    /// orders. Lines for other products survive.
    pub cart_products: Vec<ProductId>,
}

/// Writes performed when an existing order changes.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    /// The next state of the order.
    pub order: Order,
    /// Revision the caller read; the write fails if it moved.
    pub expected_revision: u32,
    /// Return every line's quantity to stock.
    pub restock: bool,
    /// Ledger records to insert or update, keyed by id.
    pub payments: Vec<PaymentRecord>,
}

/// Criteria for listing orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderListFilter {
    /// Restrict to one buyer.
    pub user_id: Option<UserId>,
    /// Restrict to one fulfilment status.
    pub status: Option<OrderStatus>,
    /// Restrict to one payment status.
    pub payment_status: Option<PaymentStatus>,
}

/// Port for placing, reading and mutating orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Reserve stock, insert the order, its lines and optional payment, and
    /// remove the ordered cart lines, all or nothing.
    async fn place(&self, placement: &OrderPlacement) -> Result<(), OrderRepositoryError>;

    /// Find an order with its lines.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError>;

    /// List orders matching `filter`, newest first.
    async fn list(
        &self,
        filter: &OrderListFilter,
        page: &PageRequest,
    ) -> Result<Page<Order>, OrderRepositoryError>;

    /// Compare-and-set the order, optionally restocking and upserting
    /// payments, all or nothing.
    async fn update(&self, update: &OrderUpdate) -> Result<(), OrderRepositoryError>;
}
