//! Driving port for order and payment reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Actor, Error, Order, OrderId, PaymentRecord};

use super::OrderListFilter;

/// An order's settlement state and its ledger records.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOverview {
    /// The order.
    pub order: Order,
    /// Ledger records, oldest first.
    pub records: Vec<PaymentRecord>,
}

/// Driving port for order reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// Fetch an order the caller owns, or any order for operators.
    async fn get_order(&self, actor: &Actor, order_id: OrderId) -> Result<Order, Error>;

    /// The caller's own orders, newest first.
    async fn list_my_orders(&self, actor: &Actor, page: PageRequest) -> Result<Page<Order>, Error>;

    /// Every order matching `filter`; operators only.
    async fn list_orders(
        &self,
        actor: &Actor,
        filter: OrderListFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, Error>;

    /// Payment status and ledger records for an order.
    async fn payment_overview(
        &self,
        actor: &Actor,
        order_id: OrderId,
    ) -> Result<PaymentOverview, Error>;
}
