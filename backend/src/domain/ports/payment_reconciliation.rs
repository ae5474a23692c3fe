//! Driving port for gateway payment notifications.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{Error, Gateway, Order, OrderId, PaymentRecord};

/// A verified notification from a card gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentNotification {
    /// Gateway that sent the notification.
    pub gateway: Gateway,
    /// Order the payment is for.
    pub order_id: OrderId,
    /// Gateway status code, mapped through the known vocabulary.
    pub status_code: String,
    /// Gateway transaction reference.
    pub external_reference: String,
    /// Extra gateway context stored on the ledger record.
    pub metadata: Map<String, Value>,
}

/// What reconciliation did.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationOutcome {
    /// The order after reconciliation.
    pub order: Order,
    /// The ledger record after reconciliation.
    pub payment: PaymentRecord,
    /// Whether the order itself changed.
    pub order_changed: bool,
}

/// Driving port applying gateway notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentReconciliation: Send + Sync {
    /// Upsert the ledger record for the transaction and settle the order.
    ///
    /// Replaying a notification converges on one record reflecting the
    /// latest status.
    async fn reconcile(&self, notification: PaymentNotification)
    -> Result<ReconciliationOutcome, Error>;
}
