//! Port for the payment ledger.

use async_trait::async_trait;

use crate::domain::{OrderId, PaymentRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment ledger adapters.
    pub enum PaymentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "payment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "payment repository query failed: {message}",
        /// Another record already uses the gateway reference.
        DuplicateReference { external_reference: String } =>
            "payment reference {external_reference} is already recorded",
    }
}

/// Port for reading and recording payment attempts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Records for an order, oldest first.
    async fn find_by_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<PaymentRecord>, PaymentRepositoryError>;

    /// The record carrying a gateway reference, if any.
    async fn find_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<PaymentRecord>, PaymentRepositoryError>;

    /// Insert a record or update the one with the same id.
    async fn upsert(&self, record: &PaymentRecord) -> Result<(), PaymentRepositoryError>;
}
