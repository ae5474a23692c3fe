//! Port for per-user cart lines.

use async_trait::async_trait;

use crate::domain::{CartLine, ProductId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by cart repository adapters.
    pub enum CartRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "cart repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "cart repository query failed: {message}",
    }
}

/// Port for reading and writing cart lines.
///
/// Checkout clears carts through [`super::OrderRepository::place`] so the
/// clear shares the order's transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Lines for a user, oldest first.
    async fn lines_for_user(&self, user_id: &UserId) -> Result<Vec<CartLine>, CartRepositoryError>;

    /// The line for one product, if present.
    async fn find_line(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Option<CartLine>, CartRepositoryError>;

    /// Insert a line or replace the quantity of an existing one.
    ///
    /// An existing line keeps its `price_at_add` and `created_at`.
    async fn upsert_line(&self, line: &CartLine) -> Result<(), CartRepositoryError>;

    /// Remove one line; `false` when there was nothing to remove.
    async fn remove_line(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<bool, CartRepositoryError>;

    /// Remove every line for a user.
    async fn clear(&self, user_id: &UserId) -> Result<(), CartRepositoryError>;
}
