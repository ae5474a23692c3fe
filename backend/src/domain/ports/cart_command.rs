//! Driving port for the authenticated user's cart.

use async_trait::async_trait;

use crate::domain::{Cart, Error, ProductId, Quantity, UserId};

/// Driving port for cart reads and edits.
///
/// Every operation returns the cart as it stands afterwards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartCommand: Send + Sync {
    /// The user's cart with product summaries and total.
    async fn view_cart(&self, user_id: UserId) -> Result<Cart, Error>;

    /// Add units of a product, merging with an existing line.
    async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Cart, Error>;

    /// Replace the quantity of an existing line.
    async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Cart, Error>;

    /// Remove a line.
    async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Result<Cart, Error>;

    /// Remove every line.
    async fn clear_cart(&self, user_id: UserId) -> Result<Cart, Error>;
}
