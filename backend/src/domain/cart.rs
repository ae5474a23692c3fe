//! Per-user shopping cart lines and the assembled cart view.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{Money, Product, ProductId, Quantity, UserId};

/// One product a user intends to buy.
///
/// `price_at_add` is captured when the product first enters the cart and is
/// what checkout charges, even if the catalogue price moves afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Owner.
    pub user_id: UserId,
    /// Product on the line; unique per user.
    pub product_id: ProductId,
    /// Units requested.
    pub quantity: Quantity,
    /// Unit price snapshot.
    pub price_at_add: Money,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl CartLine {
    /// Start a new line priced at the product's current price.
    pub fn new(user_id: UserId, product: &Product, quantity: Quantity, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            product_id: product.id,
            quantity,
            price_at_add: product.price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the quantity, keeping the price snapshot.
    #[must_use]
    pub fn with_quantity(mut self, quantity: Quantity, now: DateTime<Utc>) -> Self {
        self.quantity = quantity;
        self.updated_at = now;
        self
    }

    /// `quantity × price_at_add`, or `None` on overflow.
    pub fn subtotal(&self) -> Option<Money> {
        self.price_at_add.checked_mul(self.quantity.get())
    }
}

/// A cart line joined with the live product it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// The stored line.
    pub line: CartLine,
    /// The product, if it still exists.
    pub product: Option<Product>,
    /// Line subtotal at the snapshot price.
    pub subtotal: Money,
}

/// A user's cart with its running total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    /// Owner.
    pub user_id: UserId,
    /// Lines, oldest first.
    pub items: Vec<CartItem>,
    /// Sum of line subtotals.
    pub total: Money,
}

/// Raised when cart arithmetic overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cart total overflowed")]
pub struct CartTotalOverflow;

impl Cart {
    /// Join lines with their products and total them.
    pub fn assemble(
        user_id: UserId,
        lines: Vec<CartLine>,
        products: Vec<Product>,
    ) -> Result<Self, CartTotalOverflow> {
        let mut by_id: HashMap<ProductId, Product> =
            products.into_iter().map(|p| (p.id, p)).collect();
        let items = lines
            .into_iter()
            .map(|line| {
                let subtotal = line.subtotal().ok_or(CartTotalOverflow)?;
                let product = by_id.remove(&line.product_id);
                Ok(CartItem {
                    line,
                    product,
                    subtotal,
                })
            })
            .collect::<Result<Vec<_>, CartTotalOverflow>>()?;
        let total =
            Money::checked_sum(items.iter().map(|item| item.subtotal)).ok_or(CartTotalOverflow)?;
        Ok(Self {
            user_id,
            items,
            total,
        })
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProductCondition, Sku};

    fn product(price_minor: i64) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::random(),
            sku: Sku::new(format!("SKU-{price_minor}")).expect("valid sku"),
            name: "Widget".to_owned(),
            brand: "Acme".to_owned(),
            condition: ProductCondition::BrandNew,
            price: Money::from_minor(price_minor),
            quantity_on_hand: 10,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn assemble_totals_snapshot_prices() {
        let user = UserId::random();
        let mut first = product(1_000);
        let second = product(250);
        let now = Utc::now();
        let lines = vec![
            CartLine::new(user, &first, Quantity::new(2).expect("qty"), now),
            CartLine::new(user, &second, Quantity::new(3).expect("qty"), now),
        ];
        first.price = Money::from_minor(9_999);

        let cart = Cart::assemble(user, lines, vec![first, second]).expect("no overflow");
        assert_eq!(cart.total, Money::from_minor(2_750));
        assert!(cart.items.iter().all(|item| item.product.is_some()));
    }

    #[test]
    fn assemble_keeps_lines_for_missing_products() {
        let user = UserId::random();
        let gone = product(500);
        let line = CartLine::new(user, &gone, Quantity::new(1).expect("qty"), Utc::now());

        let cart = Cart::assemble(user, vec![line], Vec::new()).expect("no overflow");
        assert_eq!(cart.items.len(), 1);
        assert!(cart.items.first().is_some_and(|item| item.product.is_none()));
    }
}
