//! Cart domain service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;

use super::ports::{CartCommand, CartRepository, ProductRepository};
use super::service_support::{
    insufficient_stock, map_cart_error, map_product_error, map_quantity_error,
};
use super::{Cart, CartLine, Error, Product, ProductId, Quantity, UserId};

/// Cart service implementing [`CartCommand`].
#[derive(Clone)]
pub struct CartService<C, P> {
    carts: Arc<C>,
    products: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<C, P> CartService<C, P> {
    /// Create a new service over the cart and product repositories.
    pub fn new(carts: Arc<C>, products: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            carts,
            products,
            clock,
        }
    }
}

impl<C, P> CartService<C, P>
where
    C: CartRepository,
    P: ProductRepository,
{
    async fn assemble(&self, user_id: UserId) -> Result<Cart, Error> {
        let lines = self
            .carts
            .lines_for_user(&user_id)
            .await
            .map_err(map_cart_error)?;
        let ids: Vec<ProductId> = lines.iter().map(|line| line.product_id).collect();
        let products = if ids.is_empty() {
            Vec::new()
        } else {
            self.products
                .find_by_ids(&ids)
                .await
                .map_err(map_product_error)?
        };
        Cart::assemble(user_id, lines, products)
            .map_err(|err| Error::internal(err.to_string()))
    }

    async fn orderable_product(&self, product_id: ProductId) -> Result<Product, Error> {
        let product = self
            .products
            .find_by_id(&product_id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| {
                Error::not_found(format!("product {product_id} not found"))
                    .with_details(json!({ "productId": product_id }))
            })?;
        if !product.is_active {
            return Err(
                Error::conflict(format!("product {product_id} is not available"))
                    .with_details(json!({ "productId": product_id })),
            );
        }
        Ok(product)
    }

    async fn existing_line(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<CartLine, Error> {
        self.carts
            .find_line(user_id, product_id)
            .await
            .map_err(map_cart_error)?
            .ok_or_else(|| {
                Error::not_found(format!("product {product_id} is not in the cart"))
                    .with_details(json!({ "productId": product_id }))
            })
    }
}

fn ensure_stock(product: &Product, quantity: Quantity) -> Result<(), Error> {
    if product.can_supply(quantity) {
        Ok(())
    } else {
        Err(insufficient_stock(
            &product.id.to_string(),
            quantity.get(),
            product.quantity_on_hand,
        ))
    }
}

#[async_trait]
impl<C, P> CartCommand for CartService<C, P>
where
    C: CartRepository,
    P: ProductRepository,
{
    async fn view_cart(&self, user_id: UserId) -> Result<Cart, Error> {
        self.assemble(user_id).await
    }

    async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Cart, Error> {
        let product = self.orderable_product(product_id).await?;
        let now = self.clock.utc();
        let existing = self
            .carts
            .find_line(&user_id, &product_id)
            .await
            .map_err(map_cart_error)?;
        let line = match existing {
            Some(line) => {
                let merged = line
                    .quantity
                    .checked_add(quantity)
                    .map_err(map_quantity_error)?;
                line.with_quantity(merged, now)
            }
            None => CartLine::new(user_id, &product, quantity, now),
        };
        ensure_stock(&product, line.quantity)?;
        self.carts
            .upsert_line(&line)
            .await
            .map_err(map_cart_error)?;
        self.assemble(user_id).await
    }

    async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Cart, Error> {
        let line = self.existing_line(&user_id, &product_id).await?;
        let product = self.orderable_product(product_id).await?;
        ensure_stock(&product, quantity)?;
        self.carts
            .upsert_line(&line.with_quantity(quantity, self.clock.utc()))
            .await
            .map_err(map_cart_error)?;
        self.assemble(user_id).await
    }

    async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Result<Cart, Error> {
        let removed = self
            .carts
            .remove_line(&user_id, &product_id)
            .await
            .map_err(map_cart_error)?;
        if !removed {
            return Err(
                Error::not_found(format!("product {product_id} is not in the cart"))
                    .with_details(json!({ "productId": product_id })),
            );
        }
        self.assemble(user_id).await
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<Cart, Error> {
        self.carts.clear(&user_id).await.map_err(map_cart_error)?;
        self.assemble(user_id).await
    }
}

#[cfg(test)]
#[path = "cart_service_tests.rs"]
mod tests;
