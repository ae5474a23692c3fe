//! Catalogue domain service.
//!
//! Public reads only ever surface active products; operators maintain
//! products, stock and visibility through [`CatalogueCommand`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::ports::{CatalogueCommand, CatalogueQuery, NewProduct, ProductRepository};
use super::service_support::{map_product_error, require_operator};
use super::{Actor, Error, Product, ProductDetails, ProductFilter, ProductId, Sku};

/// Catalogue service implementing the catalogue driving ports.
#[derive(Clone)]
pub struct CatalogueService<P> {
    products: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<P> CatalogueService<P> {
    /// Create a new service over a product repository.
    pub fn new(products: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self { products, clock }
    }
}

fn product_not_found(reference: impl std::fmt::Display) -> Error {
    Error::not_found(format!("product {reference} not found"))
}

fn visible(product: Option<Product>, reference: impl std::fmt::Display) -> Result<Product, Error> {
    product
        .filter(|product| product.is_active)
        .ok_or_else(|| product_not_found(reference))
}

#[async_trait]
impl<P> CatalogueQuery for CatalogueService<P>
where
    P: ProductRepository,
{
    async fn get_product(&self, id: ProductId) -> Result<Product, Error> {
        let product = self
            .products
            .find_by_id(&id)
            .await
            .map_err(map_product_error)?;
        visible(product, id)
    }

    async fn get_product_by_sku(&self, sku: Sku) -> Result<Product, Error> {
        let product = self
            .products
            .find_by_sku(&sku)
            .await
            .map_err(map_product_error)?;
        visible(product, sku)
    }

    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, Error> {
        self.products
            .list(&filter, &page)
            .await
            .map_err(map_product_error)
    }

    async fn list_brands(&self) -> Result<Vec<String>, Error> {
        self.products.list_brands().await.map_err(map_product_error)
    }
}

#[async_trait]
impl<P> CatalogueCommand for CatalogueService<P>
where
    P: ProductRepository,
{
    async fn create_product(&self, actor: &Actor, product: NewProduct) -> Result<Product, Error> {
        require_operator(actor)?;
        let NewProduct {
            details,
            quantity_on_hand,
            is_active,
        } = product;
        let product = Product::create(details, quantity_on_hand, is_active, self.clock.utc());
        self.products
            .insert(&product)
            .await
            .map_err(map_product_error)?;
        info!(
            product_id = %product.id,
            sku = %product.sku,
            operator = %actor.user_id(),
            "product created"
        );
        Ok(product)
    }

    async fn update_product(
        &self,
        actor: &Actor,
        id: ProductId,
        details: ProductDetails,
    ) -> Result<Product, Error> {
        require_operator(actor)?;
        let product = self
            .products
            .update_details(&id, &details, self.clock.utc())
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| product_not_found(id))?;
        info!(product_id = %id, sku = %product.sku, operator = %actor.user_id(), "product updated");
        Ok(product)
    }

    async fn delete_product(&self, actor: &Actor, id: ProductId) -> Result<Product, Error> {
        self.set_active(actor, id, false).await
    }

    async fn adjust_stock(
        &self,
        actor: &Actor,
        id: ProductId,
        delta: i64,
    ) -> Result<Product, Error> {
        require_operator(actor)?;
        let product = self
            .products
            .adjust_stock(&id, delta, self.clock.utc())
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| product_not_found(id))?;
        info!(
            product_id = %id,
            delta,
            quantity_on_hand = product.quantity_on_hand,
            operator = %actor.user_id(),
            "stock adjusted"
        );
        Ok(product)
    }

    async fn set_active(
        &self,
        actor: &Actor,
        id: ProductId,
        active: bool,
    ) -> Result<Product, Error> {
        require_operator(actor)?;
        let product = self
            .products
            .set_active(&id, active, self.clock.utc())
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| product_not_found(id))?;
        info!(product_id = %id, active, operator = %actor.user_id(), "product visibility changed");
        Ok(product)
    }
}

#[cfg(test)]
#[path = "catalogue_service_tests.rs"]
mod tests;
