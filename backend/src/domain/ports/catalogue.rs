//! Driving ports for catalogue reads and operator product management.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Actor, Error, Product, ProductDetails, ProductFilter, ProductId, Sku};

/// Driving port for public catalogue reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueQuery: Send + Sync {
    /// Fetch an active product by id.
    async fn get_product(&self, id: ProductId) -> Result<Product, Error>;

    /// Fetch an active product by SKU.
    async fn get_product_by_sku(&self, sku: Sku) -> Result<Product, Error>;

    /// List active products matching `filter`.
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, Error>;

    /// Distinct brands of active products.
    async fn list_brands(&self) -> Result<Vec<String>, Error>;
}

/// A product an operator is adding to the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Editable details.
    pub details: ProductDetails,
    /// Opening stock level.
    pub quantity_on_hand: u32,
    /// Listed straight away.
    pub is_active: bool,
}

/// Driving port for operator product, stock and visibility changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueCommand: Send + Sync {
    /// Add a product; the SKU must be unused.
    async fn create_product(&self, actor: &Actor, product: NewProduct) -> Result<Product, Error>;

    /// Replace a product's editable details. Stock changes go through
    /// [`CatalogueCommand::adjust_stock`].
    async fn update_product(
        &self,
        actor: &Actor,
        id: ProductId,
        details: ProductDetails,
    ) -> Result<Product, Error>;

    /// Withdraw a product from sale. Rows are kept so past orders still
    /// resolve their lines.
    async fn delete_product(&self, actor: &Actor, id: ProductId) -> Result<Product, Error>;

    /// Apply a signed stock delta; the level may not go below zero.
    async fn adjust_stock(
        &self,
        actor: &Actor,
        id: ProductId,
        delta: i64,
    ) -> Result<Product, Error>;

    /// Show or hide a product.
    async fn set_active(&self, actor: &Actor, id: ProductId, active: bool)
    -> Result<Product, Error>;
}
