//! Port for catalogue product persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{Product, ProductDetails, ProductFilter, ProductId, Sku};

use super::define_port_error;

define_port_error! {
    /// Errors raised by product repository adapters.
    pub enum ProductRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "product repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "product repository query failed: {message}",
        /// Another product already uses the SKU.
        DuplicateSku { sku: String } =>
            "sku {sku} is already in use",
        /// A stock adjustment would take the level below zero.
        InsufficientStock { product_id: ProductId, available: u32 } =>
            "insufficient stock for product {product_id}: {available} available",
    }
}

/// Port for reading and maintaining catalogue products outside order
/// placement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find a product by id, active or not.
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError>;

    /// Load every product whose id is listed; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError>;

    /// Find a product by SKU, active or not.
    async fn find_by_sku(&self, sku: &Sku) -> Result<Option<Product>, ProductRepositoryError>;

    /// List active products matching `filter`, newest first.
    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> Result<Page<Product>, ProductRepositoryError>;

    /// Distinct brands of active products, alphabetically.
    async fn list_brands(&self) -> Result<Vec<String>, ProductRepositoryError>;

    /// Store a new product.
    ///
    /// Fails with [`ProductRepositoryError::DuplicateSku`] when the SKU is
    /// taken.
    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError>;

    /// Replace a product's editable details without touching stock or
    /// visibility. Returns `Ok(None)` for unknown products.
    async fn update_details(
        &self,
        id: &ProductId,
        details: &ProductDetails,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError>;

    /// Apply a signed stock delta atomically.
    ///
    /// Returns `Ok(None)` for unknown products and
    /// [`ProductRepositoryError::InsufficientStock`] when the level would
    /// drop below zero.
    async fn adjust_stock(
        &self,
        id: &ProductId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError>;

    /// Show or hide a product. Returns `Ok(None)` for unknown products.
    async fn set_active(
        &self,
        id: &ProductId,
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError>;
}
