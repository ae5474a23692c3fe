//! Helpers for driving the storefront over HTTP in tests.
//!
//! Compiled for unit tests and, through the `test-support` feature, for the
//! integration suites under `tests/`. Everything runs over the in-memory
//! store with fixed secrets.

use std::sync::Arc;

use actix_web::web;
use chrono::Utc;
use mockable::DefaultClock;

use crate::domain::ports::{
    PaymentRepository, PaymentRepositoryError, ProductRepository, ProductRepositoryError,
};
use crate::domain::{
    Actor, Error, Money, OrderId, PaymentRecord, Product, ProductCondition, ProductId, Sku,
};
use crate::inbound::http::auth::TokenVerifier;
use crate::inbound::http::health::HealthState;
use crate::inbound::http::routes::AppData;
use crate::inbound::http::signature::{SIGNATURE_HEADER, WebhookVerifier};
use crate::inbound::http::state::{HttpState, Repositories};
use crate::outbound::memory::InMemoryStore;

/// Key used to sign test bearer tokens.
pub const TOKEN_SECRET: &str = "storefront-test-token-secret";
/// Key used to sign test gateway notifications.
pub const WEBHOOK_SECRET: &str = "storefront-test-webhook-secret";

/// Build an active, brand-new catalogue entry.
///
/// # Errors
///
/// Returns `invalid_request` when `sku` or `price` do not parse.
///
/// # Examples
/// ```
/// use storefront::test_support::product;
///
/// let watch = product("SEI-001", "1000", 5)?;
/// assert_eq!(watch.quantity_on_hand, 5);
/// # Ok::<(), storefront::domain::Error>(())
/// ```
pub fn product(sku: &str, price: &str, stock: u32) -> Result<Product, Error> {
    let now = Utc::now();
    Ok(Product {
        id: ProductId::random(),
        sku: Sku::new(sku).map_err(|err| Error::invalid_request(err.to_string()))?,
        name: format!("Watch {sku}"),
        brand: "Seiko".to_owned(),
        condition: ProductCondition::BrandNew,
        price: price
            .parse::<Money>()
            .map_err(|err| Error::invalid_request(err.to_string()))?,
        quantity_on_hand: stock,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

/// A storefront wired over a fresh in-memory store.
pub struct TestStorefront {
    /// Backing store, shared with the services.
    pub store: Arc<InMemoryStore>,
    app_data: AppData,
}

impl TestStorefront {
    /// Seed the store with `products` and mark the app ready.
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Arc::new(InMemoryStore::with_products(products));
        let state = HttpState::from_repositories(
            Repositories {
                products: store.clone(),
                carts: store.clone(),
                orders: store.clone(),
                payments: store.clone(),
            },
            Arc::new(DefaultClock),
        );
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        Self {
            store,
            app_data: AppData {
                state: web::Data::new(state),
                tokens: web::Data::new(TokenVerifier::new(TOKEN_SECRET)),
                webhooks: web::Data::new(WebhookVerifier::new(WEBHOOK_SECRET)),
                health,
            },
        }
    }

    /// Register app data and routes; pass to `App::configure`.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        self.app_data.register(cfg);
    }

    /// `Authorization` header value for `actor`.
    ///
    /// # Errors
    ///
    /// Propagates token signing failures.
    pub fn bearer(&self, actor: &Actor) -> Result<(&'static str, String), Error> {
        let token = self.app_data.tokens.issue(actor, 600)?;
        Ok(("Authorization", format!("Bearer {token}")))
    }

    /// Signature header for a notification body.
    ///
    /// # Errors
    ///
    /// Propagates signing failures.
    pub fn signature(&self, body: &[u8]) -> Result<(&'static str, String), Error> {
        Ok((SIGNATURE_HEADER, self.app_data.webhooks.sign(body)?))
    }

    /// Current state of a product, read straight from the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        ProductRepository::find_by_id(self.store.as_ref(), &id).await
    }

    /// Ledger records for an order.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn payments(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<PaymentRecord>, PaymentRepositoryError> {
        PaymentRepository::find_by_order(self.store.as_ref(), &order_id).await
    }
}
