//! Builders for the HTTP state over the configured storage backend.

use std::sync::Arc;

use actix_web::web;
use chrono::Utc;
use mockable::DefaultClock;
use tracing::{info, warn};

use storefront::inbound::http::auth::TokenVerifier;
use storefront::inbound::http::health::HealthState;
use storefront::inbound::http::routes::AppData;
use storefront::inbound::http::signature::WebhookVerifier;
use storefront::inbound::http::state::{HttpState, Repositories};
use storefront::outbound::memory::{InMemoryStore, demo_catalogue};
use storefront::outbound::persistence::{
    DbPool, DieselCartRepository, DieselOrderRepository, DieselPaymentRepository,
    DieselProductRepository,
};

use super::ServerConfig;

fn diesel_state(pool: &DbPool) -> HttpState {
    HttpState::from_repositories(
        Repositories {
            products: Arc::new(DieselProductRepository::new(pool.clone())),
            carts: Arc::new(DieselCartRepository::new(pool.clone())),
            orders: Arc::new(DieselOrderRepository::new(pool.clone())),
            payments: Arc::new(DieselPaymentRepository::new(pool.clone())),
        },
        Arc::new(DefaultClock),
    )
}

fn memory_state() -> std::io::Result<HttpState> {
    let products = demo_catalogue(Utc::now())
        .map_err(|err| std::io::Error::other(format!("demo catalogue is invalid: {err}")))?;
    warn!(
        products = products.len(),
        "no database configured; serving the in-memory demo catalogue"
    );
    let store = Arc::new(InMemoryStore::with_products(products));
    Ok(HttpState::from_repositories(
        Repositories {
            products: store.clone(),
            carts: store.clone(),
            orders: store.clone(),
            payments: store,
        },
        Arc::new(DefaultClock),
    ))
}

/// Build the HTTP state for the configured backend.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the demo catalogue cannot be built.
pub fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    match &config.db_pool {
        Some(pool) => {
            info!("serving from PostgreSQL");
            Ok(diesel_state(pool))
        }
        None => memory_state(),
    }
}

/// Assemble everything the route table expects as app data.
///
/// # Errors
///
/// Propagates [`build_http_state`] failures.
pub fn build_app_data(
    config: &ServerConfig,
    health: web::Data<HealthState>,
) -> std::io::Result<AppData> {
    Ok(AppData {
        state: web::Data::new(build_http_state(config)?),
        tokens: web::Data::new(TokenVerifier::new(&config.secrets.jwt)),
        webhooks: web::Data::new(WebhookVerifier::new(&config.secrets.webhook)),
        health,
    })
}
