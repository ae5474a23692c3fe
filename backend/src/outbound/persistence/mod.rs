//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel rows and domain types and map
//! database failures onto port errors. Multi-row writes (order placement,
//! order updates) run inside a single transaction so stock, orders and the
//! payment ledger never drift apart.
//!
//! # Example
//!
//! ```ignore
//! use storefront::outbound::persistence::{DbPool, DieselOrderRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/store")).await?;
//! let orders = DieselOrderRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_cart_repository;
mod diesel_order_repository;
mod diesel_payment_repository;
mod diesel_product_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_cart_repository::DieselCartRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_payment_repository::DieselPaymentRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
