//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by outbound adapters; driving
//! ports (`CatalogueQuery`, `OrderCommand`, ...) are implemented by the domain
//! services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod cart_command;
mod cart_repository;
mod catalogue;
mod order_command;
mod order_query;
mod order_repository;
mod payment_reconciliation;
mod payment_repository;
mod product_repository;

pub use cart_command::CartCommand;
#[cfg(test)]
pub use cart_command::MockCartCommand;
#[cfg(test)]
pub use cart_repository::MockCartRepository;
pub use cart_repository::{CartRepository, CartRepositoryError};
pub use catalogue::{CatalogueCommand, CatalogueQuery, NewProduct};
#[cfg(test)]
pub use catalogue::{MockCatalogueCommand, MockCatalogueQuery};
#[cfg(test)]
pub use order_command::MockOrderCommand;
pub use order_command::{CheckoutRequest, DirectOrderRequest, OrderCommand, VerificationDecision};
#[cfg(test)]
pub use order_query::MockOrderQuery;
pub use order_query::{OrderQuery, PaymentOverview};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{
    OrderListFilter, OrderPlacement, OrderRepository, OrderRepositoryError, OrderUpdate,
};
#[cfg(test)]
pub use payment_reconciliation::MockPaymentReconciliation;
pub use payment_reconciliation::{
    PaymentNotification, PaymentReconciliation, ReconciliationOutcome,
};
#[cfg(test)]
pub use payment_repository::MockPaymentRepository;
pub use payment_repository::{PaymentRepository, PaymentRepositoryError};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{ProductRepository, ProductRepositoryError};
