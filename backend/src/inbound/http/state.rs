//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` so they depend only on
//! driving ports and stay testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    CartCommand, CartRepository, CatalogueCommand, CatalogueQuery, OrderCommand, OrderQuery,
    OrderRepository, PaymentReconciliation, PaymentRepository, ProductRepository,
};
use crate::domain::{CartService, CatalogueService, OrderService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub catalogue: Arc<dyn CatalogueQuery>,
    pub stock: Arc<dyn CatalogueCommand>,
    pub cart: Arc<dyn CartCommand>,
    pub orders: Arc<dyn OrderCommand>,
    pub orders_query: Arc<dyn OrderQuery>,
    pub reconciliation: Arc<dyn PaymentReconciliation>,
}

/// Repositories the domain services are built over.
pub struct Repositories<P, C, O, Y> {
    pub products: Arc<P>,
    pub carts: Arc<C>,
    pub orders: Arc<O>,
    pub payments: Arc<Y>,
}

impl HttpState {
    /// Wire the domain services over a set of repositories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use storefront::inbound::http::state::{HttpState, Repositories};
    /// use storefront::outbound::memory::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let state = HttpState::from_repositories(
    ///     Repositories {
    ///         products: store.clone(),
    ///         carts: store.clone(),
    ///         orders: store.clone(),
    ///         payments: store,
    ///     },
    ///     Arc::new(DefaultClock),
    /// );
    /// let _orders = state.orders.clone();
    /// ```
    pub fn from_repositories<P, C, O, Y>(
        repositories: Repositories<P, C, O, Y>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        P: ProductRepository + 'static,
        C: CartRepository + 'static,
        O: OrderRepository + 'static,
        Y: PaymentRepository + 'static,
    {
        let Repositories {
            products,
            carts,
            orders,
            payments,
        } = repositories;
        let catalogue = Arc::new(CatalogueService::new(products.clone(), clock.clone()));
        let cart = Arc::new(CartService::new(carts.clone(), products.clone(), clock.clone()));
        let order_service = Arc::new(OrderService::new(orders, products, carts, payments, clock));
        Self {
            catalogue: catalogue.clone(),
            stock: catalogue,
            cart,
            orders: order_service.clone(),
            orders_query: order_service.clone(),
            reconciliation: order_service,
        }
    }
}
