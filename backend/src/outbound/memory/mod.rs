//! In-process adapter implementing every storefront repository port.
//!
//! Used when no database is configured and by integration tests. Each
//! multi-write operation runs under a single lock so it is all or nothing,
//! mirroring the transactions of the Diesel adapters.

mod demo;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    CartRepository, CartRepositoryError, OrderListFilter, OrderPlacement, OrderRepository,
    OrderRepositoryError, OrderUpdate, PaymentRepository, PaymentRepositoryError,
    ProductRepository, ProductRepositoryError,
};
use crate::domain::{
    CartLine, Order, OrderId, PaymentId, PaymentRecord, Product, ProductDetails, ProductFilter,
    ProductId, Sku, UserId,
};

pub use demo::demo_catalogue;

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    cart_lines: Vec<CartLine>,
    orders: HashMap<OrderId, Order>,
    payments: HashMap<PaymentId, PaymentRecord>,
}

impl State {
    /// Whether a product other than `id` already uses `sku`.
    fn sku_taken(&self, sku: &Sku, id: &ProductId) -> bool {
        self.products
            .values()
            .any(|other| other.id != *id && other.sku == *sku)
    }

    /// Reference already held by a different record, if any.
    fn conflicting_reference<'a>(&self, record: &'a PaymentRecord) -> Option<&'a str> {
        let reference = record.external_reference.as_deref()?;
        self.payments
            .values()
            .any(|other| other.id != record.id && other.external_reference.as_deref() == Some(reference))
            .then_some(reference)
    }

    fn check_reservation(
        &self,
        order: &Order,
    ) -> Result<Vec<(ProductId, u32)>, OrderRepositoryError> {
        let mut reserved: Vec<(ProductId, u32)> = Vec::new();
        for line in &order.lines {
            let product = self
                .products
                .get(&line.product_id)
                .ok_or_else(|| OrderRepositoryError::product_not_found(line.product_id))?;
            if !product.is_active {
                return Err(OrderRepositoryError::product_unavailable(line.product_id));
            }
            let already = reserved
                .iter()
                .find(|(id, _)| *id == line.product_id)
                .map_or(0, |(_, qty)| *qty);
            let available = product.quantity_on_hand.saturating_sub(already);
            if available < line.quantity.get() {
                return Err(OrderRepositoryError::insufficient_stock(
                    line.product_id,
                    line.quantity.get(),
                    available,
                ));
            }
            match reserved.iter_mut().find(|(id, _)| *id == line.product_id) {
                Some((_, qty)) => *qty += line.quantity.get(),
                None => reserved.push((line.product_id, line.quantity.get())),
            }
        }
        Ok(reserved)
    }
}

/// Shared in-memory storage for products, carts, orders and payments.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `products`.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let state = State {
            products: products
                .into_iter()
                .map(|product| (product.id, product))
                .collect(),
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Insert products whose SKU is not stored yet; returns how many were added.
    ///
    /// # Errors
    ///
    /// Returns a query error if the lock is poisoned.
    pub fn seed(&self, catalogue: &[Product]) -> Result<usize, ProductRepositoryError> {
        let mut state = self.lock(ProductRepositoryError::query)?;
        let mut added = 0;
        for product in catalogue {
            let exists = state.products.values().any(|p| p.sku == product.sku);
            if !exists {
                state.products.insert(product.id, product.clone());
                added += 1;
            }
        }
        Ok(added)
    }

    fn lock<E>(&self, query: impl FnOnce(&'static str) -> E) -> Result<MutexGuard<'_, State>, E> {
        self.state.lock().map_err(|_| query(POISONED))
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, uuid::Uuid)) {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        let state = self.lock(ProductRepositoryError::query)?;
        Ok(state.products.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError> {
        let state = self.lock(ProductRepositoryError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    async fn find_by_sku(&self, sku: &Sku) -> Result<Option<Product>, ProductRepositoryError> {
        let state = self.lock(ProductRepositoryError::query)?;
        Ok(state.products.values().find(|p| &p.sku == sku).cloned())
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> Result<Page<Product>, ProductRepositoryError> {
        let state = self.lock(ProductRepositoryError::query)?;
        let mut matching: Vec<Product> = state
            .products
            .values()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect();
        newest_first(&mut matching, |p| (p.created_at, *p.id.as_uuid()));
        Ok(Page::from_sorted(matching, *page))
    }

    async fn list_brands(&self) -> Result<Vec<String>, ProductRepositoryError> {
        let state = self.lock(ProductRepositoryError::query)?;
        let mut brands: Vec<String> = state
            .products
            .values()
            .filter(|p| p.is_active)
            .map(|p| p.brand.clone())
            .collect();
        brands.sort();
        brands.dedup();
        Ok(brands)
    }

    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        let mut state = self.lock(ProductRepositoryError::query)?;
        if state.products.contains_key(&product.id) {
            return Err(ProductRepositoryError::query("duplicate product id"));
        }
        if state.sku_taken(&product.sku, &product.id) {
            return Err(ProductRepositoryError::duplicate_sku(product.sku.as_str()));
        }
        state.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_details(
        &self,
        id: &ProductId,
        details: &ProductDetails,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut state = self.lock(ProductRepositoryError::query)?;
        if !state.products.contains_key(id) {
            return Ok(None);
        }
        if state.sku_taken(&details.sku, id) {
            return Err(ProductRepositoryError::duplicate_sku(details.sku.as_str()));
        }
        Ok(state.products.get_mut(id).map(|product| {
            *product = product.clone().revised(details.clone(), now);
            product.clone()
        }))
    }

    async fn adjust_stock(
        &self,
        id: &ProductId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut state = self.lock(ProductRepositoryError::query)?;
        let Some(product) = state.products.get_mut(id) else {
            return Ok(None);
        };
        let next = product.stock_after(delta).ok_or_else(|| {
            ProductRepositoryError::insufficient_stock(*id, product.quantity_on_hand)
        })?;
        product.quantity_on_hand = next;
        product.updated_at = now;
        Ok(Some(product.clone()))
    }

    async fn set_active(
        &self,
        id: &ProductId,
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut state = self.lock(ProductRepositoryError::query)?;
        Ok(state.products.get_mut(id).map(|product| {
            product.is_active = active;
            product.updated_at = now;
            product.clone()
        }))
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn lines_for_user(&self, user_id: &UserId) -> Result<Vec<CartLine>, CartRepositoryError> {
        let state = self.lock(CartRepositoryError::query)?;
        Ok(state
            .cart_lines
            .iter()
            .filter(|line| &line.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_line(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Option<CartLine>, CartRepositoryError> {
        let state = self.lock(CartRepositoryError::query)?;
        Ok(state
            .cart_lines
            .iter()
            .find(|line| &line.user_id == user_id && &line.product_id == product_id)
            .cloned())
    }

    async fn upsert_line(&self, line: &CartLine) -> Result<(), CartRepositoryError> {
        let mut state = self.lock(CartRepositoryError::query)?;
        let existing = state
            .cart_lines
            .iter_mut()
            .find(|stored| stored.user_id == line.user_id && stored.product_id == line.product_id);
        match existing {
            Some(stored) => {
                stored.quantity = line.quantity;
                stored.updated_at = line.updated_at;
            }
            None => state.cart_lines.push(line.clone()),
        }
        Ok(())
    }

    async fn remove_line(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<bool, CartRepositoryError> {
        let mut state = self.lock(CartRepositoryError::query)?;
        let before = state.cart_lines.len();
        state
            .cart_lines
            .retain(|line| !(&line.user_id == user_id && &line.product_id == product_id));
        Ok(state.cart_lines.len() < before)
    }

    async fn clear(&self, user_id: &UserId) -> Result<(), CartRepositoryError> {
        let mut state = self.lock(CartRepositoryError::query)?;
        state.cart_lines.retain(|line| &line.user_id != user_id);
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn place(&self, placement: &OrderPlacement) -> Result<(), OrderRepositoryError> {
        let mut state = self.lock(OrderRepositoryError::query)?;
        let order = &placement.order;
        if state.orders.contains_key(&order.id) {
            return Err(OrderRepositoryError::query("duplicate order id"));
        }
        let reserved = state.check_reservation(order)?;
        if let Some(payment) = &placement.payment {
            if let Some(reference) = state.conflicting_reference(payment) {
                return Err(OrderRepositoryError::duplicate_payment(reference));
            }
        }

        for (product_id, quantity) in reserved {
            if let Some(product) = state.products.get_mut(&product_id) {
                product.quantity_on_hand -= quantity;
            }
        }
        state.orders.insert(order.id, order.clone());
        if let Some(payment) = &placement.payment {
            state.payments.insert(payment.id, payment.clone());
        }
        state.cart_lines.retain(|line| {
            line.user_id != order.user_id || !placement.cart_products.contains(&line.product_id)
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let state = self.lock(OrderRepositoryError::query)?;
        Ok(state.orders.get(id).cloned())
    }

    async fn list(
        &self,
        filter: &OrderListFilter,
        page: &PageRequest,
    ) -> Result<Page<Order>, OrderRepositoryError> {
        let state = self.lock(OrderRepositoryError::query)?;
        let mut matching: Vec<Order> = state
            .orders
            .values()
            .filter(|order| filter.user_id.is_none_or(|user| order.user_id == user))
            .filter(|order| filter.status.is_none_or(|status| order.status == status))
            .filter(|order| {
                filter
                    .payment_status
                    .is_none_or(|status| order.payment_status == status)
            })
            .cloned()
            .collect();
        newest_first(&mut matching, |o| (o.created_at, *o.id.as_uuid()));
        Ok(Page::from_sorted(matching, *page))
    }

    async fn update(&self, update: &OrderUpdate) -> Result<(), OrderRepositoryError> {
        let mut state = self.lock(OrderRepositoryError::query)?;
        let order = &update.order;
        let current = state
            .orders
            .get(&order.id)
            .ok_or_else(|| OrderRepositoryError::query("order not found"))?;
        if current.revision != update.expected_revision {
            return Err(OrderRepositoryError::revision_mismatch(
                order.id,
                update.expected_revision,
            ));
        }
        if let Some(reference) = update
            .payments
            .iter()
            .find_map(|payment| state.conflicting_reference(payment))
        {
            return Err(OrderRepositoryError::duplicate_payment(reference));
        }

        if update.restock {
            for line in &order.lines {
                if let Some(product) = state.products.get_mut(&line.product_id) {
                    product.quantity_on_hand =
                        product.quantity_on_hand.saturating_add(line.quantity.get());
                }
            }
        }
        state.orders.insert(order.id, order.clone());
        for payment in &update.payments {
            state.payments.insert(payment.id, payment.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn find_by_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<PaymentRecord>, PaymentRepositoryError> {
        let state = self.lock(PaymentRepositoryError::query)?;
        let mut records: Vec<PaymentRecord> = state
            .payments
            .values()
            .filter(|record| &record.order_id == order_id)
            .cloned()
            .collect();
        records.sort_by_key(|record| (record.created_at, record.id));
        Ok(records)
    }

    async fn find_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<PaymentRecord>, PaymentRepositoryError> {
        let state = self.lock(PaymentRepositoryError::query)?;
        Ok(state
            .payments
            .values()
            .find(|record| record.external_reference.as_deref() == Some(external_reference))
            .cloned())
    }

    async fn upsert(&self, record: &PaymentRecord) -> Result<(), PaymentRepositoryError> {
        let mut state = self.lock(PaymentRepositoryError::query)?;
        if let Some(reference) = state.conflicting_reference(record) {
            return Err(PaymentRepositoryError::duplicate_reference(reference));
        }
        state.payments.insert(record.id, record.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
