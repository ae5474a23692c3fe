//! Order lifecycle service.
//!
//! Implements [`OrderCommand`](super::ports::OrderCommand),
//! [`OrderQuery`](super::ports::OrderQuery) and
//! [`PaymentReconciliation`](super::ports::PaymentReconciliation). Every
//! mutation is computed on the aggregate and handed to the order repository
//! as one unit of work guarded by the revision the service read.

mod placement;
mod queries;
mod reconciliation;
mod transitions;

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use super::ports::{
    CartRepository, CheckoutRequest, DirectOrderRequest, OrderCommand, OrderRepository,
    OrderUpdate, PaymentRepository, ProductRepository, VerificationDecision,
};
use super::service_support::{map_order_error, map_validation_error};
use super::{
    Actor, Error, NOTE_MAX, Order, OrderId, OrderStatus, PaymentRecord, optional_text,
};

/// Order service implementing the order driving ports.
#[derive(Clone)]
pub struct OrderService<O, P, C, Y> {
    orders: Arc<O>,
    products: Arc<P>,
    carts: Arc<C>,
    payments: Arc<Y>,
    clock: Arc<dyn Clock>,
}

impl<O, P, C, Y> OrderService<O, P, C, Y> {
    /// Create a new service with the given repositories and clock.
    pub fn new(
        orders: Arc<O>,
        products: Arc<P>,
        carts: Arc<C>,
        payments: Arc<Y>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            products,
            carts,
            payments,
            clock,
        }
    }
}

impl<O, P, C, Y> OrderService<O, P, C, Y>
where
    O: OrderRepository,
    P: ProductRepository,
    C: CartRepository,
    Y: PaymentRepository,
{
    async fn load_order(&self, order_id: &OrderId) -> Result<Order, Error> {
        self.orders
            .find_by_id(order_id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| Error::not_found(format!("order {order_id} not found")))
    }

    async fn load_accessible_order(&self, actor: &Actor, order_id: &OrderId) -> Result<Order, Error> {
        let order = self.load_order(order_id).await?;
        if actor.may_access(&order.user_id) {
            Ok(order)
        } else {
            Err(Error::forbidden("order belongs to another user"))
        }
    }

    /// Compare-and-set `next` over `current`.
    async fn persist(
        &self,
        current: &Order,
        next: Order,
        restock: bool,
        payments: Vec<PaymentRecord>,
    ) -> Result<Order, Error> {
        let update = OrderUpdate {
            order: next,
            expected_revision: current.revision,
            restock,
            payments,
        };
        self.orders
            .update(&update)
            .await
            .map_err(map_order_error)?;
        Ok(update.order)
    }
}

#[async_trait]
impl<O, P, C, Y> OrderCommand for OrderService<O, P, C, Y>
where
    O: OrderRepository,
    P: ProductRepository,
    C: CartRepository,
    Y: PaymentRepository,
{
    async fn checkout(&self, actor: &Actor, request: CheckoutRequest) -> Result<Order, Error> {
        self.place_from_cart(actor, request).await
    }

    async fn place_direct_order(
        &self,
        actor: &Actor,
        request: DirectOrderRequest,
    ) -> Result<Order, Error> {
        self.place_single(actor, request).await
    }

    async fn cancel_order(
        &self,
        actor: &Actor,
        order_id: OrderId,
        reason: Option<String>,
    ) -> Result<Order, Error> {
        self.cancel_as_owner(actor, order_id, reason).await
    }

    async fn update_status(
        &self,
        actor: &Actor,
        order_id: OrderId,
        status: OrderStatus,
        reason: Option<String>,
    ) -> Result<Order, Error> {
        self.change_status(actor, order_id, status, reason).await
    }

    async fn update_tracking(
        &self,
        actor: &Actor,
        order_id: OrderId,
        tracking_number: String,
    ) -> Result<Order, Error> {
        self.set_tracking(actor, order_id, tracking_number).await
    }

    async fn verify_payment(
        &self,
        actor: &Actor,
        order_id: OrderId,
        decision: VerificationDecision,
    ) -> Result<Order, Error> {
        self.decide_payment(actor, order_id, decision).await
    }
}

fn note_text(value: Option<&str>, field: &'static str) -> Result<Option<String>, Error> {
    optional_text(value, field, NOTE_MAX).map_err(map_validation_error)
}
