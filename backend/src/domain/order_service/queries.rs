//! Order and payment reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::OrderService;
use crate::domain::ports::{
    CartRepository, OrderListFilter, OrderQuery, OrderRepository, PaymentOverview,
    PaymentRepository, ProductRepository,
};
use crate::domain::service_support::{map_order_error, map_payment_error, require_operator};
use crate::domain::{Actor, Error, Order, OrderId};

#[async_trait]
impl<O, P, C, Y> OrderQuery for OrderService<O, P, C, Y>
where
    O: OrderRepository,
    P: ProductRepository,
    C: CartRepository,
    Y: PaymentRepository,
{
    async fn get_order(&self, actor: &Actor, order_id: OrderId) -> Result<Order, Error> {
        self.load_accessible_order(actor, &order_id).await
    }

    async fn list_my_orders(&self, actor: &Actor, page: PageRequest) -> Result<Page<Order>, Error> {
        let filter = OrderListFilter {
            user_id: Some(*actor.user_id()),
            ..OrderListFilter::default()
        };
        self.orders
            .list(&filter, &page)
            .await
            .map_err(map_order_error)
    }

    async fn list_orders(
        &self,
        actor: &Actor,
        filter: OrderListFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, Error> {
        require_operator(actor)?;
        self.orders
            .list(&filter, &page)
            .await
            .map_err(map_order_error)
    }

    async fn payment_overview(
        &self,
        actor: &Actor,
        order_id: OrderId,
    ) -> Result<PaymentOverview, Error> {
        let order = self.load_accessible_order(actor, &order_id).await?;
        let records = self
            .payments
            .find_by_order(&order.id)
            .await
            .map_err(map_payment_error)?;
        Ok(PaymentOverview { order, records })
    }
}
