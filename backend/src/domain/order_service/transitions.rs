//! Cancellation, operator status changes and payment verification.

use serde_json::json;
use tracing::info;

use super::{OrderService, note_text};
use crate::domain::ports::{
    CartRepository, OrderRepository, PaymentRepository, ProductRepository, VerificationDecision,
};
use crate::domain::service_support::{
    map_payment_error, map_transition_error, map_validation_error, require_operator,
};
use crate::domain::{
    Actor, Error, Order, OrderId, OrderStatus, OrderValidationError, PaymentRecord,
    PaymentRecordStatus, TRACKING_NUMBER_MAX, optional_text, rejection_reason,
};

impl<O, P, C, Y> OrderService<O, P, C, Y>
where
    O: OrderRepository,
    P: ProductRepository,
    C: CartRepository,
    Y: PaymentRepository,
{
    pub(super) async fn cancel_as_owner(
        &self,
        actor: &Actor,
        order_id: OrderId,
        reason: Option<String>,
    ) -> Result<Order, Error> {
        let reason = note_text(reason.as_deref(), "reason")?;
        let order = self.load_order(&order_id).await?;
        if !order.is_owned_by(actor.user_id()) {
            return Err(Error::forbidden("only the buyer may cancel this order")
                .with_details(json!({ "orderId": order_id })));
        }
        self.cancel(actor, &order, reason.as_deref()).await
    }

    /// Cancel, restock and refund settled ledger records in one update.
    async fn cancel(
        &self,
        actor: &Actor,
        order: &Order,
        reason: Option<&str>,
    ) -> Result<Order, Error> {
        let now = self.clock.utc();
        let next = order.cancel(reason, now).map_err(map_transition_error)?;
        let refunds: Vec<PaymentRecord> = self
            .payments
            .find_by_order(&order.id)
            .await
            .map_err(map_payment_error)?
            .into_iter()
            .filter(|record| record.status == PaymentRecordStatus::Completed)
            .map(|record| record.refunded(now))
            .collect();
        let refunded_records = refunds.len();

        let cancelled = self.persist(order, next, true, refunds).await?;
        info!(
            order_id = %cancelled.id,
            previous_status = %order.status,
            actor = %actor.user_id(),
            refunded_records,
            "order cancelled"
        );
        Ok(cancelled)
    }

    pub(super) async fn change_status(
        &self,
        actor: &Actor,
        order_id: OrderId,
        target: OrderStatus,
        reason: Option<String>,
    ) -> Result<Order, Error> {
        require_operator(actor)?;
        let reason = note_text(reason.as_deref(), "reason")?;
        let order = self.load_order(&order_id).await?;
        if target == OrderStatus::Cancelled && order.status != OrderStatus::Cancelled {
            return self.cancel(actor, &order, reason.as_deref()).await;
        }
        let Some(next) = order
            .advance_to(target, reason.as_deref(), self.clock.utc())
            .map_err(map_transition_error)?
        else {
            return Ok(order);
        };
        let updated = self.persist(&order, next, false, Vec::new()).await?;
        info!(
            order_id = %updated.id,
            from = %order.status,
            to = %updated.status,
            operator = %actor.user_id(),
            "order status changed"
        );
        Ok(updated)
    }

    pub(super) async fn set_tracking(
        &self,
        actor: &Actor,
        order_id: OrderId,
        tracking_number: String,
    ) -> Result<Order, Error> {
        require_operator(actor)?;
        let tracking_number = optional_text(
            Some(tracking_number.as_str()),
            "trackingNumber",
            TRACKING_NUMBER_MAX,
        )
        .and_then(|text| {
            text.ok_or(OrderValidationError::EmptyField {
                field: "trackingNumber",
            })
        })
        .map_err(map_validation_error)?;
        let order = self.load_order(&order_id).await?;
        let next = order
            .with_tracking_number(&tracking_number, self.clock.utc())
            .map_err(map_transition_error)?;
        let updated = self.persist(&order, next, false, Vec::new()).await?;
        info!(
            order_id = %updated.id,
            tracking_number = %tracking_number,
            operator = %actor.user_id(),
            "tracking number updated"
        );
        Ok(updated)
    }

    pub(super) async fn decide_payment(
        &self,
        actor: &Actor,
        order_id: OrderId,
        decision: VerificationDecision,
    ) -> Result<Order, Error> {
        require_operator(actor)?;
        let order = self.load_order(&order_id).await?;
        let now = self.clock.utc();
        let pending: Vec<PaymentRecord> = self
            .payments
            .find_by_order(&order.id)
            .await
            .map_err(map_payment_error)?
            .into_iter()
            .filter(|record| {
                record.status == PaymentRecordStatus::Pending
                    && record.method.requires_manual_proof()
            })
            .collect();

        let (next, records, approved) = match decision {
            VerificationDecision::Approve => {
                let next = order.approve_payment(now).map_err(map_transition_error)?;
                let records = pending
                    .into_iter()
                    .map(|record| record.verified_by(actor.user_id(), now))
                    .collect::<Vec<_>>();
                (next, records, true)
            }
            VerificationDecision::Reject { reason } => {
                let reason = note_text(reason.as_deref(), "reason")?;
                let next = order
                    .reject_payment(reason.as_deref(), now)
                    .map_err(map_transition_error)?;
                let recorded_reason = rejection_reason(reason.as_deref());
                let records = pending
                    .into_iter()
                    .map(|record| record.rejected_by(actor.user_id(), recorded_reason, now))
                    .collect::<Vec<_>>();
                (next, records, false)
            }
        };

        let updated = self.persist(&order, next, false, records).await?;
        info!(
            order_id = %updated.id,
            approved,
            payment_status = %updated.payment_status,
            status = %updated.status,
            operator = %actor.user_id(),
            "payment verification recorded"
        );
        Ok(updated)
    }
}
