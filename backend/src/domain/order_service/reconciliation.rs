//! Gateway notification reconciliation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use super::OrderService;
use crate::domain::ports::{
    CartRepository, OrderRepository, PaymentNotification, PaymentReconciliation,
    PaymentRepository, ProductRepository, ReconciliationOutcome,
};
use crate::domain::service_support::map_payment_error;
use crate::domain::{Error, GatewayOutcome, Order, PaymentRecord};

const EXTERNAL_REFERENCE_MAX: usize = 255;

fn external_reference(raw: &str) -> Result<&str, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request("transaction reference must not be empty")
            .with_details(json!({ "field": "transactionReference" })));
    }
    if trimmed.chars().count() > EXTERNAL_REFERENCE_MAX {
        return Err(Error::invalid_request(format!(
            "transaction reference must be at most {EXTERNAL_REFERENCE_MAX} characters"
        ))
        .with_details(json!({ "field": "transactionReference" })));
    }
    Ok(trimmed)
}

impl<O, P, C, Y> OrderService<O, P, C, Y>
where
    O: OrderRepository,
    P: ProductRepository,
    C: CartRepository,
    Y: PaymentRepository,
{
    /// Pending proof records on `order`, closed in favour of `reference`.
    async fn superseded_proofs(
        &self,
        order: &Order,
        reference: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<PaymentRecord>, Error> {
        let records = self
            .payments
            .find_by_order(&order.id)
            .await
            .map_err(map_payment_error)?;
        let closed: Vec<PaymentRecord> = records
            .into_iter()
            .filter(PaymentRecord::is_pending_proof)
            .map(|record| record.superseded_by_gateway(reference, now))
            .collect();
        if !closed.is_empty() {
            info!(
                order_id = %order.id,
                external_reference = %reference,
                superseded = closed.len(),
                "pending payment proof superseded by gateway payment"
            );
        }
        Ok(closed)
    }
}

#[async_trait]
impl<O, P, C, Y> PaymentReconciliation for OrderService<O, P, C, Y>
where
    O: OrderRepository,
    P: ProductRepository,
    C: CartRepository,
    Y: PaymentRepository,
{
    async fn reconcile(
        &self,
        notification: PaymentNotification,
    ) -> Result<ReconciliationOutcome, Error> {
        let PaymentNotification {
            gateway,
            order_id,
            status_code,
            external_reference: raw_reference,
            metadata,
        } = notification;
        let outcome = GatewayOutcome::from_status_code(&status_code).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "status", "value": status_code }))
        })?;
        let reference = external_reference(&raw_reference)?;

        let order = self.load_order(&order_id).await?;
        if gateway.payment_method() != order.payment_method {
            warn!(
                order_id = %order.id,
                %gateway,
                payment_method = %order.payment_method,
                "gateway notification for an order paid another way"
            );
        }

        let now = self.clock.utc();
        let existing = self
            .payments
            .find_by_external_reference(reference)
            .await
            .map_err(map_payment_error)?;
        let record = match existing {
            Some(record) if record.order_id != order.id => {
                return Err(Error::conflict(
                    "transaction reference belongs to another order",
                )
                .with_details(json!({
                    "externalReference": reference,
                    "orderId": order.id,
                })));
            }
            Some(record) => record,
            None => PaymentRecord::for_gateway(&order, gateway, reference, now),
        }
        .with_gateway_outcome(outcome, status_code.trim(), metadata, now);

        let (order, order_changed) = match order.apply_gateway_outcome(outcome, now) {
            Some(next) => {
                let mut writes = vec![record.clone()];
                if outcome == GatewayOutcome::Succeeded {
                    writes.extend(self.superseded_proofs(&order, reference, now).await?);
                }
                let updated = self.persist(&order, next, false, writes).await?;
                (updated, true)
            }
            None => {
                self.payments
                    .upsert(&record)
                    .await
                    .map_err(map_payment_error)?;
                (order, false)
            }
        };

        info!(
            order_id = %order.id,
            %gateway,
            external_reference = %reference,
            record_status = %record.status,
            payment_status = %order.payment_status,
            order_changed,
            "payment notification reconciled"
        );
        Ok(ReconciliationOutcome {
            order,
            payment: record,
            order_changed,
        })
    }
}
