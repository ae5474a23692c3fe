//! Order aggregate.
//!
//! An [`Order`] is placed once with a fixed set of [`OrderLine`]s and then
//! moves through its status vocabulary. Every mutation produces the next
//! state with `revision` bumped by one; repositories persist it with a
//! compare-and-set on the previous revision.

mod payment;
mod status;

pub use payment::{
    Gateway, GatewayError, GatewayOutcome, PaymentId, PaymentRecord, PaymentRecordStatus,
};
pub use status::{OrderStatus, PaymentMethod, PaymentStatus};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Money, ProductId, Quantity, UserId};

/// Longest accepted street address.
pub const ADDRESS_MAX: usize = 500;
/// Longest accepted city, province or postal code.
pub const LOCALITY_MAX: usize = 100;
/// Longest accepted tracking number.
pub const TRACKING_NUMBER_MAX: usize = 100;
/// Longest accepted free-text note or reason.
pub const NOTE_MAX: usize = 1_000;

const ORDER_NUMBER_PREFIX: &str = "ORD-";
const DEFAULT_REJECTION_REASON: &str = "payment proof rejected";

/// Validation failures for order input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    /// Neither a UUID nor an order number.
    #[error("order id must be a UUID or an order number")]
    InvalidOrderId,
    /// Unknown order status.
    #[error("unknown order status: {0}")]
    UnknownStatus(String),
    /// Unknown payment method.
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),
    /// Unknown payment status.
    #[error("unknown payment status: {0}")]
    UnknownPaymentStatus(String),
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Offending field.
        field: &'static str,
    },
    /// A text field exceeded its length limit.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// Offending field.
        field: &'static str,
        /// Upper bound.
        max: usize,
    },
    /// Bank transfers need a proof-of-payment reference.
    #[error("payment proof is required for {method}")]
    MissingPaymentProof {
        /// Method that needs proof.
        method: PaymentMethod,
    },
    /// Orders need at least one line.
    #[error("order must contain at least one line")]
    NoLines,
    /// Line or order arithmetic overflowed.
    #[error("order total is out of range")]
    TotalOverflow,
}

/// Business-rule violations raised by order state changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderTransitionError {
    /// Delivered and cancelled orders cannot be cancelled.
    #[error("cannot cancel order with status {status}")]
    NotCancellable {
        /// Current status.
        status: OrderStatus,
    },
    /// The transition table does not allow the move.
    #[error("cannot change order status from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
    /// Verification only applies to orders awaiting it.
    #[error("payment is not awaiting verification (current status {payment_status})")]
    PaymentNotAwaitingVerification {
        /// Current payment status.
        payment_status: PaymentStatus,
    },
    /// Cancelled orders do not ship.
    #[error("cannot set a tracking number on a cancelled order")]
    TrackingOnCancelledOrder,
}

/// Order identifier (UUID v7, so ids sort by creation time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generate a new time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Human-facing order number derived from the identifier.
    pub fn order_number(&self) -> OrderNumber {
        OrderNumber(format!(
            "{ORDER_NUMBER_PREFIX}{}",
            self.0.simple().to_string().to_ascii_uppercase()
        ))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = OrderValidationError;

    /// Accept either the UUID or the `ORD-…` order number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let prefix_len = ORDER_NUMBER_PREFIX.len();
        let has_prefix = raw
            .get(..prefix_len)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(ORDER_NUMBER_PREFIX));
        if has_prefix {
            let hex = raw.get(prefix_len..).unwrap_or_default();
            if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(OrderValidationError::InvalidOrderId);
            }
            return u128::from_str_radix(hex, 16)
                .map(|value| Self(Uuid::from_u128(value)))
                .map_err(|_| OrderValidationError::InvalidOrderId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| OrderValidationError::InvalidOrderId)
    }
}

/// Human-facing order number, `ORD-` followed by 32 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// The number as text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn required_text(
    value: &str,
    field: &'static str,
    max: usize,
) -> Result<String, OrderValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OrderValidationError::EmptyField { field });
    }
    if trimmed.chars().count() > max {
        return Err(OrderValidationError::FieldTooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Trim optional free text, treating blank as absent.
///
/// # Errors
///
/// Returns [`OrderValidationError::FieldTooLong`] when the trimmed text
/// exceeds `max` characters.
pub fn optional_text(
    value: Option<&str>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, OrderValidationError> {
    match value.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) if text.chars().count() > max => {
            Err(OrderValidationError::FieldTooLong { field, max })
        }
        Some(text) => Ok(Some(text.to_owned())),
        None => Ok(None),
    }
}

/// Where the order ships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    address: String,
    city: String,
    province: String,
    postal_code: String,
}

impl ShippingAddress {
    /// Validate and trim the shipping fields.
    pub fn new(
        address: &str,
        city: &str,
        province: &str,
        postal_code: &str,
    ) -> Result<Self, OrderValidationError> {
        Ok(Self {
            address: required_text(address, "shippingAddress", ADDRESS_MAX)?,
            city: required_text(city, "shippingCity", LOCALITY_MAX)?,
            province: required_text(province, "shippingProvince", LOCALITY_MAX)?,
            postal_code: required_text(postal_code, "shippingPostalCode", LOCALITY_MAX)?,
        })
    }

    /// Street address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// City.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Province or state.
    pub fn province(&self) -> &str {
        &self.province
    }

    /// Postal code.
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }
}

/// Immutable snapshot of one product's quantity and price on an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    /// Product ordered.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: Quantity,
    /// Unit price charged.
    pub price_per_unit: Money,
    /// `quantity × price_per_unit`.
    pub subtotal: Money,
}

impl OrderLine {
    /// Build a line, computing its subtotal.
    pub fn new(
        product_id: ProductId,
        quantity: Quantity,
        price_per_unit: Money,
    ) -> Result<Self, OrderValidationError> {
        let subtotal = price_per_unit
            .checked_mul(quantity.get())
            .ok_or(OrderValidationError::TotalOverflow)?;
        Ok(Self {
            product_id,
            quantity,
            price_per_unit,
            subtotal,
        })
    }
}

/// Input to [`Order::place`].
#[derive(Debug, Clone)]
pub struct OrderDraft {
    /// Buyer.
    pub user_id: UserId,
    /// Lines, in display order.
    pub lines: Vec<OrderLine>,
    /// How the buyer pays.
    pub payment_method: PaymentMethod,
    /// Delivery address.
    pub shipping: ShippingAddress,
    /// Proof-of-payment reference, required for manual methods.
    pub payment_proof: Option<String>,
    /// Buyer's notes.
    pub notes: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Identifier.
    pub id: OrderId,
    /// Buyer.
    pub user_id: UserId,
    /// Sum of line subtotals, fixed at placement.
    pub total_amount: Money,
    /// Fulfilment status.
    pub status: OrderStatus,
    /// How the buyer pays.
    pub payment_method: PaymentMethod,
    /// Settlement status.
    pub payment_status: PaymentStatus,
    /// Delivery address.
    pub shipping: ShippingAddress,
    /// Proof-of-payment reference.
    pub payment_proof: Option<String>,
    /// Carrier tracking number.
    pub tracking_number: Option<String>,
    /// Buyer notes followed by an append-only audit trail.
    pub notes: Option<String>,
    /// Lines, in display order.
    pub lines: Vec<OrderLine>,
    /// Version counter for compare-and-set updates.
    pub revision: u32,
    /// Placement time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Place a new pending order from a validated draft.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use storefront::domain::{
    ///     Money, Order, OrderDraft, OrderLine, OrderStatus, PaymentMethod, PaymentStatus,
    ///     ProductId, Quantity, ShippingAddress, UserId,
    /// };
    ///
    /// let line = OrderLine::new(ProductId::random(), Quantity::new(2)?, Money::from_minor(500))?;
    /// let order = Order::place(
    ///     OrderDraft {
    ///         user_id: UserId::random(),
    ///         lines: vec![line],
    ///         payment_method: PaymentMethod::CashOnDelivery,
    ///         shipping: ShippingAddress::new("1 Main St", "Colombo", "Western", "00100")?,
    ///         payment_proof: None,
    ///         notes: None,
    ///     },
    ///     Utc::now(),
    /// )?;
    /// assert_eq!(order.total_amount, Money::from_minor(1_000));
    /// assert_eq!(order.status, OrderStatus::Pending);
    /// assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn place(draft: OrderDraft, now: DateTime<Utc>) -> Result<Self, OrderValidationError> {
        let OrderDraft {
            user_id,
            lines,
            payment_method,
            shipping,
            payment_proof,
            notes,
        } = draft;
        if lines.is_empty() {
            return Err(OrderValidationError::NoLines);
        }
        let payment_proof = optional_text(payment_proof.as_deref(), "paymentProof", NOTE_MAX)?;
        if payment_method.requires_manual_proof() && payment_proof.is_none() {
            return Err(OrderValidationError::MissingPaymentProof {
                method: payment_method,
            });
        }
        let notes = optional_text(notes.as_deref(), "notes", NOTE_MAX)?;
        let total_amount = Money::checked_sum(lines.iter().map(|line| line.subtotal))
            .ok_or(OrderValidationError::TotalOverflow)?;

        Ok(Self {
            id: OrderId::generate(),
            user_id,
            total_amount,
            status: OrderStatus::Pending,
            payment_method,
            payment_status: payment_method.initial_payment_status(),
            shipping,
            payment_proof,
            tracking_number: None,
            notes,
            lines,
            revision: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Human-facing order number.
    pub fn order_number(&self) -> OrderNumber {
        self.id.order_number()
    }

    /// Whether `user` placed the order.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }

    fn next_revision(&self, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.revision = self.revision.saturating_add(1);
        next.updated_at = now;
        next
    }

    fn append_note(&mut self, note: &str) {
        self.notes = Some(match self.notes.take() {
            Some(existing) => format!("{existing}\n{note}"),
            None => note.to_owned(),
        });
    }

    /// Cancelled state; stock return and refunds are the caller's concern.
    pub fn cancel(
        &self,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderTransitionError> {
        if self.status.is_terminal() {
            return Err(OrderTransitionError::NotCancellable {
                status: self.status,
            });
        }
        let mut next = self.next_revision(now);
        next.status = OrderStatus::Cancelled;
        next.payment_status = PaymentStatus::Refunded;
        match reason {
            Some(reason) => next.append_note(&format!("Order cancelled: {reason}")),
            None => next.append_note("Order cancelled"),
        }
        Ok(next)
    }

    /// Move to `target` following the transition table.
    ///
    /// Returns `Ok(None)` when the order already has `target`. Cancellation
    /// is routed through [`Order::cancel`].
    pub fn advance_to(
        &self,
        target: OrderStatus,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, OrderTransitionError> {
        if target == self.status {
            return Ok(None);
        }
        if target == OrderStatus::Cancelled {
            return self.cancel(reason, now).map(Some);
        }
        if !self.status.can_transition_to(target) {
            return Err(OrderTransitionError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        let mut next = self.next_revision(now);
        next.status = target;
        let note = match reason {
            Some(reason) => format!("Status changed from {} to {target}: {reason}", self.status),
            None => format!("Status changed from {} to {target}", self.status),
        };
        next.append_note(&note);
        Ok(Some(next))
    }

    /// Record the carrier's tracking number.
    pub fn with_tracking_number(
        &self,
        tracking_number: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderTransitionError> {
        if self.status == OrderStatus::Cancelled {
            return Err(OrderTransitionError::TrackingOnCancelledOrder);
        }
        let mut next = self.next_revision(now);
        next.tracking_number = Some(tracking_number.to_owned());
        next.append_note(&format!("Tracking number set to {tracking_number}"));
        Ok(next)
    }

    fn ensure_awaiting_verification(&self) -> Result<(), OrderTransitionError> {
        if self.payment_status == PaymentStatus::PendingVerification {
            Ok(())
        } else {
            Err(OrderTransitionError::PaymentNotAwaitingVerification {
                payment_status: self.payment_status,
            })
        }
    }

    /// Accept submitted payment proof.
    pub fn approve_payment(&self, now: DateTime<Utc>) -> Result<Self, OrderTransitionError> {
        self.ensure_awaiting_verification()?;
        let mut next = self.next_revision(now);
        next.payment_status = PaymentStatus::Paid;
        if next.status == OrderStatus::Pending {
            next.status = OrderStatus::Confirmed;
        }
        next.append_note("Payment verified");
        Ok(next)
    }

    /// Reject submitted payment proof, recording why.
    pub fn reject_payment(
        &self,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderTransitionError> {
        self.ensure_awaiting_verification()?;
        let mut next = self.next_revision(now);
        next.payment_status = PaymentStatus::Failed;
        next.append_note(&format!(
            "Payment rejected: {}",
            rejection_reason(reason)
        ));
        Ok(next)
    }

    /// Apply a gateway outcome; `None` when the order does not change.
    ///
    /// Cancelled orders keep their state; the ledger still records the
    /// notification.
    pub fn apply_gateway_outcome(&self, outcome: GatewayOutcome, now: DateTime<Utc>) -> Option<Self> {
        if self.status == OrderStatus::Cancelled {
            return None;
        }
        match outcome {
            GatewayOutcome::Succeeded => {
                let confirms = self.status == OrderStatus::Pending;
                if self.payment_status == PaymentStatus::Paid && !confirms {
                    return None;
                }
                let mut next = self.next_revision(now);
                next.payment_status = PaymentStatus::Paid;
                if confirms {
                    next.status = OrderStatus::Confirmed;
                }
                Some(next)
            }
            GatewayOutcome::Failed => {
                if self.payment_status == PaymentStatus::Failed {
                    return None;
                }
                let mut next = self.next_revision(now);
                next.payment_status = PaymentStatus::Failed;
                Some(next)
            }
            GatewayOutcome::Pending => None,
        }
    }
}

/// Reason recorded for a rejected proof, defaulting when none is given.
pub fn rejection_reason(reason: Option<&str>) -> &str {
    reason
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(DEFAULT_REJECTION_REASON)
}
