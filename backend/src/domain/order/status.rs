//! Order status, payment method and payment status vocabularies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::OrderValidationError;

/// Lowercase, with spaces and hyphens folded to underscores.
fn normalise(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting confirmation.
    Pending,
    /// Accepted by the store.
    Confirmed,
    /// Being picked and packed.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled; stock has been returned.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal statuses accept no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Statuses reachable from `self` in one step.
    pub const fn allowed_targets(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Processing, Self::Cancelled],
            Self::Confirmed => &[Self::Processing, Self::Shipped, Self::Cancelled],
            Self::Processing => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered, Self::Cancelled],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    /// Whether `target` is reachable from `self` in one step.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.allowed_targets().contains(&target)
    }
}

impl FromStr for OrderStatus {
    type Err = OrderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = normalise(s);
        match normalised.as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(OrderValidationError::UnknownStatus(s.to_owned())),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid to the courier.
    CashOnDelivery,
    /// Bank transfer evidenced by an uploaded slip.
    BankTransfer,
    /// First card gateway.
    CardGatewayA,
    /// Second card gateway.
    CardGatewayB,
}

impl PaymentMethod {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cash_on_delivery",
            Self::BankTransfer => "bank_transfer",
            Self::CardGatewayA => "card_gateway_a",
            Self::CardGatewayB => "card_gateway_b",
        }
    }

    /// Methods whose payment a person has to check against submitted proof.
    pub const fn requires_manual_proof(self) -> bool {
        matches!(self, Self::BankTransfer)
    }

    /// Payment status a freshly placed order starts with.
    pub const fn initial_payment_status(self) -> PaymentStatus {
        if self.requires_manual_proof() {
            PaymentStatus::PendingVerification
        } else {
            PaymentStatus::Unpaid
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = OrderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = normalise(s);
        match normalised.as_str() {
            "cash_on_delivery" | "cod" => Ok(Self::CashOnDelivery),
            "bank_transfer" | "bank_slip" => Ok(Self::BankTransfer),
            "card_gateway_a" | "stripe" => Ok(Self::CardGatewayA),
            "card_gateway_b" | "payhere" => Ok(Self::CardGatewayB),
            _ => Err(OrderValidationError::UnknownPaymentMethod(s.to_owned())),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settlement status of an order's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing received yet.
    Unpaid,
    /// Proof submitted; an operator must approve or reject it.
    PendingVerification,
    /// Settled.
    Paid,
    /// Declined or rejected.
    Failed,
    /// Returned after cancellation.
    Refunded,
}

impl PaymentStatus {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::PendingVerification => "pending_verification",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = OrderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = normalise(s);
        match normalised.as_str() {
            "unpaid" => Ok(Self::Unpaid),
            "pending_verification" => Ok(Self::PendingVerification),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(OrderValidationError::UnknownPaymentStatus(s.to_owned())),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
