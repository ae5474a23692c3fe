//! Payment ledger records and gateway notification vocabulary.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Order, OrderId, PaymentMethod};
use crate::domain::{Money, UserId};

/// Errors raised while interpreting gateway input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The path named a gateway the store does not use.
    #[error("unknown payment gateway: {0}")]
    UnknownGateway(String),
    /// The notification carried a status outside the known vocabulary.
    #[error("unknown gateway payment status: {0}")]
    UnknownStatus(String),
}

/// Payment record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Generate a new identifier.
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
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of one payment attempt in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentRecordStatus {
    /// Awaiting settlement or verification.
    Pending,
    /// Settled.
    Completed,
    /// Declined or rejected.
    Failed,
    /// Returned to the customer.
    Refunded,
}

impl PaymentRecordStatus {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentRecordStatus {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(GatewayError::UnknownStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for PaymentRecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External card gateways that post payment notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gateway {
    /// First card gateway.
    CardGatewayA,
    /// Second card gateway.
    CardGatewayB,
}

impl Gateway {
    /// Canonical name.
    pub const fn as_str(self) -> &'static str {
        self.payment_method().as_str()
    }

    /// Payment method settled through this gateway.
    pub const fn payment_method(self) -> PaymentMethod {
        match self {
            Self::CardGatewayA => PaymentMethod::CardGatewayA,
            Self::CardGatewayB => PaymentMethod::CardGatewayB,
        }
    }
}

impl FromStr for Gateway {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<PaymentMethod>() {
            Ok(PaymentMethod::CardGatewayA) => Ok(Self::CardGatewayA),
            Ok(PaymentMethod::CardGatewayB) => Ok(Self::CardGatewayB),
            _ => Err(GatewayError::UnknownGateway(s.to_owned())),
        }
    }
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalised meaning of a gateway status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOutcome {
    /// Money captured.
    Succeeded,
    /// Declined, cancelled or errored.
    Failed,
    /// Still in flight.
    Pending,
}

impl GatewayOutcome {
    /// Map a gateway's status code onto an outcome.
    ///
    /// Text codes are matched case-insensitively; numeric codes follow the
    /// `2` / `0` / negative convention some gateways use.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::GatewayOutcome;
    ///
    /// assert_eq!(GatewayOutcome::from_status_code("2"), Ok(GatewayOutcome::Succeeded));
    /// assert_eq!(GatewayOutcome::from_status_code("requires_action"), Ok(GatewayOutcome::Pending));
    /// assert!(GatewayOutcome::from_status_code("mystery").is_err());
    /// ```
    pub fn from_status_code(code: &str) -> Result<Self, GatewayError> {
        let normalised = code.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "succeeded" | "success" | "completed" | "paid" | "2" => Ok(Self::Succeeded),
            "failed" | "canceled" | "cancelled" | "declined" | "-1" | "-2" | "-3" => {
                Ok(Self::Failed)
            }
            "pending" | "processing" | "requires_action" | "0" => Ok(Self::Pending),
            _ => Err(GatewayError::UnknownStatus(code.to_owned())),
        }
    }

    /// Ledger status the outcome records.
    pub const fn record_status(self) -> PaymentRecordStatus {
        match self {
            Self::Succeeded => PaymentRecordStatus::Completed,
            Self::Failed => PaymentRecordStatus::Failed,
            Self::Pending => PaymentRecordStatus::Pending,
        }
    }
}

/// One payment attempt against an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    /// Identifier.
    pub id: PaymentId,
    /// Order being paid.
    pub order_id: OrderId,
    /// Amount charged.
    pub amount: Money,
    /// Method used.
    pub method: PaymentMethod,
    /// Ledger status.
    pub status: PaymentRecordStatus,
    /// Gateway transaction reference; unique when present.
    pub external_reference: Option<String>,
    /// Settlement time.
    pub paid_at: Option<DateTime<Utc>>,
    /// Free-form context (gateway payloads, verifier, proof reference).
    pub metadata: Map<String, Value>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl PaymentRecord {
    fn pending(order: &Order, method: PaymentMethod, now: DateTime<Utc>) -> Self {
        Self {
            id: PaymentId::generate(),
            order_id: order.id,
            amount: order.total_amount,
            method,
            status: PaymentRecordStatus::Pending,
            external_reference: None,
            paid_at: None,
            metadata: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Pending record for an order paid by submitted proof.
    pub fn for_manual_proof(order: &Order, proof_reference: &str, now: DateTime<Utc>) -> Self {
        let mut record = Self::pending(order, order.payment_method, now);
        record
            .metadata
            .insert("proofReference".to_owned(), json!(proof_reference));
        record
    }

    /// Fresh record for the first notification about a gateway transaction.
    pub fn for_gateway(
        order: &Order,
        gateway: Gateway,
        external_reference: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let mut record = Self::pending(order, gateway.payment_method(), now);
        record.external_reference = Some(external_reference.to_owned());
        record
    }

    /// Apply a gateway outcome, merging the notification's metadata.
    #[must_use]
    pub fn with_gateway_outcome(
        mut self,
        outcome: GatewayOutcome,
        status_code: &str,
        metadata: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Self {
        self.status = outcome.record_status();
        if matches!(outcome, GatewayOutcome::Succeeded) {
            self.paid_at = Some(self.paid_at.unwrap_or(now));
        }
        self.metadata.extend(metadata);
        self.metadata
            .insert("gatewayStatus".to_owned(), json!(status_code));
        self.updated_at = now;
        self
    }

    /// Mark the proof as accepted by an operator.
    #[must_use]
    pub fn verified_by(mut self, operator: &UserId, now: DateTime<Utc>) -> Self {
        self.status = PaymentRecordStatus::Completed;
        self.paid_at = Some(now);
        self.metadata
            .insert("verifiedBy".to_owned(), json!(operator.to_string()));
        self.metadata
            .insert("verifiedAt".to_owned(), json!(now.to_rfc3339()));
        self.updated_at = now;
        self
    }

    /// Mark the proof as rejected by an operator.
    #[must_use]
    pub fn rejected_by(mut self, operator: &UserId, reason: &str, now: DateTime<Utc>) -> Self {
        self.status = PaymentRecordStatus::Failed;
        self.metadata
            .insert("rejectedBy".to_owned(), json!(operator.to_string()));
        self.metadata
            .insert("failureReason".to_owned(), json!(reason));
        self.updated_at = now;
        self
    }

    /// Whether this is submitted proof still waiting for an operator.
    pub fn is_pending_proof(&self) -> bool {
        self.status == PaymentRecordStatus::Pending && self.method.requires_manual_proof()
    }

    /// Close pending proof once a gateway payment has settled the order.
    #[must_use]
    pub fn superseded_by_gateway(mut self, external_reference: &str, now: DateTime<Utc>) -> Self {
        self.status = PaymentRecordStatus::Failed;
        self.metadata.insert(
            "failureReason".to_owned(),
            json!("superseded by gateway payment"),
        );
        self.metadata
            .insert("supersededBy".to_owned(), json!(external_reference));
        self.updated_at = now;
        self
    }

    /// Mark a settled payment as returned.
    #[must_use]
    pub fn refunded(mut self, now: DateTime<Utc>) -> Self {
        self.status = PaymentRecordStatus::Refunded;
        self.metadata
            .insert("refundedAt".to_owned(), json!(now.to_rfc3339()));
        self.updated_at = now;
        self
    }
}
