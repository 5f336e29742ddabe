//! Payment aggregate with convergent status transitions.
//!
//! Gateway webhooks can be redelivered and arrive out of order, so the
//! completion and failure transitions converge: applying a state the
//! payment already reached reports "unchanged" instead of erroring, and
//! a late failure never regresses a settled payment.

use chrono::{DateTime, Utc};
use common::{BookingId, Currency, Money, PaymentId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The status of a payment at the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Intent created, capture not yet settled (includes captures
    /// awaiting further customer action).
    #[default]
    Pending,

    /// A capture request is in flight at the gateway.
    Processing,

    /// Funds captured.
    Completed,

    /// Capture declined or errored (terminal).
    Failed,

    /// The full captured amount has been returned.
    Refunded,

    /// Part of the captured amount has been returned.
    PartiallyRefunded,
}

impl PaymentStatus {
    /// Returns true once funds have been captured (including after
    /// refunds).
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Completed | PaymentStatus::Refunded | PaymentStatus::PartiallyRefunded
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::PartiallyRefunded => "partially_refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the traveler paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    BankTransfer,
    Wallet,
}

/// Non-sensitive summary of the card used, as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    pub brand: String,
    pub last4: String,
    pub exp_month: u8,
    pub exp_year: u16,
}

/// A single capture attempt for one booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub amount: Money,
    pub currency: Currency,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    /// The gateway's identifier for the payment intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_intent_id: Option<String>,
    /// The gateway's identifier for the settled charge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_charge_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Cumulative amount returned across all refunds.
    pub refunded_amount: Money,
    /// Gateway refund identifiers, in the order they were applied.
    #[serde(default)]
    pub refund_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by the store on every write.
    pub version: u64,
}

impl Payment {
    /// Creates a pending payment for a booking.
    pub fn new(
        booking_id: BookingId,
        user_id: UserId,
        amount: Money,
        currency: Currency,
        method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            booking_id,
            user_id,
            amount,
            currency,
            status: PaymentStatus::Pending,
            method,
            gateway_intent_id: None,
            gateway_charge_id: None,
            card: None,
            failure_reason: None,
            refunded_amount: Money::zero(),
            refund_ids: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Records a successful capture. Returns `false` when the payment
    /// had already settled, so redelivered confirmations are no-ops.
    pub fn mark_completed(
        &mut self,
        gateway_charge_id: Option<String>,
        card: Option<CardSummary>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.status.is_settled() {
            return false;
        }
        self.status = PaymentStatus::Completed;
        if gateway_charge_id.is_some() {
            self.gateway_charge_id = gateway_charge_id;
        }
        if card.is_some() {
            self.card = card;
        }
        self.failure_reason = None;
        self.updated_at = now;
        true
    }

    /// Records a declined or errored capture. A failure reported after
    /// the payment settled is ignored and returns `false`.
    pub fn mark_failed(&mut self, reason: impl Into<String>, now: DateTime<Utc>) -> bool {
        if self.status.is_settled() || self.status == PaymentStatus::Failed {
            return false;
        }
        self.status = PaymentStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.updated_at = now;
        true
    }

    /// Records a refund of `amount`, moving to Refunded when the
    /// cumulative refunded amount reaches the captured amount.
    pub fn record_refund(
        &mut self,
        amount: Money,
        refund_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.status.is_settled() {
            return Err(DomainError::NotRefundable {
                current: self.status.to_string(),
            });
        }
        let refundable = self.remaining_refundable();
        if amount > refundable {
            return Err(DomainError::ExcessiveRefund {
                requested: amount,
                refundable,
            });
        }
        self.refunded_amount += amount;
        self.refund_ids.push(refund_id.into());
        self.status = if self.refunded_amount == self.amount {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::PartiallyRefunded
        };
        self.updated_at = now;
        Ok(())
    }

    /// The captured amount not yet returned.
    pub fn remaining_refundable(&self) -> Money {
        self.amount.saturating_sub(self.refunded_amount)
    }
}
