//! Payment gateway trait and wire types.

use async_trait::async_trait;
use common::{Currency, Money};
use domain::CardSummary;
use serde::Serialize;

use crate::error::PaymentsError;

/// Status of an intent as the gateway reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayPaymentStatus {
    /// Funds captured.
    Succeeded,
    /// The customer must complete an extra step (e.g. 3-D Secure).
    RequiresAction,
    /// Declined or errored.
    Failed,
}

/// A freshly created intent, returned to the client for confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub client_secret: String,
}

/// The gateway's answer to a capture attempt or an intent lookup.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub intent_id: String,
    pub status: GatewayPaymentStatus,
    pub charge_id: Option<String>,
    pub card: Option<CardSummary>,
    pub failure_message: Option<String>,
}

/// A completed refund at the gateway.
#[derive(Debug, Clone)]
pub struct RefundOutcome {
    pub refund_id: String,
}

/// A stored payment method, summarized for display.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodSummary {
    pub id: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last4: Option<String>,
}

/// Adapter over the payment gateway's API.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates an intent for the given amount without capturing.
    async fn create_intent(
        &self,
        amount: Money,
        currency: &Currency,
        description: Option<&str>,
    ) -> Result<PaymentIntent, PaymentsError>;

    /// Captures an intent with the given payment method.
    async fn capture(
        &self,
        intent_id: &str,
        payment_method_id: &str,
    ) -> Result<CaptureOutcome, PaymentsError>;

    /// Fetches the current state of an intent. Used to resolve captures
    /// whose outcome was lost to a timeout.
    async fn lookup_intent(&self, intent_id: &str) -> Result<CaptureOutcome, PaymentsError>;

    /// Refunds part or all of a settled charge.
    async fn refund(&self, charge_id: &str, amount: Money) -> Result<RefundOutcome, PaymentsError>;

    /// Lists the customer's stored payment methods.
    async fn list_payment_methods(
        &self,
        customer_id: &str,
    ) -> Result<Vec<PaymentMethodSummary>, PaymentsError>;
}
