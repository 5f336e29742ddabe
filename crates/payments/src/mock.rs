//! In-memory payment gateway for wiring and tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{Currency, Money};
use domain::CardSummary;

use crate::error::PaymentsError;
use crate::gateway::{
    CaptureOutcome, GatewayPaymentStatus, PaymentGateway, PaymentIntent, PaymentMethodSummary,
    RefundOutcome,
};

#[derive(Debug, Default)]
struct MockGatewayState {
    intents: HashMap<String, CaptureOutcome>,
    refunds: Vec<(String, Money)>,
    methods: HashMap<String, Vec<PaymentMethodSummary>>,
    next_id: u32,
    decline_with: Option<String>,
    require_action: bool,
    /// When set, captures settle in state but the response is delayed,
    /// so callers with a shorter timeout see the call time out.
    capture_delay: Option<Duration>,
    fail_on_refund: bool,
}

/// In-memory gateway with switches for declines, pending actions, and
/// slow captures.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    state: Arc<RwLock<MockGatewayState>>,
}

impl MockGateway {
    /// Creates a new gateway with no stored state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent captures decline with the given message.
    pub fn set_decline(&self, message: Option<&str>) {
        self.state.write().unwrap().decline_with = message.map(str::to_string);
    }

    /// Makes subsequent captures return requires-action.
    pub fn set_require_action(&self, require: bool) {
        self.state.write().unwrap().require_action = require;
    }

    /// Delays capture responses while still settling them, to exercise
    /// the timeout-then-lookup path.
    pub fn set_capture_delay(&self, delay: Option<Duration>) {
        self.state.write().unwrap().capture_delay = delay;
    }

    /// Makes subsequent refunds fail.
    pub fn set_fail_on_refund(&self, fail: bool) {
        self.state.write().unwrap().fail_on_refund = fail;
    }

    /// Registers stored payment methods for a customer.
    pub fn set_payment_methods(&self, customer_id: &str, methods: Vec<PaymentMethodSummary>) {
        self.state
            .write()
            .unwrap()
            .methods
            .insert(customer_id.to_string(), methods);
    }

    /// Returns the number of refunds issued.
    pub fn refund_count(&self) -> usize {
        self.state.read().unwrap().refunds.len()
    }

    /// Returns the total amount refunded across all charges.
    pub fn refunded_total(&self) -> Money {
        self.state
            .read()
            .unwrap()
            .refunds
            .iter()
            .fold(Money::zero(), |acc, (_, amount)| acc + *amount)
    }

    fn test_card() -> CardSummary {
        CardSummary {
            brand: "visa".to_string(),
            last4: "4242".to_string(),
            exp_month: 12,
            exp_year: 2030,
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_intent(
        &self,
        amount: Money,
        _currency: &Currency,
        _description: Option<&str>,
    ) -> Result<PaymentIntent, PaymentsError> {
        if !amount.is_positive() {
            return Err(PaymentsError::Validation(
                "amount must be positive".to_string(),
            ));
        }

        let mut state = self.state.write().unwrap();
        state.next_id += 1;
        let intent_id = format!("pi_{:06}", state.next_id);
        state.intents.insert(
            intent_id.clone(),
            CaptureOutcome {
                intent_id: intent_id.clone(),
                status: GatewayPaymentStatus::RequiresAction,
                charge_id: None,
                card: None,
                failure_message: None,
            },
        );

        Ok(PaymentIntent {
            client_secret: format!("{intent_id}_secret"),
            intent_id,
        })
    }

    async fn capture(
        &self,
        intent_id: &str,
        _payment_method_id: &str,
    ) -> Result<CaptureOutcome, PaymentsError> {
        let (outcome, delay) = {
            let mut state = self.state.write().unwrap();
            if !state.intents.contains_key(intent_id) {
                return Err(PaymentsError::NotFound(intent_id.to_string()));
            }

            let outcome = if let Some(message) = state.decline_with.clone() {
                CaptureOutcome {
                    intent_id: intent_id.to_string(),
                    status: GatewayPaymentStatus::Failed,
                    charge_id: None,
                    card: None,
                    failure_message: Some(message),
                }
            } else if state.require_action {
                CaptureOutcome {
                    intent_id: intent_id.to_string(),
                    status: GatewayPaymentStatus::RequiresAction,
                    charge_id: None,
                    card: None,
                    failure_message: None,
                }
            } else {
                CaptureOutcome {
                    intent_id: intent_id.to_string(),
                    status: GatewayPaymentStatus::Succeeded,
                    charge_id: Some(format!("ch_{}", &intent_id[3..])),
                    card: Some(Self::test_card()),
                    failure_message: None,
                }
            };

            state.intents.insert(intent_id.to_string(), outcome.clone());
            (outcome, state.capture_delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(outcome)
    }

    async fn lookup_intent(&self, intent_id: &str) -> Result<CaptureOutcome, PaymentsError> {
        let state = self.state.read().unwrap();
        state
            .intents
            .get(intent_id)
            .cloned()
            .ok_or_else(|| PaymentsError::NotFound(intent_id.to_string()))
    }

    async fn refund(&self, charge_id: &str, amount: Money) -> Result<RefundOutcome, PaymentsError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_refund {
            return Err(PaymentsError::Gateway(
                "refund rejected by gateway".to_string(),
            ));
        }

        state.next_id += 1;
        let refund_id = format!("re_{:06}", state.next_id);
        state.refunds.push((charge_id.to_string(), amount));
        Ok(RefundOutcome { refund_id })
    }

    async fn list_payment_methods(
        &self,
        customer_id: &str,
    ) -> Result<Vec<PaymentMethodSummary>, PaymentsError> {
        let state = self.state.read().unwrap();
        Ok(state.methods.get(customer_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_succeeds_by_default() {
        let gateway = MockGateway::new();
        let intent = gateway
            .create_intent(Money::from_cents(5_000), &Currency::usd(), None)
            .await
            .unwrap();
        assert!(intent.client_secret.contains(&intent.intent_id));

        let outcome = gateway.capture(&intent.intent_id, "pm_card").await.unwrap();
        assert_eq!(outcome.status, GatewayPaymentStatus::Succeeded);
        assert!(outcome.charge_id.is_some());
        assert_eq!(outcome.card.as_ref().unwrap().last4, "4242");
    }

    #[tokio::test]
    async fn test_decline_switch() {
        let gateway = MockGateway::new();
        gateway.set_decline(Some("insufficient funds"));

        let intent = gateway
            .create_intent(Money::from_cents(5_000), &Currency::usd(), None)
            .await
            .unwrap();
        let outcome = gateway.capture(&intent.intent_id, "pm_card").await.unwrap();
        assert_eq!(outcome.status, GatewayPaymentStatus::Failed);
        assert_eq!(outcome.failure_message.as_deref(), Some("insufficient funds"));
    }

    #[tokio::test]
    async fn test_lookup_reflects_settled_capture() {
        let gateway = MockGateway::new();
        let intent = gateway
            .create_intent(Money::from_cents(5_000), &Currency::usd(), None)
            .await
            .unwrap();
        gateway.capture(&intent.intent_id, "pm_card").await.unwrap();

        let looked_up = gateway.lookup_intent(&intent.intent_id).await.unwrap();
        assert_eq!(looked_up.status, GatewayPaymentStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let gateway = MockGateway::new();
        let result = gateway
            .create_intent(Money::zero(), &Currency::usd(), None)
            .await;
        assert!(matches!(result, Err(PaymentsError::Validation(_))));
    }

    #[tokio::test]
    async fn test_refund_tracking() {
        let gateway = MockGateway::new();
        gateway.refund("ch_1", Money::from_cents(1_000)).await.unwrap();
        gateway.refund("ch_1", Money::from_cents(500)).await.unwrap();
        assert_eq!(gateway.refund_count(), 2);
        assert_eq!(gateway.refunded_total().cents(), 1_500);
    }
}
