//! Payment processing against the gateway, persisted in every branch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::{Currency, Money, PaymentId};
use domain::{Booking, DomainError, Payment, PaymentMethod, PaymentStatus};
use store::BookingStore;
use tokio::time::timeout;

use crate::error::PaymentsError;
use crate::gateway::{
    CaptureOutcome, GatewayPaymentStatus, PaymentGateway, PaymentIntent, PaymentMethodSummary,
};

const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives captures and refunds, keeping the persisted payment row in
/// step with the gateway.
///
/// A capture whose response is lost to a timeout is not declared failed
/// outright: the processor re-queries the intent first, so a capture
/// the gateway actually performed is never dropped.
pub struct PaymentProcessor<S> {
    store: Arc<S>,
    gateway: Arc<dyn PaymentGateway>,
    capture_timeout: Duration,
}

impl<S: BookingStore> PaymentProcessor<S> {
    /// Creates a processor with the default capture timeout.
    pub fn new(store: Arc<S>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            store,
            gateway,
            capture_timeout: DEFAULT_CAPTURE_TIMEOUT,
        }
    }

    /// Overrides the capture timeout.
    pub fn with_capture_timeout(mut self, capture_timeout: Duration) -> Self {
        self.capture_timeout = capture_timeout;
        self
    }

    /// Captures the booking total from the traveler's payment method.
    ///
    /// A payment row is persisted before the capture call and written
    /// back in every branch. Gateway declines and timeouts produce a
    /// persisted FAILED payment, not an error; the caller decides what
    /// a non-completed payment means for the booking.
    #[tracing::instrument(skip(self, booking), fields(booking_id = %booking.id))]
    pub async fn process_payment(
        &self,
        booking: &Booking,
        payment_method_id: &str,
    ) -> Result<Payment, PaymentsError> {
        if payment_method_id.is_empty() {
            return Err(PaymentsError::Validation(
                "payment_method_id is required".to_string(),
            ));
        }

        let description = format!("Booking {}", booking.reference);
        let intent = self
            .gateway
            .create_intent(booking.total_amount, &booking.currency, Some(&description))
            .await?;

        let mut payment = Payment::new(
            booking.id,
            booking.user_id,
            booking.total_amount,
            booking.currency.clone(),
            PaymentMethod::Card,
            Utc::now(),
        );
        payment.status = PaymentStatus::Processing;
        payment.gateway_intent_id = Some(intent.intent_id.clone());
        self.store.insert_payment(payment.clone()).await?;

        let outcome = self.capture(&intent.intent_id, payment_method_id).await;

        let now = Utc::now();
        match outcome {
            Ok(result) => match result.status {
                GatewayPaymentStatus::Succeeded => {
                    payment.mark_completed(result.charge_id, result.card, now);
                }
                GatewayPaymentStatus::RequiresAction => {
                    payment.status = PaymentStatus::Pending;
                    payment.updated_at = now;
                }
                GatewayPaymentStatus::Failed => {
                    let message = result
                        .failure_message
                        .unwrap_or_else(|| "payment declined".to_string());
                    payment.mark_failed(message, now);
                }
            },
            Err(message) => {
                payment.mark_failed(message, now);
            }
        }

        let payment = self.store.update_payment(payment).await?;
        metrics::counter!(
            "payments_processed_total",
            "status" => payment.status.as_str()
        )
        .increment(1);
        Ok(payment)
    }

    /// Runs the capture under a timeout; on elapse, asks the gateway
    /// what actually happened to the intent before giving up.
    async fn capture(
        &self,
        intent_id: &str,
        payment_method_id: &str,
    ) -> Result<CaptureOutcome, String> {
        match timeout(
            self.capture_timeout,
            self.gateway.capture(intent_id, payment_method_id),
        )
        .await
        {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(err)) => Err(err.to_string()),
            Err(_) => {
                tracing::warn!(intent_id, "capture timed out, re-querying intent");
                match timeout(self.capture_timeout, self.gateway.lookup_intent(intent_id)).await {
                    Ok(Ok(outcome)) => Ok(outcome),
                    Ok(Err(err)) => Err(err.to_string()),
                    Err(_) => Err("payment gateway timed out".to_string()),
                }
            }
        }
    }

    /// Creates an intent for client-side confirmation. No payment row
    /// is persisted until the capture is processed.
    #[tracing::instrument(skip(self))]
    pub async fn create_payment_intent(
        &self,
        amount: Money,
        currency: &Currency,
        description: Option<&str>,
    ) -> Result<PaymentIntent, PaymentsError> {
        if !amount.is_positive() {
            return Err(PaymentsError::Validation(
                "amount must be positive".to_string(),
            ));
        }
        self.gateway.create_intent(amount, currency, description).await
    }

    /// Refunds `amount` from a settled payment.
    #[tracing::instrument(skip(self))]
    pub async fn process_refund(
        &self,
        payment_id: PaymentId,
        amount: Money,
    ) -> Result<Payment, PaymentsError> {
        if !amount.is_positive() {
            return Err(PaymentsError::Validation(
                "refund amount must be positive".to_string(),
            ));
        }

        let mut payment = self.store.get_payment(payment_id).await?;
        let charge_id = payment.gateway_charge_id.clone().ok_or_else(|| {
            PaymentsError::NotFound(format!("no charge recorded for payment {payment_id}"))
        })?;

        // validate against the row before money moves at the gateway
        if !payment.status.is_settled() {
            return Err(DomainError::NotRefundable {
                current: payment.status.to_string(),
            }
            .into());
        }
        if amount > payment.remaining_refundable() {
            return Err(DomainError::ExcessiveRefund {
                requested: amount,
                refundable: payment.remaining_refundable(),
            }
            .into());
        }

        let outcome = timeout(self.capture_timeout, self.gateway.refund(&charge_id, amount))
            .await
            .map_err(|_| PaymentsError::Gateway("refund timed out".to_string()))??;

        payment.record_refund(amount, outcome.refund_id, Utc::now())?;
        let payment = self.store.update_payment(payment).await?;
        metrics::counter!("payments_refunded_total").increment(1);
        Ok(payment)
    }

    /// Lists the customer's stored payment methods.
    pub async fn list_payment_methods(
        &self,
        customer_id: &str,
    ) -> Result<Vec<PaymentMethodSummary>, PaymentsError> {
        self.gateway.list_payment_methods(customer_id).await
    }
}
