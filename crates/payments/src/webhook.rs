//! Gateway webhook verification and convergent status application.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use store::BookingStore;

use crate::error::PaymentsError;

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verifies the gateway's `t=<unix>,v1=<hex>` signature header: an
/// HMAC-SHA256 of `"{t}.{body}"` under the shared webhook secret, with
/// a bounded timestamp skew to blunt replay.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
    tolerance: Duration,
}

impl SignatureVerifier {
    /// Creates a verifier with the default 5-minute timestamp tolerance.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            tolerance: Duration::seconds(DEFAULT_TOLERANCE_SECS),
        }
    }

    /// Overrides the timestamp tolerance.
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Checks the signature header against the raw request body.
    pub fn verify(
        &self,
        header: &str,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), PaymentsError> {
        let mut timestamp = None;
        let mut signature = None;
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
                Some(("v1", value)) => signature = hex::decode(value).ok(),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| PaymentsError::Signature("missing or invalid timestamp".to_string()))?;
        let signature = signature
            .ok_or_else(|| PaymentsError::Signature("missing or invalid v1 digest".to_string()))?;

        let skew = (now.timestamp() - timestamp).abs();
        if skew > self.tolerance.num_seconds() {
            return Err(PaymentsError::Signature(format!(
                "timestamp outside tolerance ({skew}s)"
            )));
        }

        let expected = self.compute(timestamp, body);
        if !constant_time_eq(&expected, &signature) {
            return Err(PaymentsError::Signature("digest mismatch".to_string()));
        }
        Ok(())
    }

    /// Produces a header that [`verify`](Self::verify) accepts. Used by
    /// tests and local tooling to simulate the gateway.
    pub fn sign(&self, body: &[u8], at: DateTime<Utc>) -> String {
        let timestamp = at.timestamp();
        let digest = self.compute(timestamp, body);
        format!("t={timestamp},v1={}", hex::encode(digest))
    }

    fn compute(&self, timestamp: i64, body: &[u8]) -> Vec<u8> {
        // the secret length is unconstrained for HMAC
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("hmac accepts any key length"));
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Events the gateway pushes. Unrecognized event types are acknowledged
/// and ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    PaymentSucceeded {
        intent_id: String,
        #[serde(default)]
        charge_id: Option<String>,
    },
    PaymentFailed {
        intent_id: String,
        #[serde(default)]
        message: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// What a webhook delivery did to the persisted payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The payment transitioned.
    Applied,
    /// The payment had already reached the reported state; redelivery
    /// was a no-op.
    AlreadyApplied,
    /// The event type carries no payment transition.
    Ignored,
}

/// Applies verified gateway events to persisted payments.
pub struct WebhookHandler<S> {
    store: Arc<S>,
    verifier: SignatureVerifier,
}

impl<S: BookingStore> WebhookHandler<S> {
    pub fn new(store: Arc<S>, verifier: SignatureVerifier) -> Self {
        Self { store, verifier }
    }

    /// Verifies and applies one webhook delivery.
    ///
    /// Signature verification happens before anything else; a rejected
    /// delivery mutates nothing.
    #[tracing::instrument(skip(self, signature_header, body))]
    pub async fn handle(
        &self,
        signature_header: Option<&str>,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<WebhookOutcome, PaymentsError> {
        let header = signature_header
            .ok_or_else(|| PaymentsError::Signature("missing signature header".to_string()))?;
        self.verifier.verify(header, body, now)?;

        let event: GatewayEvent = serde_json::from_slice(body)
            .map_err(|err| PaymentsError::Validation(format!("malformed webhook body: {err}")))?;

        let outcome = match event {
            GatewayEvent::PaymentSucceeded {
                intent_id,
                charge_id,
            } => {
                let mut payment = self.store.find_payment_by_intent(&intent_id).await?;
                if payment.mark_completed(charge_id, None, now) {
                    self.store.update_payment(payment).await?;
                    WebhookOutcome::Applied
                } else {
                    WebhookOutcome::AlreadyApplied
                }
            }
            GatewayEvent::PaymentFailed { intent_id, message } => {
                let mut payment = self.store.find_payment_by_intent(&intent_id).await?;
                let message = message.unwrap_or_else(|| "payment failed".to_string());
                if payment.mark_failed(message, now) {
                    self.store.update_payment(payment).await?;
                    WebhookOutcome::Applied
                } else {
                    WebhookOutcome::AlreadyApplied
                }
            }
            GatewayEvent::Other => WebhookOutcome::Ignored,
        };

        metrics::counter!(
            "payment_webhooks_total",
            "outcome" => match outcome {
                WebhookOutcome::Applied => "applied",
                WebhookOutcome::AlreadyApplied => "already_applied",
                WebhookOutcome::Ignored => "ignored",
            }
        )
        .increment(1);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{BookingId, Currency, Money, UserId};
    use domain::{Payment, PaymentMethod, PaymentStatus};
    use store::InMemoryBookingStore;

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new("whsec_test")
    }

    async fn seeded_store(intent_id: &str) -> (Arc<InMemoryBookingStore>, common::PaymentId) {
        let store = Arc::new(InMemoryBookingStore::new());
        let mut payment = Payment::new(
            BookingId::new(),
            UserId::new(),
            Money::from_cents(10_000),
            Currency::usd(),
            PaymentMethod::Card,
            Utc::now(),
        );
        payment.gateway_intent_id = Some(intent_id.to_string());
        let id = payment.id;
        store.insert_payment(payment).await.unwrap();
        (store, id)
    }

    #[test]
    fn test_signature_round_trip() {
        let verifier = verifier();
        let now = Utc::now();
        let body = br#"{"type":"payment_succeeded","intent_id":"pi_1"}"#;

        let header = verifier.sign(body, now);
        assert!(verifier.verify(&header, body, now).is_ok());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let verifier = verifier();
        let now = Utc::now();
        let header = verifier.sign(b"original", now);

        let err = verifier.verify(&header, b"tampered", now).unwrap_err();
        assert!(matches!(err, PaymentsError::Signature(_)));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let verifier = verifier();
        let signed_at = Utc::now();
        let header = verifier.sign(b"body", signed_at);

        let later = signed_at + Duration::seconds(DEFAULT_TOLERANCE_SECS + 1);
        let err = verifier.verify(&header, b"body", later).unwrap_err();
        assert!(matches!(err, PaymentsError::Signature(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = Utc::now();
        let header = SignatureVerifier::new("whsec_other").sign(b"body", now);
        let err = verifier().verify(&header, b"body", now).unwrap_err();
        assert!(matches!(err, PaymentsError::Signature(_)));
    }

    #[tokio::test]
    async fn test_succeeded_event_applied_once() {
        let (store, payment_id) = seeded_store("pi_1").await;
        let handler = WebhookHandler::new(store.clone(), verifier());
        let now = Utc::now();
        let body = br#"{"type":"payment_succeeded","intent_id":"pi_1","charge_id":"ch_1"}"#;
        let header = handler.verifier.sign(body, now);

        let outcome = handler.handle(Some(&header), body, now).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Applied);

        let payment = store.get_payment(payment_id).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.gateway_charge_id.as_deref(), Some("ch_1"));

        // redelivery converges instead of erroring
        let outcome = handler.handle(Some(&header), body, now).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::AlreadyApplied);
    }

    #[tokio::test]
    async fn test_failed_event_never_regresses_completed() {
        let (store, payment_id) = seeded_store("pi_1").await;
        let handler = WebhookHandler::new(store.clone(), verifier());
        let now = Utc::now();

        let success = br#"{"type":"payment_succeeded","intent_id":"pi_1"}"#;
        let header = handler.verifier.sign(success, now);
        handler.handle(Some(&header), success, now).await.unwrap();

        let failure = br#"{"type":"payment_failed","intent_id":"pi_1","message":"late decline"}"#;
        let header = handler.verifier.sign(failure, now);
        let outcome = handler.handle(Some(&header), failure, now).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::AlreadyApplied);

        let payment = store.get_payment(payment_id).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_invalid_signature_mutates_nothing() {
        let (store, payment_id) = seeded_store("pi_1").await;
        let handler = WebhookHandler::new(store.clone(), verifier());
        let now = Utc::now();
        let body = br#"{"type":"payment_succeeded","intent_id":"pi_1"}"#;

        let err = handler
            .handle(Some("t=0,v1=deadbeef"), body, now)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentsError::Signature(_)));

        let payment = store.get_payment(payment_id).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let (store, _) = seeded_store("pi_1").await;
        let handler = WebhookHandler::new(store, verifier());
        let err = handler.handle(None, b"{}", Utc::now()).await.unwrap_err();
        assert!(matches!(err, PaymentsError::Signature(_)));
    }

    #[tokio::test]
    async fn test_unknown_event_ignored() {
        let (store, _) = seeded_store("pi_1").await;
        let handler = WebhookHandler::new(store, verifier());
        let now = Utc::now();
        let body = br#"{"type":"customer_updated"}"#;
        let header = handler.verifier.sign(body, now);

        let outcome = handler.handle(Some(&header), body, now).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_unknown_intent_is_not_found() {
        let (store, _) = seeded_store("pi_1").await;
        let handler = WebhookHandler::new(store, verifier());
        let now = Utc::now();
        let body = br#"{"type":"payment_succeeded","intent_id":"pi_unknown"}"#;
        let header = handler.verifier.sign(body, now);

        let err = handler.handle(Some(&header), body, now).await.unwrap_err();
        assert!(matches!(err, PaymentsError::Store(e) if e.is_not_found()));
    }
}
