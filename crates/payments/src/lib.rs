//! Payment gateway adapter.
//!
//! [`PaymentProcessor`] drives captures and refunds against a
//! [`PaymentGateway`] and keeps the persisted [`domain::Payment`] row in
//! step with the gateway in every branch, including timeouts. The
//! [`webhook`] module verifies gateway webhook signatures and applies
//! convergent status transitions for asynchronous confirmations.

pub mod error;
pub mod gateway;
pub mod mock;
pub mod processor;
pub mod webhook;

pub use error::PaymentsError;
pub use gateway::{
    CaptureOutcome, GatewayPaymentStatus, PaymentGateway, PaymentIntent, PaymentMethodSummary,
    RefundOutcome,
};
pub use mock::MockGateway;
pub use processor::PaymentProcessor;
pub use webhook::{GatewayEvent, SignatureVerifier, WebhookHandler, WebhookOutcome};
