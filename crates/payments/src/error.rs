//! Payment error types.

use store::StoreError;
use thiserror::Error;

/// Errors that can occur in payment processing.
#[derive(Debug, Error)]
pub enum PaymentsError {
    /// The request is malformed (bad amount, missing method).
    #[error("invalid payment request: {0}")]
    Validation(String),

    /// The referenced payment, intent, or charge does not exist.
    #[error("payment record not found: {0}")]
    NotFound(String),

    /// The gateway declined or failed the operation.
    #[error("payment gateway error: {0}")]
    Gateway(String),

    /// The webhook signature header is missing, malformed, stale, or
    /// does not match the body.
    #[error("webhook signature rejected: {0}")]
    Signature(String),

    /// A refund request that the payment's state does not allow.
    #[error(transparent)]
    Domain(#[from] domain::DomainError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}
