//! Orchestration error taxonomy.

use payments::PaymentsError;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by booking orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The request is malformed or incomplete.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The supplier has no matching inventory for the dates asked.
    /// Nothing is persisted when this is raised.
    #[error("inventory unavailable: {0}")]
    Availability(String),

    /// A cancellation or modification the booking's policy forbids.
    #[error("policy violation: {0}")]
    Policy(String),

    /// Payment capture did not complete. The FAILED payment and booking
    /// rows are persisted before this is raised.
    #[error("payment failed: {0}")]
    Payment(String),

    /// The supplier rejected the reservation after funds were captured.
    /// Compensation has run before this is raised.
    #[error("supplier commit failed: {0}")]
    SupplierCommit(String),

    /// An illegal lifecycle transition.
    #[error(transparent)]
    Domain(#[from] domain::DomainError),

    /// Signature, refund, or gateway failure from the payments layer.
    #[error(transparent)]
    Payments(#[from] PaymentsError),

    /// Missing records or concurrent modification.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrchestratorError {
    /// Returns true if the error means the requested record does not
    /// exist (or is not visible to the caller).
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrchestratorError::Store(e) if e.is_not_found())
    }
}
