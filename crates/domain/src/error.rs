//! Domain error types.

use common::Money;
use thiserror::Error;

/// Errors that can occur when applying domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The aggregate is not in a state from which the action is legal.
    #[error("{entity} in state '{current}' cannot {action}")]
    InvalidStateTransition {
        entity: &'static str,
        current: String,
        action: &'static str,
    },

    /// A refund would push the cumulative refunded amount past the
    /// captured amount.
    #[error("refund of {requested} exceeds remaining refundable amount {refundable}")]
    ExcessiveRefund {
        requested: Money,
        refundable: Money,
    },

    /// A refund was requested against a payment that never completed.
    #[error("payment in state '{current}' cannot be refunded")]
    NotRefundable { current: String },
}
