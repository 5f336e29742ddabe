//! Provider error types.

use thiserror::Error;

/// Errors returned by inventory provider adapters.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested inventory is not available for the dates asked.
    #[error("{supplier}: {reason}")]
    Unavailable { supplier: String, reason: String },

    /// The supplier rejected or failed the reservation commit.
    #[error("{supplier} commit failed: {reason}")]
    CommitFailed { supplier: String, reason: String },

    /// The supplier did not answer within the allowed time.
    #[error("{supplier} did not respond in time")]
    Timeout { supplier: String },
}
