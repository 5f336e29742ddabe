//! Store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the given key.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A record with the same key already exists.
    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },

    /// The record changed since the caller read it.
    #[error("{entity} {key} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        entity: &'static str,
        key: String,
        expected: u64,
        actual: u64,
    },
}

impl StoreError {
    pub fn booking_not_found(id: impl ToString) -> Self {
        StoreError::NotFound {
            entity: "booking",
            key: id.to_string(),
        }
    }

    pub fn payment_not_found(id: impl ToString) -> Self {
        StoreError::NotFound {
            entity: "payment",
            key: id.to_string(),
        }
    }

    /// Returns true if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns true if this is a concurrency conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }
}
