//! Persistence contracts for bookings, payments, and users, with
//! in-memory implementations.
//!
//! The store enforces optimistic concurrency: every update carries the
//! version the caller read, and a mismatch with the stored version is
//! rejected with [`StoreError::VersionConflict`] so the caller can
//! re-read and retry.

pub mod error;
pub mod memory;
pub mod store;
pub mod users;

pub use error::StoreError;
pub use memory::InMemoryBookingStore;
pub use store::{BookingFilter, BookingStore};
pub use users::{InMemoryUserStore, User, UserStore};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
