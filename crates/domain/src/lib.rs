//! Domain layer for the booking platform.
//!
//! This crate provides the core aggregates and business rules:
//! - Booking aggregate with its status state machine and append-only history
//! - BookingItem priced lines with typed per-kind details
//! - Payment aggregate with convergent (idempotent) status transitions
//! - Pure policy engine for cancellation fees and modification eligibility

pub mod booking;
pub mod error;
pub mod payment;

pub use booking::{
    Booking, BookingChanges, BookingItem, BookingStatus, BookingType, CancellationCheck,
    CancellationPolicy,
    FeeTier, Guest, GuestDetails, ItemDetails, ModificationCheck, ModificationPolicy, NewBooking,
    StatusHistoryEntry, check_cancellation, check_modification, refund_amount,
};
pub use error::DomainError;
pub use payment::{CardSummary, Payment, PaymentMethod, PaymentStatus};
