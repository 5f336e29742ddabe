//! Shared types for the booking platform.
//!
//! This crate provides the typed identifiers and the `Money`/`Currency`
//! value objects used across every other crate in the workspace.

pub mod ids;
pub mod money;

pub use ids::{BookingId, PaymentId, TripId, UserId};
pub use money::{Currency, Money};
