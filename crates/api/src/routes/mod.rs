//! Route handlers.

pub mod bookings;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod users;
pub mod webhooks;
