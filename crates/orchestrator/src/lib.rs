//! Booking orchestration.
//!
//! [`BookingOrchestrator`] drives the booking lifecycle end to end:
//! availability check, pending persistence, payment capture, supplier
//! commit, and confirmation. When the supplier commit fails after funds
//! were captured it compensates with a full refund and a FAILED booking.
//! [`WebhookReconciler`] routes asynchronous gateway and supplier
//! events back onto the persisted state.

pub mod error;
pub mod notify;
pub mod orchestrator;
pub mod reconciler;
pub mod requests;

pub use error::OrchestratorError;
pub use notify::{InMemoryNotifier, NotificationError, NotificationKind, Notifier, SentNotification};
pub use orchestrator::{BookingOrchestrator, BookingPage, SupplierUpdateOutcome};
pub use reconciler::WebhookReconciler;
pub use requests::{CancelRequest, FlightBookingRequest, HotelBookingRequest, ListQuery};
