//! Traveler notifications.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::BookingId;
use domain::Booking;
use thiserror::Error;

/// A notification send failure. Callers treat sends as best-effort and
/// only log these.
#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotificationError(pub String);

/// What the traveler is being told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Confirmation,
    Cancellation,
    Modification,
}

/// Sends booking lifecycle messages to the traveler.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        kind: NotificationKind,
        booking: &Booking,
    ) -> Result<(), NotificationError>;
}

/// A message captured by the in-memory notifier.
#[derive(Debug, Clone)]
pub struct SentNotification {
    pub kind: NotificationKind,
    pub booking_id: BookingId,
    pub recipient: String,
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    sent: Vec<SentNotification>,
    fail_on_send: bool,
}

/// In-memory notifier that records what would have been sent.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    /// Creates a new notifier with nothing sent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail sends.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Returns the number of messages sent.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }

    /// Returns a copy of everything sent so far.
    pub fn sent(&self) -> Vec<SentNotification> {
        self.state.read().unwrap().sent.clone()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn send(
        &self,
        kind: NotificationKind,
        booking: &Booking,
    ) -> Result<(), NotificationError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_send {
            return Err(NotificationError("mail relay unreachable".to_string()));
        }
        state.sent.push(SentNotification {
            kind,
            booking_id: booking.id,
            recipient: booking.contact_email.clone(),
        });
        Ok(())
    }
}
