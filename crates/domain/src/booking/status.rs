//! Booking status state machine and booking kinds.

use serde::{Deserialize, Serialize};

/// The status of a booking in its lifecycle.
///
/// Transitions:
/// ```text
/// Pending ──┬──► Confirmed ──┬──► Completed
///           │                └──► Cancelled
///           └──► Failed
/// ```
///
/// Cancelled, Completed, and Failed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Booking persisted, payment capture not yet settled.
    #[default]
    Pending,

    /// Payment captured and supplier reservation committed.
    Confirmed,

    /// Booking cancelled by the traveler or the supplier (terminal).
    Cancelled,

    /// Stay/travel finished (terminal).
    Completed,

    /// Payment or supplier commit failed while pending (terminal).
    Failed,
}

impl BookingStatus {
    /// Returns true if the booking can be confirmed from this status.
    pub fn can_confirm(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }

    /// Returns true if the booking can be marked failed from this status.
    pub fn can_fail(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }

    /// Returns true if the booking can be cancelled from this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }

    /// Returns true if the booking can be completed from this status.
    pub fn can_complete(&self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }

    /// Returns true if the booking can be modified in this status.
    pub fn can_modify(&self) -> bool {
        matches!(self, BookingStatus::Confirmed)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Cancelled | BookingStatus::Completed | BookingStatus::Failed
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of inventory a booking reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    Accommodation,
    Flight,
    Activity,
    Restaurant,
    Transport,
    Package,
}

impl BookingType {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Accommodation => "accommodation",
            BookingType::Flight => "flight",
            BookingType::Activity => "activity",
            BookingType::Restaurant => "restaurant",
            BookingType::Transport => "transport",
            BookingType::Package => "package",
        }
    }
}

impl std::fmt::Display for BookingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(BookingStatus::default(), BookingStatus::Pending);
    }

    #[test]
    fn test_pending_can_confirm_or_fail() {
        assert!(BookingStatus::Pending.can_confirm());
        assert!(BookingStatus::Pending.can_fail());
        assert!(!BookingStatus::Confirmed.can_confirm());
        assert!(!BookingStatus::Cancelled.can_confirm());
        assert!(!BookingStatus::Failed.can_fail());
    }

    #[test]
    fn test_only_confirmed_can_cancel_or_modify() {
        assert!(BookingStatus::Confirmed.can_cancel());
        assert!(BookingStatus::Confirmed.can_modify());
        assert!(BookingStatus::Confirmed.can_complete());
        assert!(!BookingStatus::Pending.can_cancel());
        assert!(!BookingStatus::Completed.can_cancel());
        assert!(!BookingStatus::Failed.can_modify());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Failed.is_terminal());
    }

    #[test]
    fn test_serialization_uses_snake_case() {
        let json = serde_json::to_string(&BookingStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
        let back: BookingStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(back, BookingStatus::Failed);
    }

    #[test]
    fn test_display() {
        assert_eq!(BookingStatus::Pending.to_string(), "pending");
        assert_eq!(BookingType::Accommodation.to_string(), "accommodation");
    }
}
