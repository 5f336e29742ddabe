//! Typed supplier webhook payload.

use chrono::{DateTime, Utc};
use domain::BookingStatus;
use serde::{Deserialize, Serialize};

/// The status vocabulary suppliers report. Decoded exhaustively so an
/// unknown status is a deserialization error, not a silent pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl SupplierStatus {
    /// Maps the supplier vocabulary onto the booking state machine.
    pub fn as_booking_status(&self) -> BookingStatus {
        match self {
            SupplierStatus::Confirmed => BookingStatus::Confirmed,
            SupplierStatus::Cancelled => BookingStatus::Cancelled,
            SupplierStatus::Completed => BookingStatus::Completed,
        }
    }
}

/// A status update pushed by a supplier about one of its reservations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierUpdate {
    /// The supplier's own reservation identifier.
    pub supplier_booking_id: String,
    pub status: SupplierStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_snake_case_status() {
        let update: SupplierUpdate = serde_json::from_str(
            r#"{"supplier_booking_id": "HTL-000001", "status": "cancelled", "reason": "property closed"}"#,
        )
        .unwrap();
        assert_eq!(update.status, SupplierStatus::Cancelled);
        assert_eq!(update.status.as_booking_status(), BookingStatus::Cancelled);
        assert_eq!(update.reason.as_deref(), Some("property closed"));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result: Result<SupplierUpdate, _> = serde_json::from_str(
            r#"{"supplier_booking_id": "HTL-000001", "status": "teleported"}"#,
        );
        assert!(result.is_err());
    }
}
