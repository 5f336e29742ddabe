//! Guest composition carried on a booking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single named guest on a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

/// Guest composition for a booking: counts plus the named guest list
/// forwarded to the supplier at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GuestDetails {
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
    #[serde(default)]
    pub guests: Vec<Guest>,
}

impl GuestDetails {
    /// Total headcount across all age bands.
    pub fn total(&self) -> u32 {
        self.adults + self.children + self.infants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_headcount() {
        let details = GuestDetails {
            adults: 2,
            children: 1,
            infants: 1,
            guests: vec![],
        };
        assert_eq!(details.total(), 4);
    }

    #[test]
    fn test_deserializes_with_missing_optional_fields() {
        let details: GuestDetails = serde_json::from_str(r#"{"adults": 2}"#).unwrap();
        assert_eq!(details.adults, 2);
        assert_eq!(details.children, 0);
        assert!(details.guests.is_empty());
    }
}
