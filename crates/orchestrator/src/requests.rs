//! Booking request DTOs and their validation.

use chrono::{DateTime, NaiveDate, Utc};
use common::TripId;
use domain::{BookingStatus, BookingType, CancellationPolicy, GuestDetails, ModificationPolicy};
use serde::Deserialize;

use crate::error::OrchestratorError;

fn require(condition: bool, message: &str) -> Result<(), OrchestratorError> {
    if condition {
        Ok(())
    } else {
        Err(OrchestratorError::Validation(message.to_string()))
    }
}

fn validate_email(email: &str) -> Result<(), OrchestratorError> {
    require(
        email.contains('@') && !email.starts_with('@') && !email.ends_with('@'),
        "contact_email is not a valid email address",
    )
}

/// Request to book hotel rooms.
#[derive(Debug, Clone, Deserialize)]
pub struct HotelBookingRequest {
    pub property_id: String,
    pub property_name: String,
    #[serde(default)]
    pub room_type: Option<String>,
    pub rooms: u32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_details: GuestDetails,
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub trip_id: Option<TripId>,
    pub payment_method_id: String,
    #[serde(default)]
    pub cancellation_policy: Option<CancellationPolicy>,
    #[serde(default)]
    pub modification_policy: Option<ModificationPolicy>,
}

impl HotelBookingRequest {
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        require(!self.property_id.is_empty(), "property_id is required")?;
        require(!self.property_name.is_empty(), "property_name is required")?;
        require(self.rooms >= 1, "at least one room is required")?;
        require(self.check_out > self.check_in, "check_out must be after check_in")?;
        require(self.guest_details.adults >= 1, "at least one adult is required")?;
        require(
            !self.payment_method_id.is_empty(),
            "payment_method_id is required",
        )?;
        validate_email(&self.contact_email)
    }

    /// Number of nights of the stay.
    pub fn nights(&self) -> u32 {
        (self.check_out - self.check_in).num_days().max(1) as u32
    }
}

/// Request to book flight seats.
#[derive(Debug, Clone, Deserialize)]
pub struct FlightBookingRequest {
    pub flight_number: String,
    pub airline: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_date: NaiveDate,
    #[serde(default)]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub arrival_time: Option<DateTime<Utc>>,
    pub seat_class: String,
    pub guest_details: GuestDetails,
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub trip_id: Option<TripId>,
    pub payment_method_id: String,
    #[serde(default)]
    pub cancellation_policy: Option<CancellationPolicy>,
}

impl FlightBookingRequest {
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        require(!self.flight_number.is_empty(), "flight_number is required")?;
        require(!self.airline.is_empty(), "airline is required")?;
        require(
            !self.departure_airport.is_empty() && !self.arrival_airport.is_empty(),
            "departure and arrival airports are required",
        )?;
        require(!self.seat_class.is_empty(), "seat_class is required")?;
        require(
            self.guest_details.total() >= 1,
            "at least one passenger is required",
        )?;
        require(
            !self.payment_method_id.is_empty(),
            "payment_method_id is required",
        )?;
        validate_email(&self.contact_email)
    }

    /// Number of seats to reserve.
    pub fn passengers(&self) -> u32 {
        self.guest_details.total()
    }
}

/// Request to cancel a confirmed booking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query parameters for listing a user's bookings.
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub kind: Option<BookingType>,
    #[serde(default = "ListQuery::default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl ListQuery {
    fn default_limit() -> usize {
        20
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            status: None,
            kind: None,
            limit: Self::default_limit(),
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel_request() -> HotelBookingRequest {
        HotelBookingRequest {
            property_id: "hotel-sunrise".to_string(),
            property_name: "Hotel Sunrise".to_string(),
            room_type: Some("double".to_string()),
            rooms: 1,
            check_in: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
            guest_details: GuestDetails {
                adults: 2,
                ..Default::default()
            },
            contact_email: "guest@example.com".to_string(),
            contact_phone: None,
            special_requests: None,
            trip_id: None,
            payment_method_id: "pm_card".to_string(),
            cancellation_policy: None,
            modification_policy: None,
        }
    }

    #[test]
    fn test_valid_hotel_request() {
        assert!(hotel_request().validate().is_ok());
        assert_eq!(hotel_request().nights(), 4);
    }

    #[test]
    fn test_inverted_dates_rejected() {
        let mut request = hotel_request();
        request.check_out = request.check_in;
        assert!(matches!(
            request.validate(),
            Err(OrchestratorError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut request = hotel_request();
        request.contact_email = "not-an-email".to_string();
        assert!(request.validate().is_err());

        request.contact_email = "@example.com".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_missing_payment_method_rejected() {
        let mut request = hotel_request();
        request.payment_method_id = String::new();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_zero_adults_rejected() {
        let mut request = hotel_request();
        request.guest_details.adults = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 20);
        assert_eq!(query.offset, 0);
        assert!(query.status.is_none());
    }
}
