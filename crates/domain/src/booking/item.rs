//! Priced line items belonging to a booking.

use chrono::{DateTime, NaiveDate, Utc};
use common::{BookingId, Currency, Money};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind-specific details for a booking item, decoded exhaustively
/// rather than carried as untyped supplier payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemDetails {
    /// A hotel room reservation line.
    Room {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_type: Option<String>,
        room_count: u32,
    },

    /// One flight leg.
    FlightSegment {
        flight_number: String,
        airline: String,
        departure_airport: String,
        arrival_airport: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        departure_time: Option<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arrival_time: Option<DateTime<Utc>>,
        seat_class: String,
    },

    /// An activity or excursion line.
    Activity {
        activity_date: NaiveDate,
        participants: u32,
    },
}

/// One priced line belonging to exactly one booking.
///
/// Items are created once, at booking-creation time, and are immutable
/// thereafter; modifications touch Booking fields, not items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingItem {
    pub id: Uuid,
    pub booking_id: BookingId,
    pub name: String,
    pub details: ItemDetails,
    pub unit_price: Money,
    pub quantity: u32,
    pub total_price: Money,
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
}

impl BookingItem {
    /// Creates a new item with the total computed from unit price and
    /// quantity.
    pub fn new(
        booking_id: BookingId,
        name: impl Into<String>,
        details: ItemDetails,
        unit_price: Money,
        quantity: u32,
        currency: Currency,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            name: name.into(),
            details,
            unit_price,
            quantity,
            total_price: unit_price.multiply(quantity),
            currency,
            confirmation_code: None,
        }
    }
}
