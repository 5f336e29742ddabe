//! Inventory provider trait and request/response types.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use common::{Currency, Money};
use domain::GuestDetails;

use crate::error::ProviderError;

/// What the traveler wants to reserve, in supplier vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityQuery {
    /// Rooms at a property for a date range.
    Hotel {
        property_id: String,
        room_type: Option<String>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        rooms: u32,
        guests: u32,
    },

    /// Seats on a flight.
    Flight {
        flight_number: String,
        departure_date: NaiveDate,
        passengers: u32,
        seat_class: String,
    },
}

impl AvailabilityQuery {
    /// Number of units (rooms or seats) the query asks for.
    pub fn units(&self) -> u32 {
        match self {
            AvailabilityQuery::Hotel { rooms, .. } => *rooms,
            AvailabilityQuery::Flight { passengers, .. } => *passengers,
        }
    }
}

/// A supplier's answer to an availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
    /// Price per unit (room-night or seat) quoted by the supplier.
    pub unit_price: Money,
    pub currency: Currency,
}

/// The reservation to commit once payment has settled.
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    /// Our traveler-facing booking reference, forwarded to the supplier.
    pub reference: String,
    pub query: AvailabilityQuery,
    pub guest_details: GuestDetails,
    pub contact_email: String,
    pub requested_at: DateTime<Utc>,
}

/// A committed reservation as acknowledged by the supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationConfirmation {
    /// The supplier's own identifier for the reservation.
    pub supplier_booking_id: String,
    pub confirmation_code: Option<String>,
}

/// Adapter over one supplier's inventory API.
///
/// `check_availability` must be free of side effects; only
/// `commit_reservation` holds inventory on the supplier side.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    /// The supplier name used for booking attribution and webhook
    /// routing (e.g. "booking.com").
    fn supplier_name(&self) -> &str;

    /// Checks whether the queried inventory can be reserved and at what
    /// price.
    async fn check_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Availability, ProviderError>;

    /// Commits the reservation with the supplier.
    async fn commit_reservation(
        &self,
        request: &ReservationRequest,
    ) -> Result<ReservationConfirmation, ProviderError>;
}
