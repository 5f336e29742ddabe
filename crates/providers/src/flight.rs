//! In-memory airline adapter.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Currency, Money};

use crate::error::ProviderError;
use crate::provider::{
    Availability, AvailabilityQuery, InventoryProvider, ReservationConfirmation,
    ReservationRequest,
};

const SUPPLIER_NAME: &str = "skyscanner";

#[derive(Debug)]
struct InMemoryFlightState {
    /// Seats on offer per flight number: (available seats, fare).
    flights: HashMap<String, (u32, Money)>,
    reservations: HashMap<String, String>,
    next_id: u32,
    fail_on_commit: bool,
}

impl Default for InMemoryFlightState {
    fn default() -> Self {
        Self {
            flights: HashMap::from([
                ("BA117".to_string(), (30, Money::from_cents(45_000))),
                ("LH902".to_string(), (2, Money::from_cents(18_900))),
            ]),
            reservations: HashMap::new(),
            next_id: 0,
            fail_on_commit: false,
        }
    }
}

/// In-memory flight provider for wiring and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFlightProvider {
    state: Arc<RwLock<InMemoryFlightState>>,
}

impl InMemoryFlightProvider {
    /// Creates a provider with a default set of flights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a flight offer.
    pub fn set_flight(&self, flight_number: &str, seats: u32, fare: Money) {
        self.state
            .write()
            .unwrap()
            .flights
            .insert(flight_number.to_string(), (seats, fare));
    }

    /// Configures the provider to fail reservation commits.
    pub fn set_fail_on_commit(&self, fail: bool) {
        self.state.write().unwrap().fail_on_commit = fail;
    }

    /// Returns the number of committed reservations.
    pub fn reservation_count(&self) -> usize {
        self.state.read().unwrap().reservations.len()
    }
}

#[async_trait]
impl InventoryProvider for InMemoryFlightProvider {
    fn supplier_name(&self) -> &str {
        SUPPLIER_NAME
    }

    async fn check_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Availability, ProviderError> {
        let AvailabilityQuery::Flight {
            flight_number,
            passengers,
            ..
        } = query
        else {
            return Err(ProviderError::Unavailable {
                supplier: SUPPLIER_NAME.to_string(),
                reason: "only flight inventory is offered".to_string(),
            });
        };

        let state = self.state.read().unwrap();
        let Some((seats, fare)) = state.flights.get(flight_number) else {
            return Err(ProviderError::Unavailable {
                supplier: SUPPLIER_NAME.to_string(),
                reason: format!("unknown flight {flight_number}"),
            });
        };

        Ok(Availability {
            available: seats >= passengers,
            unit_price: *fare,
            currency: Currency::usd(),
        })
    }

    async fn commit_reservation(
        &self,
        request: &ReservationRequest,
    ) -> Result<ReservationConfirmation, ProviderError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_commit {
            return Err(ProviderError::CommitFailed {
                supplier: SUPPLIER_NAME.to_string(),
                reason: "airline rejected the reservation".to_string(),
            });
        }

        let AvailabilityQuery::Flight {
            flight_number,
            passengers,
            ..
        } = &request.query
        else {
            return Err(ProviderError::CommitFailed {
                supplier: SUPPLIER_NAME.to_string(),
                reason: "only flight inventory is offered".to_string(),
            });
        };

        match state.flights.get_mut(flight_number) {
            Some((seats, _)) if *seats >= *passengers => *seats -= passengers,
            _ => {
                return Err(ProviderError::CommitFailed {
                    supplier: SUPPLIER_NAME.to_string(),
                    reason: format!("no seats left on {flight_number}"),
                });
            }
        }

        state.next_id += 1;
        let supplier_booking_id = format!("FLT-{:06}", state.next_id);
        state
            .reservations
            .insert(supplier_booking_id.clone(), request.reference.clone());

        Ok(ReservationConfirmation {
            supplier_booking_id,
            // airlines issue the PNR with the ticket, later
            confirmation_code: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use domain::GuestDetails;

    fn request(flight_number: &str, passengers: u32) -> ReservationRequest {
        ReservationRequest {
            reference: "TRV-ABCD1234".to_string(),
            query: AvailabilityQuery::Flight {
                flight_number: flight_number.to_string(),
                departure_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
                passengers,
                seat_class: "economy".to_string(),
            },
            guest_details: GuestDetails {
                adults: passengers,
                ..Default::default()
            },
            contact_email: "guest@example.com".to_string(),
            requested_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_seat_availability() {
        let provider = InMemoryFlightProvider::new();

        let available = provider
            .check_availability(&request("LH902", 2).query)
            .await
            .unwrap();
        assert!(available.available);

        let too_many = provider
            .check_availability(&request("LH902", 3).query)
            .await
            .unwrap();
        assert!(!too_many.available);
    }

    #[tokio::test]
    async fn test_commit_takes_seats() {
        let provider = InMemoryFlightProvider::new();

        let confirmation = provider.commit_reservation(&request("LH902", 2)).await.unwrap();
        assert!(confirmation.supplier_booking_id.starts_with("FLT-"));
        assert!(confirmation.confirmation_code.is_none());
        assert_eq!(provider.reservation_count(), 1);

        let result = provider.commit_reservation(&request("LH902", 1)).await;
        assert!(matches!(result, Err(ProviderError::CommitFailed { .. })));
    }

    #[tokio::test]
    async fn test_hotel_query_rejected() {
        let provider = InMemoryFlightProvider::new();
        let query = AvailabilityQuery::Hotel {
            property_id: "hotel-sunrise".to_string(),
            room_type: None,
            check_in: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
            rooms: 1,
            guests: 2,
        };
        let result = provider.check_availability(&query).await;
        assert!(matches!(result, Err(ProviderError::Unavailable { .. })));
    }
}
