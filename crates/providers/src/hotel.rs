//! In-memory hotel aggregator adapter.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Currency, Money};

use crate::error::ProviderError;
use crate::provider::{
    Availability, AvailabilityQuery, InventoryProvider, ReservationConfirmation,
    ReservationRequest,
};

const SUPPLIER_NAME: &str = "booking.com";

#[derive(Debug)]
struct InMemoryHotelState {
    /// Rooms on offer per property id: (available rooms, nightly rate).
    properties: HashMap<String, (u32, Money)>,
    reservations: HashMap<String, String>,
    next_id: u32,
    fail_on_commit: bool,
}

impl Default for InMemoryHotelState {
    fn default() -> Self {
        Self {
            properties: HashMap::from([
                ("hotel-sunrise".to_string(), (10, Money::from_cents(12_000))),
                ("hotel-plaza".to_string(), (4, Money::from_cents(27_500))),
            ]),
            reservations: HashMap::new(),
            next_id: 0,
            fail_on_commit: false,
        }
    }
}

/// In-memory hotel provider for wiring and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHotelProvider {
    state: Arc<RwLock<InMemoryHotelState>>,
}

impl InMemoryHotelProvider {
    /// Creates a provider with a default set of properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a property offer.
    pub fn set_property(&self, property_id: &str, rooms: u32, nightly_rate: Money) {
        self.state
            .write()
            .unwrap()
            .properties
            .insert(property_id.to_string(), (rooms, nightly_rate));
    }

    /// Configures the provider to fail reservation commits.
    pub fn set_fail_on_commit(&self, fail: bool) {
        self.state.write().unwrap().fail_on_commit = fail;
    }

    /// Returns the number of committed reservations.
    pub fn reservation_count(&self) -> usize {
        self.state.read().unwrap().reservations.len()
    }

    /// Returns true if a reservation exists with the given supplier id.
    pub fn has_reservation(&self, supplier_booking_id: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .reservations
            .contains_key(supplier_booking_id)
    }
}

#[async_trait]
impl InventoryProvider for InMemoryHotelProvider {
    fn supplier_name(&self) -> &str {
        SUPPLIER_NAME
    }

    async fn check_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Availability, ProviderError> {
        let AvailabilityQuery::Hotel {
            property_id, rooms, ..
        } = query
        else {
            return Err(ProviderError::Unavailable {
                supplier: SUPPLIER_NAME.to_string(),
                reason: "only hotel inventory is offered".to_string(),
            });
        };

        let state = self.state.read().unwrap();
        let Some((available_rooms, rate)) = state.properties.get(property_id) else {
            return Err(ProviderError::Unavailable {
                supplier: SUPPLIER_NAME.to_string(),
                reason: format!("unknown property {property_id}"),
            });
        };

        Ok(Availability {
            available: available_rooms >= rooms,
            unit_price: *rate,
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
                reason: "property rejected the reservation".to_string(),
            });
        }

        let AvailabilityQuery::Hotel {
            property_id, rooms, ..
        } = &request.query
        else {
            return Err(ProviderError::CommitFailed {
                supplier: SUPPLIER_NAME.to_string(),
                reason: "only hotel inventory is offered".to_string(),
            });
        };

        match state.properties.get_mut(property_id) {
            Some((available, _)) if *available >= *rooms => *available -= rooms,
            _ => {
                return Err(ProviderError::CommitFailed {
                    supplier: SUPPLIER_NAME.to_string(),
                    reason: format!("no rooms left at {property_id}"),
                });
            }
        }

        state.next_id += 1;
        let supplier_booking_id = format!("HTL-{:06}", state.next_id);
        state
            .reservations
            .insert(supplier_booking_id.clone(), request.reference.clone());

        Ok(ReservationConfirmation {
            supplier_booking_id,
            confirmation_code: Some(format!("CONF-{}", request.reference)),
        })
    }
}
