//! Inventory provider adapters.
//!
//! Each supplier (hotel aggregator, airline GDS) is reached through the
//! [`InventoryProvider`] trait: an availability check before any state
//! is persisted, and a reservation commit once payment has settled. The
//! in-memory providers back tests and local development with
//! configurable failure switches.

pub mod error;
pub mod flight;
pub mod hotel;
pub mod provider;
pub mod webhook;

pub use error::ProviderError;
pub use flight::InMemoryFlightProvider;
pub use hotel::InMemoryHotelProvider;
pub use provider::{
    Availability, AvailabilityQuery, InventoryProvider, ReservationConfirmation,
    ReservationRequest,
};
pub use webhook::{SupplierStatus, SupplierUpdate};
