//! Booking aggregate, items, and policy engine.

mod aggregate;
mod guest;
mod item;
mod policy;
mod status;

pub use aggregate::{Booking, BookingChanges, NewBooking, StatusHistoryEntry};
pub use guest::{Guest, GuestDetails};
pub use item::{BookingItem, ItemDetails};
pub use policy::{
    CancellationCheck, CancellationPolicy, FeeTier, ModificationCheck, ModificationPolicy,
    check_cancellation, check_modification, refund_amount,
};
pub use status::{BookingStatus, BookingType};
