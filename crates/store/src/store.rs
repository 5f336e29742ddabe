//! The booking store contract.

use async_trait::async_trait;
use common::{BookingId, PaymentId, UserId};
use domain::{Booking, BookingItem, BookingStatus, BookingType, Payment};

use crate::Result;

/// Filters for listing a user's bookings.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub kind: Option<BookingType>,
}

impl BookingFilter {
    fn matches(&self, booking: &Booking) -> bool {
        if let Some(status) = self.status
            && booking.status != status
        {
            return false;
        }
        if let Some(kind) = self.kind
            && booking.kind != kind
        {
            return false;
        }
        true
    }

    pub(crate) fn apply(&self, booking: &Booking) -> bool {
        self.matches(booking)
    }
}

/// Storage contract for bookings, their items, and payments.
///
/// `update_*` methods take the record as the caller read it: the stored
/// version must match the record's version, and the successful write
/// returns the record with the version bumped by one.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persists a new booking together with its line items.
    async fn insert_booking(&self, booking: Booking, items: Vec<BookingItem>) -> Result<()>;

    /// Loads a booking by id.
    async fn get_booking(&self, id: BookingId) -> Result<Booking>;

    /// Loads the line items belonging to a booking.
    async fn get_booking_items(&self, id: BookingId) -> Result<Vec<BookingItem>>;

    /// Finds a booking by its traveler-facing reference.
    async fn find_booking_by_reference(&self, reference: &str) -> Result<Booking>;

    /// Finds a booking by the supplier's own reservation identifier.
    async fn find_booking_by_supplier_id(
        &self,
        supplier_name: &str,
        supplier_booking_id: &str,
    ) -> Result<Booking>;

    /// Lists a user's bookings, newest first.
    async fn list_user_bookings(
        &self,
        user_id: UserId,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>>;

    /// Writes back a modified booking under optimistic concurrency.
    async fn update_booking(&self, booking: Booking) -> Result<Booking>;

    /// Persists a new payment.
    async fn insert_payment(&self, payment: Payment) -> Result<()>;

    /// Loads a payment by id.
    async fn get_payment(&self, id: PaymentId) -> Result<Payment>;

    /// Finds a payment by the gateway's intent identifier.
    async fn find_payment_by_intent(&self, gateway_intent_id: &str) -> Result<Payment>;

    /// Returns the payment attached to a booking, if any.
    async fn find_payment_for_booking(&self, booking_id: BookingId) -> Result<Option<Payment>>;

    /// Writes back a modified payment under optimistic concurrency.
    async fn update_payment(&self, payment: Payment) -> Result<Payment>;
}
