//! In-memory booking store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{BookingId, PaymentId, UserId};
use domain::{Booking, BookingItem, Payment};
use tokio::sync::RwLock;

use crate::store::{BookingFilter, BookingStore};
use crate::{Result, StoreError};

#[derive(Debug, Default)]
struct State {
    bookings: HashMap<BookingId, Booking>,
    items: HashMap<BookingId, Vec<BookingItem>>,
    payments: HashMap<PaymentId, Payment>,
}

/// In-memory booking store backing tests and local development.
///
/// Provides the same optimistic-concurrency semantics as a database
/// implementation: updates compare the incoming record's version with
/// the stored one and bump it on success.
#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryBookingStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of bookings stored.
    pub async fn booking_count(&self) -> usize {
        self.state.read().await.bookings.len()
    }

    /// Returns the total number of payments stored.
    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.bookings.clear();
        state.items.clear();
        state.payments.clear();
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert_booking(&self, booking: Booking, items: Vec<BookingItem>) -> Result<()> {
        let mut state = self.state.write().await;
        if state.bookings.contains_key(&booking.id) {
            return Err(StoreError::Duplicate {
                entity: "booking",
                key: booking.id.to_string(),
            });
        }
        state.items.insert(booking.id, items);
        state.bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn get_booking(&self, id: BookingId) -> Result<Booking> {
        let state = self.state.read().await;
        state
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::booking_not_found(id))
    }

    async fn get_booking_items(&self, id: BookingId) -> Result<Vec<BookingItem>> {
        let state = self.state.read().await;
        if !state.bookings.contains_key(&id) {
            return Err(StoreError::booking_not_found(id));
        }
        Ok(state.items.get(&id).cloned().unwrap_or_default())
    }

    async fn find_booking_by_reference(&self, reference: &str) -> Result<Booking> {
        let state = self.state.read().await;
        state
            .bookings
            .values()
            .find(|b| b.reference == reference)
            .cloned()
            .ok_or_else(|| StoreError::booking_not_found(reference))
    }

    async fn find_booking_by_supplier_id(
        &self,
        supplier_name: &str,
        supplier_booking_id: &str,
    ) -> Result<Booking> {
        let state = self.state.read().await;
        state
            .bookings
            .values()
            .find(|b| {
                b.supplier_name == supplier_name
                    && b.supplier_booking_id.as_deref() == Some(supplier_booking_id)
            })
            .cloned()
            .ok_or_else(|| {
                StoreError::booking_not_found(format!("{supplier_name}/{supplier_booking_id}"))
            })
    }

    async fn list_user_bookings(
        &self,
        user_id: UserId,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<_> = state
            .bookings
            .values()
            .filter(|b| b.user_id == user_id && filter.apply(b))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn update_booking(&self, mut booking: Booking) -> Result<Booking> {
        let mut state = self.state.write().await;
        let stored = state
            .bookings
            .get(&booking.id)
            .ok_or_else(|| StoreError::booking_not_found(booking.id))?;
        if stored.version != booking.version {
            return Err(StoreError::VersionConflict {
                entity: "booking",
                key: booking.id.to_string(),
                expected: booking.version,
                actual: stored.version,
            });
        }
        booking.version += 1;
        state.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn insert_payment(&self, payment: Payment) -> Result<()> {
        let mut state = self.state.write().await;
        if state.payments.contains_key(&payment.id) {
            return Err(StoreError::Duplicate {
                entity: "payment",
                key: payment.id.to_string(),
            });
        }
        state.payments.insert(payment.id, payment);
        Ok(())
    }

    async fn get_payment(&self, id: PaymentId) -> Result<Payment> {
        let state = self.state.read().await;
        state
            .payments
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::payment_not_found(id))
    }

    async fn find_payment_by_intent(&self, gateway_intent_id: &str) -> Result<Payment> {
        let state = self.state.read().await;
        state
            .payments
            .values()
            .find(|p| p.gateway_intent_id.as_deref() == Some(gateway_intent_id))
            .cloned()
            .ok_or_else(|| StoreError::payment_not_found(gateway_intent_id))
    }

    async fn find_payment_for_booking(&self, booking_id: BookingId) -> Result<Option<Payment>> {
        let state = self.state.read().await;
        Ok(state
            .payments
            .values()
            .find(|p| p.booking_id == booking_id)
            .cloned())
    }

    async fn update_payment(&self, mut payment: Payment) -> Result<Payment> {
        let mut state = self.state.write().await;
        let stored = state
            .payments
            .get(&payment.id)
            .ok_or_else(|| StoreError::payment_not_found(payment.id))?;
        if stored.version != payment.version {
            return Err(StoreError::VersionConflict {
                entity: "payment",
                key: payment.id.to_string(),
                expected: payment.version,
                actual: stored.version,
            });
        }
        payment.version += 1;
        state.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::{Currency, Money};
    use domain::{
        BookingStatus, BookingType, GuestDetails, NewBooking, PaymentMethod,
    };

    fn new_booking(user_id: UserId) -> Booking {
        let now = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();
        Booking::new(
            NewBooking {
                user_id,
                trip_id: None,
                kind: BookingType::Accommodation,
                supplier_name: "booking.com".to_string(),
                external_reference: None,
                start_date: Utc.with_ymd_and_hms(2026, 10, 1, 14, 0, 0).unwrap(),
                end_date: Utc.with_ymd_and_hms(2026, 10, 5, 10, 0, 0).unwrap(),
                guest_details: GuestDetails {
                    adults: 2,
                    ..Default::default()
                },
                total_amount: Money::from_cents(48_000),
                taxes: Money::zero(),
                fees: Money::zero(),
                currency: Currency::usd(),
                contact_email: "guest@example.com".to_string(),
                contact_phone: None,
                special_requests: None,
                cancellation_policy: None,
                modification_policy: None,
            },
            now,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get_booking() {
        let store = InMemoryBookingStore::new();
        let booking = new_booking(UserId::new());
        let id = booking.id;

        store.insert_booking(booking, vec![]).await.unwrap();
        let loaded = store.get_booking(id).await.unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(store.booking_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_booking() {
        let store = InMemoryBookingStore::new();
        let err = store.get_booking(BookingId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemoryBookingStore::new();
        let booking = new_booking(UserId::new());

        store.insert_booking(booking.clone(), vec![]).await.unwrap();
        let err = store.insert_booking(booking, vec![]).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_find_by_reference() {
        let store = InMemoryBookingStore::new();
        let booking = new_booking(UserId::new());
        let reference = booking.reference.clone();

        store.insert_booking(booking.clone(), vec![]).await.unwrap();
        let found = store.find_booking_by_reference(&reference).await.unwrap();
        assert_eq!(found.id, booking.id);
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let store = InMemoryBookingStore::new();
        let booking = new_booking(UserId::new());
        store.insert_booking(booking.clone(), vec![]).await.unwrap();

        let updated = store.update_booking(booking).await.unwrap();
        assert_eq!(updated.version, 1);
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() {
        let store = InMemoryBookingStore::new();
        let booking = new_booking(UserId::new());
        store.insert_booking(booking.clone(), vec![]).await.unwrap();

        // two readers race; the second write carries a stale version
        let stale = booking.clone();
        store.update_booking(booking).await.unwrap();
        let err = store.update_booking(stale).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_list_user_bookings_filters_by_status() {
        let store = InMemoryBookingStore::new();
        let user_id = UserId::new();
        let now = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();

        let mut confirmed = new_booking(user_id);
        confirmed
            .confirm("BKG-1", None, "system", now)
            .unwrap();
        store.insert_booking(confirmed, vec![]).await.unwrap();
        store
            .insert_booking(new_booking(user_id), vec![])
            .await
            .unwrap();
        store
            .insert_booking(new_booking(UserId::new()), vec![])
            .await
            .unwrap();

        let all = store
            .list_user_bookings(user_id, BookingFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let confirmed_only = store
            .list_user_bookings(
                user_id,
                BookingFilter {
                    status: Some(BookingStatus::Confirmed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(confirmed_only.len(), 1);
    }

    #[tokio::test]
    async fn test_payment_round_trip_with_versioning() {
        let store = InMemoryBookingStore::new();
        let booking = new_booking(UserId::new());
        let now = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();
        let mut payment = Payment::new(
            booking.id,
            booking.user_id,
            Money::from_cents(48_000),
            Currency::usd(),
            PaymentMethod::Card,
            now,
        );
        payment.gateway_intent_id = Some("pi_123".to_string());

        store.insert_booking(booking.clone(), vec![]).await.unwrap();
        store.insert_payment(payment.clone()).await.unwrap();

        let by_intent = store.find_payment_by_intent("pi_123").await.unwrap();
        assert_eq!(by_intent.id, payment.id);

        let for_booking = store
            .find_payment_for_booking(booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(for_booking.id, payment.id);

        let updated = store.update_payment(payment.clone()).await.unwrap();
        assert_eq!(updated.version, 1);
        let err = store.update_payment(payment).await.unwrap_err();
        assert!(err.is_conflict());
    }
}
