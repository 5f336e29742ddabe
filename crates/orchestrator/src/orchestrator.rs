//! The booking orchestrator.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveTime, Utc};
use common::{BookingId, Money, UserId};
use domain::{
    Booking, BookingChanges, BookingItem, BookingStatus, BookingType, DomainError, ItemDetails,
    NewBooking, Payment, PaymentStatus, StatusHistoryEntry, check_cancellation,
    check_modification, refund_amount,
};
use payments::PaymentProcessor;
use providers::{
    Availability, AvailabilityQuery, InventoryProvider, ReservationRequest, SupplierUpdate,
};
use store::{BookingFilter, BookingStore, StoreError};
use tokio::time::timeout;

use crate::error::OrchestratorError;
use crate::notify::{NotificationKind, Notifier};
use crate::requests::{CancelRequest, FlightBookingRequest, HotelBookingRequest, ListQuery};

const DEFAULT_EXTERNAL_TIMEOUT: Duration = Duration::from_secs(10);

/// One page of a user's bookings.
#[derive(Debug)]
pub struct BookingPage {
    pub bookings: Vec<Booking>,
    /// Total matching bookings before pagination.
    pub total: usize,
}

/// What a supplier update did to the persisted booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplierUpdateOutcome {
    /// The booking transitioned.
    Applied,
    /// The booking had already reached the reported status.
    AlreadyApplied,
    /// The supplier is not one we integrate with.
    Ignored,
}

/// Drives the booking lifecycle: availability, pending persistence,
/// payment capture, supplier commit, confirmation, and compensation
/// when the commit fails after funds were captured.
pub struct BookingOrchestrator<S> {
    store: Arc<S>,
    hotel_provider: Arc<dyn InventoryProvider>,
    flight_provider: Arc<dyn InventoryProvider>,
    payments: Arc<PaymentProcessor<S>>,
    notifier: Arc<dyn Notifier>,
    external_timeout: Duration,
}

impl<S: BookingStore> BookingOrchestrator<S> {
    /// Creates an orchestrator with the default external-call timeout.
    pub fn new(
        store: Arc<S>,
        hotel_provider: Arc<dyn InventoryProvider>,
        flight_provider: Arc<dyn InventoryProvider>,
        payments: Arc<PaymentProcessor<S>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            hotel_provider,
            flight_provider,
            payments,
            notifier,
            external_timeout: DEFAULT_EXTERNAL_TIMEOUT,
        }
    }

    /// Overrides the timeout bounding availability and commit calls.
    pub fn with_external_timeout(mut self, external_timeout: Duration) -> Self {
        self.external_timeout = external_timeout;
        self
    }

    /// Books hotel rooms: availability check, PENDING persistence,
    /// payment capture, supplier commit, confirmation.
    ///
    /// An unavailable property persists nothing. A failed payment
    /// persists a FAILED booking and payment. A failed supplier commit
    /// after capture refunds the payment in full and fails the booking.
    #[tracing::instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn create_hotel_booking(
        &self,
        user_id: UserId,
        request: HotelBookingRequest,
    ) -> Result<Booking, OrchestratorError> {
        request.validate()?;

        let query = AvailabilityQuery::Hotel {
            property_id: request.property_id.clone(),
            room_type: request.room_type.clone(),
            check_in: request.check_in,
            check_out: request.check_out,
            rooms: request.rooms,
            guests: request.guest_details.total(),
        };
        let availability = self
            .check_availability(self.hotel_provider.as_ref(), &query)
            .await?;

        // one unit per room-night
        let quantity = request.rooms * request.nights();
        let total = availability.unit_price.multiply(quantity);

        let booking = Booking::new(
            NewBooking {
                user_id,
                trip_id: request.trip_id,
                kind: BookingType::Accommodation,
                supplier_name: self.hotel_provider.supplier_name().to_string(),
                external_reference: None,
                start_date: request.check_in.and_time(NaiveTime::MIN).and_utc(),
                end_date: request.check_out.and_time(NaiveTime::MIN).and_utc(),
                guest_details: request.guest_details.clone(),
                total_amount: total,
                taxes: Money::zero(),
                fees: Money::zero(),
                currency: availability.currency.clone(),
                contact_email: request.contact_email.clone(),
                contact_phone: request.contact_phone.clone(),
                special_requests: request.special_requests.clone(),
                cancellation_policy: request.cancellation_policy.clone(),
                modification_policy: request.modification_policy.clone(),
            },
            Utc::now(),
        );
        let item = BookingItem::new(
            booking.id,
            request.property_name.clone(),
            ItemDetails::Room {
                room_type: request.room_type.clone(),
                room_count: request.rooms,
            },
            availability.unit_price,
            quantity,
            availability.currency,
        );
        self.store.insert_booking(booking.clone(), vec![item]).await?;

        self.finalize_booking(booking, query, &request.payment_method_id)
            .await
    }

    /// Books flight seats through the same pipeline as hotel bookings.
    #[tracing::instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn create_flight_booking(
        &self,
        user_id: UserId,
        request: FlightBookingRequest,
    ) -> Result<Booking, OrchestratorError> {
        request.validate()?;

        let query = AvailabilityQuery::Flight {
            flight_number: request.flight_number.clone(),
            departure_date: request.departure_date,
            passengers: request.passengers(),
            seat_class: request.seat_class.clone(),
        };
        let availability = self
            .check_availability(self.flight_provider.as_ref(), &query)
            .await?;

        let quantity = request.passengers();
        let total = availability.unit_price.multiply(quantity);
        let start_date = request
            .departure_time
            .unwrap_or_else(|| request.departure_date.and_time(NaiveTime::MIN).and_utc());
        let end_date = request.arrival_time.unwrap_or(start_date);

        let booking = Booking::new(
            NewBooking {
                user_id,
                trip_id: request.trip_id,
                kind: BookingType::Flight,
                supplier_name: self.flight_provider.supplier_name().to_string(),
                external_reference: None,
                start_date,
                end_date,
                guest_details: request.guest_details.clone(),
                total_amount: total,
                taxes: Money::zero(),
                fees: Money::zero(),
                currency: availability.currency.clone(),
                contact_email: request.contact_email.clone(),
                contact_phone: request.contact_phone.clone(),
                special_requests: request.special_requests.clone(),
                cancellation_policy: request.cancellation_policy.clone(),
                modification_policy: None,
            },
            Utc::now(),
        );
        let item = BookingItem::new(
            booking.id,
            format!("{} {}", request.airline, request.flight_number),
            ItemDetails::FlightSegment {
                flight_number: request.flight_number.clone(),
                airline: request.airline.clone(),
                departure_airport: request.departure_airport.clone(),
                arrival_airport: request.arrival_airport.clone(),
                departure_time: request.departure_time,
                arrival_time: request.arrival_time,
                seat_class: request.seat_class.clone(),
            },
            availability.unit_price,
            quantity,
            availability.currency,
        );
        self.store.insert_booking(booking.clone(), vec![item]).await?;

        self.finalize_booking(booking, query, &request.payment_method_id)
            .await
    }

    /// Cancels a confirmed booking: policy check, proportional refund,
    /// CANCELLED transition, best-effort notification.
    #[tracing::instrument(skip(self), fields(booking_id = %booking_id, user_id = %user_id))]
    pub async fn cancel_booking(
        &self,
        booking_id: BookingId,
        user_id: UserId,
        request: CancelRequest,
    ) -> Result<Booking, OrchestratorError> {
        let mut booking = self.owned_booking(booking_id, user_id).await?;
        if !booking.status.can_cancel() {
            return Err(DomainError::InvalidStateTransition {
                entity: "booking",
                current: booking.status.to_string(),
                action: "be cancelled",
            }
            .into());
        }

        let now = Utc::now();
        let check = check_cancellation(booking.cancellation_policy.as_ref(), booking.start_date, now);
        if !check.allowed {
            return Err(OrchestratorError::Policy(
                check
                    .reason
                    .unwrap_or_else(|| "cancellation not allowed".to_string()),
            ));
        }

        let refund = refund_amount(booking.total_amount, check.fee_percentage);
        if refund.is_positive() {
            if let Some(payment) = self.store.find_payment_for_booking(booking.id).await? {
                if payment.status.is_settled() {
                    self.payments.process_refund(payment.id, refund).await?;
                }
            }
        }

        let reason = request
            .reason
            .unwrap_or_else(|| "User cancellation".to_string());
        booking.cancel(Some(reason), "user", now)?;
        let booking = self.store.update_booking(booking).await?;

        self.notify(NotificationKind::Cancellation, &booking).await;
        metrics::counter!("bookings_cancelled_total").increment(1);
        Ok(booking)
    }

    /// Applies traveler changes to a confirmed booking after the
    /// modification policy allows them.
    #[tracing::instrument(skip(self, changes), fields(booking_id = %booking_id, user_id = %user_id))]
    pub async fn modify_booking(
        &self,
        booking_id: BookingId,
        user_id: UserId,
        changes: BookingChanges,
    ) -> Result<Booking, OrchestratorError> {
        if changes.is_empty() {
            return Err(OrchestratorError::Validation(
                "no changes provided".to_string(),
            ));
        }

        let mut booking = self.owned_booking(booking_id, user_id).await?;
        if !booking.status.can_modify() {
            return Err(DomainError::InvalidStateTransition {
                entity: "booking",
                current: booking.status.to_string(),
                action: "be modified",
            }
            .into());
        }

        let start = changes.start_date.unwrap_or(booking.start_date);
        let end = changes.end_date.unwrap_or(booking.end_date);
        if end < start {
            return Err(OrchestratorError::Validation(
                "end date would precede start date".to_string(),
            ));
        }

        let check = check_modification(booking.modification_policy.as_ref(), Utc::now());
        if !check.allowed {
            return Err(OrchestratorError::Policy(
                check
                    .reason
                    .unwrap_or_else(|| "modification not allowed".to_string()),
            ));
        }

        booking.apply_changes(changes, "user", Utc::now())?;
        let booking = self.store.update_booking(booking).await?;

        self.notify(NotificationKind::Modification, &booking).await;
        Ok(booking)
    }

    /// Loads a booking and its items, scoped to the owning traveler.
    /// Other travelers' bookings are reported as missing.
    pub async fn get_booking(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<(Booking, Vec<BookingItem>), OrchestratorError> {
        let booking = self.owned_booking(booking_id, user_id).await?;
        let items = self.store.get_booking_items(booking.id).await?;
        Ok((booking, items))
    }

    /// Lists a user's bookings newest-first with pagination.
    pub async fn list_user_bookings(
        &self,
        user_id: UserId,
        query: ListQuery,
    ) -> Result<BookingPage, OrchestratorError> {
        let filter = BookingFilter {
            status: query.status,
            kind: query.kind,
        };
        let all = self.store.list_user_bookings(user_id, filter).await?;
        let total = all.len();
        let bookings = all
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        Ok(BookingPage { bookings, total })
    }

    /// Applies a supplier-pushed status update. Redeliveries converge;
    /// updates from suppliers we do not integrate with are ignored.
    #[tracing::instrument(skip(self, update), fields(supplier))]
    pub async fn apply_supplier_update(
        &self,
        supplier: &str,
        update: SupplierUpdate,
    ) -> Result<SupplierUpdateOutcome, OrchestratorError> {
        if supplier != self.hotel_provider.supplier_name()
            && supplier != self.flight_provider.supplier_name()
        {
            tracing::warn!(supplier, "status update from unknown supplier ignored");
            return Ok(SupplierUpdateOutcome::Ignored);
        }

        let mut booking = self
            .store
            .find_booking_by_supplier_id(supplier, &update.supplier_booking_id)
            .await?;

        let changed = booking.apply_supplier_status(
            update.status.as_booking_status(),
            update.reason.clone(),
            Utc::now(),
        )?;
        if !changed {
            return Ok(SupplierUpdateOutcome::AlreadyApplied);
        }

        self.store.update_booking(booking).await?;
        metrics::counter!("supplier_updates_applied_total", "supplier" => supplier.to_string())
            .increment(1);
        Ok(SupplierUpdateOutcome::Applied)
    }

    /// Capture, commit, confirm. The booking passed in is already
    /// persisted as PENDING.
    async fn finalize_booking(
        &self,
        mut booking: Booking,
        query: AvailabilityQuery,
        payment_method_id: &str,
    ) -> Result<Booking, OrchestratorError> {
        let provider = self.provider_for(&query);

        let payment = match self.payments.process_payment(&booking, payment_method_id).await {
            Ok(payment) => payment,
            Err(err) => {
                booking.fail(format!("Payment failed: {err}"), Utc::now())?;
                self.store.update_booking(booking).await?;
                metrics::counter!("bookings_failed_total", "stage" => "payment").increment(1);
                return Err(OrchestratorError::Payment(err.to_string()));
            }
        };
        if payment.status != PaymentStatus::Completed {
            let reason = payment
                .failure_reason
                .clone()
                .unwrap_or_else(|| format!("payment ended in state '{}'", payment.status));
            booking.fail(format!("Payment failed: {reason}"), Utc::now())?;
            self.store.update_booking(booking).await?;
            metrics::counter!("bookings_failed_total", "stage" => "payment").increment(1);
            return Err(OrchestratorError::Payment(reason));
        }

        let reservation = ReservationRequest {
            reference: booking.reference.clone(),
            query,
            guest_details: booking.guest_details.clone(),
            contact_email: booking.contact_email.clone(),
            requested_at: Utc::now(),
        };
        let confirmation = match timeout(
            self.external_timeout,
            provider.commit_reservation(&reservation),
        )
        .await
        {
            Ok(Ok(confirmation)) => confirmation,
            Ok(Err(err)) => return self.compensate(booking, &payment, err.to_string()).await,
            Err(_) => {
                let reason = format!("{} commit timed out", provider.supplier_name());
                return self.compensate(booking, &payment, reason).await;
            }
        };

        booking.confirm(
            confirmation.supplier_booking_id,
            confirmation.confirmation_code,
            "system",
            Utc::now(),
        )?;
        let booking = self.store.update_booking(booking).await?;

        self.notify(NotificationKind::Confirmation, &booking).await;
        metrics::counter!("bookings_confirmed_total", "kind" => booking.kind.as_str())
            .increment(1);
        Ok(booking)
    }

    /// Unwinds a captured payment after a failed supplier commit: full
    /// refund, FAILED booking, history recording both outcomes.
    async fn compensate(
        &self,
        mut booking: Booking,
        payment: &Payment,
        reason: String,
    ) -> Result<Booking, OrchestratorError> {
        tracing::error!(
            booking_id = %booking.id,
            payment_id = %payment.id,
            %reason,
            "supplier commit failed after capture, compensating"
        );
        booking.fail(format!("Supplier commit failed: {reason}"), Utc::now())?;

        let refund_note = match self.payments.process_refund(payment.id, payment.amount).await {
            Ok(_) => "Captured payment refunded in full".to_string(),
            Err(err) => {
                // the capture is stranded at the gateway
                tracing::error!(
                    payment_id = %payment.id,
                    error = %err,
                    "compensating refund failed, manual reconciliation required"
                );
                format!("Refund failed: {err}; capture requires manual reconciliation")
            }
        };
        booking.status_history.push(StatusHistoryEntry {
            status: BookingStatus::Failed,
            timestamp: Utc::now(),
            reason: Some(refund_note),
            updated_by: "system".to_string(),
        });

        self.store.update_booking(booking).await?;
        metrics::counter!("bookings_failed_total", "stage" => "supplier_commit").increment(1);
        Err(OrchestratorError::SupplierCommit(reason))
    }

    async fn check_availability(
        &self,
        provider: &dyn InventoryProvider,
        query: &AvailabilityQuery,
    ) -> Result<Availability, OrchestratorError> {
        let availability = match timeout(self.external_timeout, provider.check_availability(query))
            .await
        {
            Ok(Ok(availability)) => availability,
            Ok(Err(err)) => return Err(OrchestratorError::Availability(err.to_string())),
            Err(_) => {
                return Err(OrchestratorError::Availability(format!(
                    "{} availability check timed out",
                    provider.supplier_name()
                )));
            }
        };
        if !availability.available {
            return Err(OrchestratorError::Availability(
                "requested inventory is not available for the selected dates".to_string(),
            ));
        }
        Ok(availability)
    }

    fn provider_for(&self, query: &AvailabilityQuery) -> &dyn InventoryProvider {
        match query {
            AvailabilityQuery::Hotel { .. } => self.hotel_provider.as_ref(),
            AvailabilityQuery::Flight { .. } => self.flight_provider.as_ref(),
        }
    }

    async fn owned_booking(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<Booking, OrchestratorError> {
        let booking = self.store.get_booking(booking_id).await?;
        if booking.user_id != user_id {
            // do not reveal other travelers' bookings
            return Err(StoreError::booking_not_found(booking_id).into());
        }
        Ok(booking)
    }

    async fn notify(&self, kind: NotificationKind, booking: &Booking) {
        if let Err(err) = self.notifier.send(kind, booking).await {
            tracing::warn!(
                booking_id = %booking.id,
                error = %err,
                "notification send failed"
            );
        }
    }
}
