//! The booking aggregate and its lifecycle transitions.

use chrono::{DateTime, Utc};
use common::{BookingId, Currency, Money, TripId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

use super::guest::GuestDetails;
use super::policy::{CancellationPolicy, ModificationPolicy};
use super::status::{BookingStatus, BookingType};

/// One entry in a booking's append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: BookingStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub updated_by: String,
}

/// Parameters for creating a booking. Validation of these fields is the
/// caller's responsibility; the aggregate only enforces lifecycle rules.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: UserId,
    pub trip_id: Option<TripId>,
    pub kind: BookingType,
    pub supplier_name: String,
    pub external_reference: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub guest_details: GuestDetails,
    pub total_amount: Money,
    pub taxes: Money,
    pub fees: Money,
    pub currency: Currency,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub special_requests: Option<String>,
    pub cancellation_policy: Option<CancellationPolicy>,
    pub modification_policy: Option<ModificationPolicy>,
}

/// Fields a traveler may change on a confirmed booking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingChanges {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub guest_details: Option<GuestDetails>,
    pub special_requests: Option<String>,
}

impl BookingChanges {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.guest_details.is_none()
            && self.special_requests.is_none()
    }
}

/// A traveler's reservation with one supplier, moving through the
/// Pending → Confirmed → Completed/Cancelled lifecycle.
///
/// All transitions append exactly one [`StatusHistoryEntry`] and are
/// rejected from states the machine does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<TripId>,
    pub kind: BookingType,
    pub status: BookingStatus,
    /// Human-facing reference shown to the traveler, e.g. `TRV-1A2B3C4D`.
    pub reference: String,
    pub supplier_name: String,
    /// The supplier's own identifier for the committed reservation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_booking_id: Option<String>,
    /// Supplier-side confirmation code, present once confirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub guest_details: GuestDetails,
    pub total_amount: Money,
    pub taxes: Money,
    pub fees: Money,
    pub currency: Currency,
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_policy: Option<CancellationPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_policy: Option<ModificationPolicy>,
    pub status_history: Vec<StatusHistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by the store on every write.
    pub version: u64,
}

impl Booking {
    /// Creates a pending booking with a fresh reference and the initial
    /// history entry.
    pub fn new(params: NewBooking, now: DateTime<Utc>) -> Self {
        let id = BookingId::new();
        Self {
            id,
            user_id: params.user_id,
            trip_id: params.trip_id,
            kind: params.kind,
            status: BookingStatus::Pending,
            reference: generate_reference(id.as_uuid()),
            supplier_name: params.supplier_name,
            supplier_booking_id: None,
            confirmation_code: None,
            external_reference: params.external_reference,
            start_date: params.start_date,
            end_date: params.end_date,
            guest_details: params.guest_details,
            total_amount: params.total_amount,
            taxes: params.taxes,
            fees: params.fees,
            currency: params.currency,
            contact_email: params.contact_email,
            contact_phone: params.contact_phone,
            special_requests: params.special_requests,
            cancellation_policy: params.cancellation_policy,
            modification_policy: params.modification_policy,
            status_history: vec![StatusHistoryEntry {
                status: BookingStatus::Pending,
                timestamp: now,
                reason: Some("Booking created".to_string()),
                updated_by: "system".to_string(),
            }],
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Confirms a pending booking after payment capture and supplier
    /// commit.
    pub fn confirm(
        &mut self,
        supplier_booking_id: impl Into<String>,
        confirmation_code: Option<String>,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.status.can_confirm() {
            return Err(self.illegal("be confirmed"));
        }
        self.supplier_booking_id = Some(supplier_booking_id.into());
        self.confirmation_code = confirmation_code;
        self.transition(BookingStatus::Confirmed, None, updated_by, now);
        Ok(())
    }

    /// Marks a pending booking failed, recording the failure reason.
    pub fn fail(&mut self, reason: impl Into<String>, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.status.can_fail() {
            return Err(self.illegal("fail"));
        }
        self.transition(BookingStatus::Failed, Some(reason.into()), "system", now);
        Ok(())
    }

    /// Cancels a confirmed booking.
    pub fn cancel(
        &mut self,
        reason: Option<String>,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.status.can_cancel() {
            return Err(self.illegal("be cancelled"));
        }
        self.transition(BookingStatus::Cancelled, reason, updated_by, now);
        Ok(())
    }

    /// Completes a confirmed booking once the stay or travel is over.
    pub fn complete(&mut self, updated_by: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.status.can_complete() {
            return Err(self.illegal("be completed"));
        }
        self.transition(BookingStatus::Completed, None, updated_by, now);
        Ok(())
    }

    /// Applies traveler-requested changes to a confirmed booking.
    ///
    /// Policy eligibility is checked by the caller; the aggregate only
    /// enforces that the booking is in a modifiable state.
    pub fn apply_changes(
        &mut self,
        changes: BookingChanges,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.status.can_modify() {
            return Err(self.illegal("be modified"));
        }
        if let Some(start) = changes.start_date {
            self.start_date = start;
        }
        if let Some(end) = changes.end_date {
            self.end_date = end;
        }
        if let Some(guests) = changes.guest_details {
            self.guest_details = guests;
        }
        if let Some(requests) = changes.special_requests {
            self.special_requests = Some(requests);
        }
        self.status_history.push(StatusHistoryEntry {
            status: self.status,
            timestamp: now,
            reason: Some("Booking modified".to_string()),
            updated_by: updated_by.to_string(),
        });
        self.updated_at = now;
        Ok(())
    }

    /// Applies a supplier-reported status, converging rather than
    /// failing on redelivery.
    ///
    /// Returns `Ok(true)` when the status changed, `Ok(false)` when the
    /// booking was already in the reported state, and an error when the
    /// reported state is unreachable from the current one.
    pub fn apply_supplier_status(
        &mut self,
        reported: BookingStatus,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        if self.status == reported {
            return Ok(false);
        }
        let legal = match reported {
            BookingStatus::Confirmed => self.status.can_confirm(),
            BookingStatus::Cancelled => self.status.can_cancel(),
            BookingStatus::Completed => self.status.can_complete(),
            BookingStatus::Failed => self.status.can_fail(),
            BookingStatus::Pending => false,
        };
        if !legal {
            return Err(self.illegal("apply supplier status"));
        }
        self.transition(reported, reason, "system", now);
        Ok(true)
    }

    fn transition(
        &mut self,
        status: BookingStatus,
        reason: Option<String>,
        updated_by: &str,
        now: DateTime<Utc>,
    ) {
        self.status = status;
        self.status_history.push(StatusHistoryEntry {
            status,
            timestamp: now,
            reason,
            updated_by: updated_by.to_string(),
        });
        self.updated_at = now;
    }

    fn illegal(&self, action: &'static str) -> DomainError {
        DomainError::InvalidStateTransition {
            entity: "booking",
            current: self.status.to_string(),
            action,
        }
    }
}

/// Builds the traveler-facing reference from the booking id: `TRV-`
/// followed by the first eight hex digits of the id, uppercased.
fn generate_reference(id: Uuid) -> String {
    let hex = id.simple().to_string();
    format!("TRV-{}", hex[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap()
    }

    fn sample() -> Booking {
        Booking::new(
            NewBooking {
                user_id: UserId::new(),
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
                taxes: Money::from_cents(4_000),
                fees: Money::from_cents(1_000),
                currency: Currency::usd(),
                contact_email: "guest@example.com".to_string(),
                contact_phone: None,
                special_requests: None,
                cancellation_policy: None,
                modification_policy: None,
            },
            now(),
        )
    }

    #[test]
    fn test_new_booking_is_pending_with_reference() {
        let booking = sample();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.reference.starts_with("TRV-"));
        assert_eq!(booking.reference.len(), 12);
        assert_eq!(booking.status_history.len(), 1);
        assert_eq!(booking.version, 0);
    }

    #[test]
    fn test_reference_is_uppercase_hex() {
        let booking = sample();
        let suffix = &booking.reference[4..];
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_confirm_records_supplier_details_and_history() {
        let mut booking = sample();
        booking
            .confirm("BKG-42", Some("CONF123".to_string()), "system", now())
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.supplier_booking_id.as_deref(), Some("BKG-42"));
        assert_eq!(booking.confirmation_code.as_deref(), Some("CONF123"));
        assert_eq!(booking.status_history.len(), 2);
    }

    #[test]
    fn test_confirm_twice_rejected() {
        let mut booking = sample();
        booking.confirm("BKG-42", None, "system", now()).unwrap();
        let err = booking.confirm("BKG-43", None, "system", now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_cancel_requires_confirmed() {
        let mut booking = sample();
        assert!(booking.cancel(None, "user", now()).is_err());

        booking.confirm("BKG-42", None, "system", now()).unwrap();
        booking
            .cancel(Some("change of plans".to_string()), "user", now())
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        let last = booking.status_history.last().unwrap();
        assert_eq!(last.reason.as_deref(), Some("change of plans"));
        assert_eq!(last.updated_by, "user");
    }

    #[test]
    fn test_fail_only_from_pending() {
        let mut booking = sample();
        booking.fail("card declined", now()).unwrap();
        assert_eq!(booking.status, BookingStatus::Failed);
        assert!(booking.fail("again", now()).is_err());
    }

    #[test]
    fn test_apply_changes_updates_fields() {
        let mut booking = sample();
        booking.confirm("BKG-42", None, "system", now()).unwrap();
        let new_end = Utc.with_ymd_and_hms(2026, 10, 7, 10, 0, 0).unwrap();
        booking
            .apply_changes(
                BookingChanges {
                    end_date: Some(new_end),
                    special_requests: Some("late checkout".to_string()),
                    ..Default::default()
                },
                "user",
                now(),
            )
            .unwrap();
        assert_eq!(booking.end_date, new_end);
        assert_eq!(booking.special_requests.as_deref(), Some("late checkout"));
        // status unchanged, history appended
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.status_history.len(), 3);
    }

    #[test]
    fn test_apply_changes_rejected_while_pending() {
        let mut booking = sample();
        let err = booking
            .apply_changes(BookingChanges::default(), "user", now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_supplier_status_is_idempotent() {
        let mut booking = sample();
        booking.confirm("BKG-42", None, "system", now()).unwrap();

        // redelivery of the state we are already in is a no-op
        let changed = booking
            .apply_supplier_status(BookingStatus::Confirmed, None, now())
            .unwrap();
        assert!(!changed);
        assert_eq!(booking.status_history.len(), 2);

        let changed = booking
            .apply_supplier_status(
                BookingStatus::Cancelled,
                Some("property closed".to_string()),
                now(),
            )
            .unwrap();
        assert!(changed);
        assert_eq!(booking.status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_supplier_status_unreachable_rejected() {
        let mut booking = sample();
        // completed is unreachable from pending
        let err = booking
            .apply_supplier_status(BookingStatus::Completed, None, now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
    }
}
