//! Booking lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, Utc};
use common::BookingId;
use domain::{Booking, BookingChanges, BookingItem};
use orchestrator::{CancelRequest, FlightBookingRequest, HotelBookingRequest, ListQuery};
use serde::Serialize;
use store::BookingStore;

use crate::AppState;
use crate::auth::authenticate;
use crate::error::ApiError;

// -- Response types --

#[derive(Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub reference: String,
    pub status: String,
    pub kind: String,
    pub supplier_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_booking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_cents: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    pub version: u64,
}

impl From<&Booking> for BookingResponse {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            reference: booking.reference.clone(),
            status: booking.status.to_string(),
            kind: booking.kind.to_string(),
            supplier_name: booking.supplier_name.clone(),
            supplier_booking_id: booking.supplier_booking_id.clone(),
            confirmation_code: booking.confirmation_code.clone(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            total_cents: booking.total_amount.cents(),
            currency: booking.currency.as_str().to_string(),
            special_requests: booking.special_requests.clone(),
            version: booking.version,
        }
    }
}

#[derive(Serialize)]
pub struct BookingDetailResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub items: Vec<BookingItem>,
    pub status_history: Vec<domain::StatusHistoryEntry>,
}

#[derive(Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingResponse>,
    pub total: usize,
}

// -- Handlers --

/// POST /bookings/hotel — book hotel rooms end to end.
#[tracing::instrument(skip(state, headers, request))]
pub async fn create_hotel<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(request): Json<HotelBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let user = authenticate(state.users.as_ref(), &headers).await?;
    let booking = state
        .orchestrator
        .create_hotel_booking(user.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(&booking))))
}

/// POST /bookings/flight — book flight seats end to end.
#[tracing::instrument(skip(state, headers, request))]
pub async fn create_flight<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(request): Json<FlightBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let user = authenticate(state.users.as_ref(), &headers).await?;
    let booking = state
        .orchestrator
        .create_flight_booking(user.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(&booking))))
}

/// GET /bookings/:id — load one of the caller's bookings with its items.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BookingDetailResponse>, ApiError> {
    let user = authenticate(state.users.as_ref(), &headers).await?;
    let booking_id = parse_booking_id(&id)?;
    let (booking, items) = state.orchestrator.get_booking(booking_id, user.id).await?;
    Ok(Json(BookingDetailResponse {
        booking: BookingResponse::from(&booking),
        items,
        status_history: booking.status_history.clone(),
    }))
}

/// GET /bookings — list the caller's bookings, newest first.
#[tracing::instrument(skip(state, headers))]
pub async fn list<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<BookingListResponse>, ApiError> {
    let user = authenticate(state.users.as_ref(), &headers).await?;
    let page = state.orchestrator.list_user_bookings(user.id, query).await?;
    Ok(Json(BookingListResponse {
        bookings: page.bookings.iter().map(BookingResponse::from).collect(),
        total: page.total,
    }))
}

/// POST /bookings/:id/cancel — cancel under the booking's policy.
#[tracing::instrument(skip(state, headers, request))]
pub async fn cancel<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let user = authenticate(state.users.as_ref(), &headers).await?;
    let booking_id = parse_booking_id(&id)?;
    let booking = state
        .orchestrator
        .cancel_booking(booking_id, user.id, request)
        .await?;
    Ok(Json(BookingResponse::from(&booking)))
}

/// PATCH /bookings/:id — apply traveler changes under the policy.
#[tracing::instrument(skip(state, headers, changes))]
pub async fn modify<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(changes): Json<BookingChanges>,
) -> Result<Json<BookingResponse>, ApiError> {
    let user = authenticate(state.users.as_ref(), &headers).await?;
    let booking_id = parse_booking_id(&id)?;
    let booking = state
        .orchestrator
        .modify_booking(booking_id, user.id, changes)
        .await?;
    Ok(Json(BookingResponse::from(&booking)))
}

fn parse_booking_id(id: &str) -> Result<BookingId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid booking id: {e}")))?;
    Ok(BookingId::from_uuid(uuid))
}
