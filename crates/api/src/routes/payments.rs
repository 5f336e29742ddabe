//! Payment intent and payment-method endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use common::{Currency, Money};
use payments::{PaymentIntent, PaymentMethodSummary};
use serde::Deserialize;
use store::BookingStore;

use crate::AppState;
use crate::auth::authenticate;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateIntentRequest {
    pub amount_cents: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /payments/intent — create a gateway intent ahead of checkout.
#[tracing::instrument(skip(state, headers, request))]
pub async fn create_intent<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(request): Json<CreateIntentRequest>,
) -> Result<(StatusCode, Json<PaymentIntent>), ApiError> {
    authenticate(state.users.as_ref(), &headers).await?;

    let currency = request
        .currency
        .as_deref()
        .map(Currency::new)
        .unwrap_or_default();
    let intent = state
        .payments
        .create_payment_intent(
            Money::from_cents(request.amount_cents),
            &currency,
            request.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(intent)))
}

/// GET /payments/methods/:customer_id — stored payment methods.
#[tracing::instrument(skip(state, headers))]
pub async fn list_methods<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<PaymentMethodSummary>>, ApiError> {
    authenticate(state.users.as_ref(), &headers).await?;
    let methods = state.payments.list_payment_methods(&customer_id).await?;
    Ok(Json(methods))
}
