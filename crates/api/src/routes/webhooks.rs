//! Webhook receivers for the payment gateway and suppliers.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use orchestrator::SupplierUpdateOutcome;
use payments::WebhookOutcome;
use providers::SupplierUpdate;
use serde::Serialize;
use store::BookingStore;

use crate::AppState;
use crate::error::ApiError;

/// Header carrying the gateway's `t=...,v1=...` signature.
pub const SIGNATURE_HEADER: &str = "webhook-signature";

#[derive(Serialize)]
pub struct WebhookResponse {
    pub outcome: &'static str,
}

/// POST /webhooks/payments — gateway delivery, verified over the raw body.
#[tracing::instrument(skip(state, headers, body))]
pub async fn payments<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let outcome = state
        .reconciler
        .handle_gateway_event(signature, &body)
        .await?;

    Ok(Json(WebhookResponse {
        outcome: match outcome {
            WebhookOutcome::Applied => "applied",
            WebhookOutcome::AlreadyApplied => "already_applied",
            WebhookOutcome::Ignored => "ignored",
        },
    }))
}

/// POST /webhooks/suppliers/:supplier — supplier status delivery.
#[tracing::instrument(skip(state, update))]
pub async fn suppliers<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(supplier): Path<String>,
    Json(update): Json<SupplierUpdate>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let outcome = state
        .reconciler
        .handle_supplier_event(&supplier, update)
        .await?;

    Ok(Json(WebhookResponse {
        outcome: match outcome {
            SupplierUpdateOutcome::Applied => "applied",
            SupplierUpdateOutcome::AlreadyApplied => "already_applied",
            SupplierUpdateOutcome::Ignored => "ignored",
        },
    }))
}
