//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use orchestrator::OrchestratorError;
use payments::PaymentsError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid credentials.
    Unauthorized(String),
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Booking orchestration error.
    Orchestrator(OrchestratorError),
    /// Payment processing error.
    Payments(PaymentsError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Orchestrator(err) => orchestrator_error_to_response(err),
            ApiError::Payments(err) => payments_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn orchestrator_error_to_response(err: OrchestratorError) -> (StatusCode, String) {
    match &err {
        OrchestratorError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        OrchestratorError::Availability(_) => (StatusCode::CONFLICT, err.to_string()),
        OrchestratorError::Policy(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        OrchestratorError::Payment(_) => (StatusCode::PAYMENT_REQUIRED, err.to_string()),
        OrchestratorError::SupplierCommit(_) => (StatusCode::BAD_GATEWAY, err.to_string()),
        OrchestratorError::Domain(domain_err) => (domain_error_status(domain_err), err.to_string()),
        OrchestratorError::Payments(payments_err) => {
            (payments_error_status(payments_err), err.to_string())
        }
        OrchestratorError::Store(store_err) => (store_error_status(store_err), err.to_string()),
    }
}

fn payments_error_to_response(err: PaymentsError) -> (StatusCode, String) {
    (payments_error_status(&err), err.to_string())
}

fn payments_error_status(err: &PaymentsError) -> StatusCode {
    match err {
        PaymentsError::Validation(_) => StatusCode::BAD_REQUEST,
        PaymentsError::NotFound(_) => StatusCode::NOT_FOUND,
        PaymentsError::Gateway(_) => StatusCode::BAD_GATEWAY,
        PaymentsError::Signature(_) => StatusCode::UNAUTHORIZED,
        PaymentsError::Domain(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PaymentsError::Store(store_err) => store_error_status(store_err),
    }
}

fn domain_error_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
        DomainError::ExcessiveRefund { .. } | DomainError::NotRefundable { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn store_error_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Duplicate { .. } | StoreError::VersionConflict { .. } => StatusCode::CONFLICT,
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        ApiError::Orchestrator(err)
    }
}

impl From<PaymentsError> for ApiError {
    fn from(err: PaymentsError) -> Self {
        ApiError::Payments(err)
    }
}
