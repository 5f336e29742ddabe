//! HTTP API server for the booking platform.
//!
//! Exposes booking lifecycle endpoints, payment intents, and the two
//! webhook receivers, with structured logging (tracing) and Prometheus
//! metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use metrics_exporter_prometheus::PrometheusHandle;
use orchestrator::{BookingOrchestrator, InMemoryNotifier, WebhookReconciler};
use payments::{MockGateway, PaymentProcessor, SignatureVerifier};
use providers::{InMemoryFlightProvider, InMemoryHotelProvider};
use store::{BookingStore, InMemoryBookingStore, InMemoryUserStore, UserStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: BookingStore> {
    pub orchestrator: Arc<BookingOrchestrator<S>>,
    pub payments: Arc<PaymentProcessor<S>>,
    pub reconciler: WebhookReconciler<S>,
    pub users: Arc<dyn UserStore>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: BookingStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/users", post(routes::users::create::<S>))
        .route("/bookings/hotel", post(routes::bookings::create_hotel::<S>))
        .route(
            "/bookings/flight",
            post(routes::bookings::create_flight::<S>),
        )
        .route("/bookings", get(routes::bookings::list::<S>))
        .route("/bookings/{id}", get(routes::bookings::get::<S>))
        .route("/bookings/{id}", patch(routes::bookings::modify::<S>))
        .route("/bookings/{id}/cancel", post(routes::bookings::cancel::<S>))
        .route("/payments/intent", post(routes::payments::create_intent::<S>))
        .route(
            "/payments/methods/{customer_id}",
            get(routes::payments::list_methods::<S>),
        )
        .route("/webhooks/payments", post(routes::webhooks::payments::<S>))
        .route(
            "/webhooks/suppliers/{supplier}",
            post(routes::webhooks::suppliers::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// In-memory backends behind the default state, exposed so tests can
/// seed inventory and flip failure switches.
pub struct DefaultBackends {
    pub store: Arc<InMemoryBookingStore>,
    pub users: Arc<InMemoryUserStore>,
    pub gateway: Arc<MockGateway>,
    pub hotel: Arc<InMemoryHotelProvider>,
    pub flights: Arc<InMemoryFlightProvider>,
    pub notifier: Arc<InMemoryNotifier>,
}

/// Creates the default application state over in-memory backends.
pub fn create_default_state(
    webhook_secret: &str,
) -> (Arc<AppState<InMemoryBookingStore>>, DefaultBackends) {
    let store = Arc::new(InMemoryBookingStore::new());
    let users = Arc::new(InMemoryUserStore::new());
    let gateway = Arc::new(MockGateway::new());
    let hotel = Arc::new(InMemoryHotelProvider::new());
    let flights = Arc::new(InMemoryFlightProvider::new());
    let notifier = Arc::new(InMemoryNotifier::new());

    let payments = Arc::new(PaymentProcessor::new(store.clone(), gateway.clone()));
    let orchestrator = Arc::new(BookingOrchestrator::new(
        store.clone(),
        hotel.clone(),
        flights.clone(),
        payments.clone(),
        notifier.clone(),
    ));
    let reconciler = WebhookReconciler::new(
        store.clone(),
        SignatureVerifier::new(webhook_secret),
        orchestrator.clone(),
    );

    let state = Arc::new(AppState {
        orchestrator,
        payments,
        reconciler,
        users: users.clone() as Arc<dyn UserStore>,
    });

    let backends = DefaultBackends {
        store,
        users,
        gateway,
        hotel,
        flights,
        notifier,
    };

    (state, backends)
}
