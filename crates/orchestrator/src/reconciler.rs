//! Routing of asynchronous webhook traffic onto persisted state.

use std::sync::Arc;

use chrono::Utc;
use payments::{SignatureVerifier, WebhookHandler, WebhookOutcome};
use providers::SupplierUpdate;
use store::BookingStore;

use crate::error::OrchestratorError;
use crate::orchestrator::{BookingOrchestrator, SupplierUpdateOutcome};

/// Routes webhook deliveries by source: gateway events go through
/// signature verification and payment reconciliation, supplier events
/// through typed decoding and the booking state machine.
pub struct WebhookReconciler<S> {
    gateway: WebhookHandler<S>,
    orchestrator: Arc<BookingOrchestrator<S>>,
}

impl<S: BookingStore> WebhookReconciler<S> {
    pub fn new(
        store: Arc<S>,
        verifier: SignatureVerifier,
        orchestrator: Arc<BookingOrchestrator<S>>,
    ) -> Self {
        Self {
            gateway: WebhookHandler::new(store, verifier),
            orchestrator,
        }
    }

    /// Handles a payment-gateway delivery. The signature is verified
    /// before any record is touched.
    pub async fn handle_gateway_event(
        &self,
        signature_header: Option<&str>,
        body: &[u8],
    ) -> Result<WebhookOutcome, OrchestratorError> {
        let outcome = self.gateway.handle(signature_header, body, Utc::now()).await?;
        Ok(outcome)
    }

    /// Handles a supplier status delivery, already decoded into the
    /// typed payload.
    pub async fn handle_supplier_event(
        &self,
        supplier: &str,
        update: SupplierUpdate,
    ) -> Result<SupplierUpdateOutcome, OrchestratorError> {
        self.orchestrator.apply_supplier_update(supplier, update).await
    }
}
