// buildrelay-receiver/src/receiver.rs
// ============================================================================
// Module: Push Receiver Pipeline
// Description: Per-request state machine from envelope to response status.
// Purpose: Decode, filter, resolve, deliver, and map the result.
// Dependencies: buildrelay-{bindings, config, core, filter}, axum, tokio
// ============================================================================

//! ## Overview
//! The receiver is stateless across requests: each inbound push walks the
//! same pipeline (envelope decode, payload decode, filter, binding
//! resolution, adapter delivery) and every exit maps to exactly one HTTP
//! status. A 2xx acknowledges the message; anything else asks the bus to
//! redeliver, so the mapping decides retry behavior.
//! Invariants:
//! - Compiled state (filter, binding table, adapter) is built once at
//!   composition time and shared read-only across concurrent requests.
//! - Outcomes reach telemetry after the status is decided; telemetry can
//!   never change a response.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::StatusCode;
use buildrelay_bindings::ResolverTable;
use buildrelay_config::NotifierConfig;
use buildrelay_core::BuildEvent;
use buildrelay_core::DeliveryError;
use buildrelay_core::Notifier;
use buildrelay_core::SecretFetcher;
use buildrelay_core::SetUpError;
use buildrelay_filter::CompiledFilter;
use buildrelay_filter::FilterTelemetry;
use buildrelay_filter::NoopFilterTelemetry;
use thiserror::Error;

use crate::envelope::PushEnvelope;
use crate::settings::ReceiverSettings;
use crate::telemetry::NoopReceiverTelemetry;
use crate::telemetry::PushOutcome;
use crate::telemetry::ReceiverTelemetry;

// ============================================================================
// SECTION: Composition Errors
// ============================================================================

/// Errors raised while composing a receiver from validated configuration.
///
/// Any variant is fatal: the process must not serve traffic with a
/// partially-composed pipeline.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The filter expression failed to compile.
    #[error("filter does not compile: {0}")]
    Filter(#[from] buildrelay_filter::CompileError),
    /// A substitution path expression failed to compile.
    #[error("substitutions do not compile: {0}")]
    Bindings(#[from] buildrelay_bindings::CompileError),
    /// The delivery adapter rejected its configuration.
    #[error("delivery adapter set-up failed: {0}")]
    Adapter(#[from] SetUpError),
}

// ============================================================================
// SECTION: Push Receiver
// ============================================================================

/// Composed push pipeline shared read-only across requests.
pub struct PushReceiver {
    /// Compiled filter applied to every decoded event.
    filter: CompiledFilter,
    /// Compiled substitution table resolved per matched event.
    table: ResolverTable,
    /// Delivery adapter, set up once during composition.
    notifier: Box<dyn Notifier>,
    /// Secret store consulted during binding resolution.
    secrets: Arc<dyn SecretFetcher>,
    /// Behavioral settings fixed at composition time.
    settings: ReceiverSettings,
    /// Side channel for recovered filter faults.
    filter_telemetry: Arc<dyn FilterTelemetry>,
    /// Side channel for per-request outcomes.
    telemetry: Arc<dyn ReceiverTelemetry>,
}

impl PushReceiver {
    /// Composes a receiver from validated configuration and collaborators.
    ///
    /// Compiles the filter and the substitution table, then runs the
    /// adapter's one-time set-up against the delivery parameters. Telemetry
    /// defaults to no-op sinks; see [`PushReceiver::with_telemetry`].
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError`] when any compilation or the adapter set-up
    /// fails; the caller must treat this as fatal.
    pub fn compose(
        config: &NotifierConfig,
        mut notifier: Box<dyn Notifier>,
        secrets: Arc<dyn SecretFetcher>,
        settings: ReceiverSettings,
    ) -> Result<Self, ComposeError> {
        let notification = &config.spec.notification;
        let aliases = config.secret_aliases();
        let filter = buildrelay_filter::compile(&notification.filter)?;
        let table = ResolverTable::compile(&notification.substitutions, &aliases)?;
        notifier.set_up(&notification.delivery, &aliases, secrets.as_ref())?;
        Ok(Self {
            filter,
            table,
            notifier,
            secrets,
            settings,
            filter_telemetry: Arc::new(NoopFilterTelemetry),
            telemetry: Arc::new(NoopReceiverTelemetry),
        })
    }

    /// Replaces the no-op telemetry sinks.
    #[must_use]
    pub fn with_telemetry(
        mut self,
        filter_telemetry: Arc<dyn FilterTelemetry>,
        telemetry: Arc<dyn ReceiverTelemetry>,
    ) -> Self {
        self.filter_telemetry = filter_telemetry;
        self.telemetry = telemetry;
        self
    }

    /// Processes one inbound push request body into a response status.
    ///
    /// A 2xx status acknowledges the message to the bus; 4xx and 5xx ask
    /// for redelivery. The method never panics and never returns early
    /// without recording an outcome.
    pub async fn process_push(&self, body: &[u8]) -> StatusCode {
        let (status, outcome) = self.run_pipeline(body).await;
        self.telemetry.on_push_outcome(outcome);
        status
    }

    /// Walks the decode → filter → resolve → deliver pipeline.
    async fn run_pipeline(&self, body: &[u8]) -> (StatusCode, PushOutcome) {
        let envelope = match PushEnvelope::from_json_slice(body) {
            Ok(envelope) => envelope,
            Err(_) => return (StatusCode::BAD_REQUEST, PushOutcome::MalformedEnvelope),
        };
        let payload = match envelope.decoded_data() {
            Ok(payload) => payload,
            Err(_) => return self.malformed_payload(),
        };
        let event = match BuildEvent::from_json_slice(&payload) {
            Ok(event) => event.with_decorated_log_url(&self.settings.utm_medium),
            Err(_) => return self.malformed_payload(),
        };
        if !self.filter.apply_traced(&event, self.filter_telemetry.as_ref()) {
            return (StatusCode::OK, PushOutcome::NoMatch);
        }
        let bindings = match self.table.resolve(&event, self.secrets.as_ref()) {
            Ok(bindings) => bindings,
            Err(_) => return (StatusCode::BAD_GATEWAY, PushOutcome::ResolveFailed),
        };
        match self.deliver(&event, &bindings).await {
            Ok(()) => (StatusCode::OK, PushOutcome::Delivered),
            Err(_) => (StatusCode::BAD_GATEWAY, PushOutcome::DeliveryFailed),
        }
    }

    /// Maps a payload decode failure according to the tolerance setting.
    const fn malformed_payload(&self) -> (StatusCode, PushOutcome) {
        if self.settings.tolerate_malformed {
            (StatusCode::OK, PushOutcome::ToleratedMalformed)
        } else {
            (StatusCode::BAD_REQUEST, PushOutcome::MalformedPayload)
        }
    }

    /// Runs one adapter send under the configured deadline.
    async fn deliver(
        &self,
        event: &BuildEvent,
        bindings: &BTreeMap<String, String>,
    ) -> Result<(), DeliveryError> {
        tokio::time::timeout(self.settings.delivery_timeout, self.notifier.send(event, bindings))
            .await
            .map_err(|_| DeliveryError::Timeout)?
    }
}
