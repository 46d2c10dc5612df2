// buildrelay-receiver/src/telemetry.rs
// ============================================================================
// Module: Receiver Telemetry
// Description: Observability side channel for push processing outcomes.
// Purpose: Count outcomes without touching the HTTP response path.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every processed push request ends in exactly one outcome, reported here
//! after the response status is already decided. The interface is
//! dependency-light so deployments can plug in their metrics stack.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use serde::Serialize;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Terminal outcome of one processed push request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushOutcome {
    /// The request body was not a valid push envelope.
    MalformedEnvelope,
    /// The payload failed base64 or event decoding and was rejected.
    MalformedPayload,
    /// The payload failed decoding but tolerance acknowledged it.
    ToleratedMalformed,
    /// The event decoded but did not match the filter.
    NoMatch,
    /// The binding table failed to resolve against the event.
    ResolveFailed,
    /// The delivery adapter failed or exceeded its deadline.
    DeliveryFailed,
    /// The event was delivered to the adapter.
    Delivered,
}

// ============================================================================
// SECTION: Telemetry Seam
// ============================================================================

/// Receives one outcome per processed push request.
pub trait ReceiverTelemetry: Send + Sync {
    /// Records the terminal outcome of one request.
    fn on_push_outcome(&self, outcome: PushOutcome);
}

/// Telemetry sink that drops all outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReceiverTelemetry;

impl ReceiverTelemetry for NoopReceiverTelemetry {
    fn on_push_outcome(&self, _outcome: PushOutcome) {}
}

// ============================================================================
// SECTION: Stderr Sink
// ============================================================================

/// Structured outcome record emitted by [`StderrReceiverTelemetry`].
#[derive(Debug, Serialize)]
struct OutcomeRecord {
    /// Record discriminator for log processors.
    kind: &'static str,
    /// Terminal outcome of the request.
    outcome: PushOutcome,
}

/// Telemetry sink that writes JSON lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrReceiverTelemetry;

impl ReceiverTelemetry for StderrReceiverTelemetry {
    fn on_push_outcome(&self, outcome: PushOutcome) {
        let record = OutcomeRecord {
            kind: "push_outcome",
            outcome,
        };
        if let Ok(payload) = serde_json::to_string(&record) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}
