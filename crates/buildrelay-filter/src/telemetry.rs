// buildrelay-filter/src/telemetry.rs
// ============================================================================
// Module: Filter Telemetry
// Description: Observability side channel for filter evaluation faults.
// Purpose: Surface recovered faults without touching the request path.
// Dependencies: serde, serde_json, crate::error
// ============================================================================

//! ## Overview
//! Evaluation faults are recovered to a non-match and must never fail the
//! push pipeline; this module is the only way they reach operators. The
//! interface is intentionally dependency-light so deployments can plug in
//! their metrics stack without redesign.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use serde::Serialize;

use crate::error::EvalFault;

// ============================================================================
// SECTION: Telemetry Seam
// ============================================================================

/// Receives recovered filter evaluation faults.
pub trait FilterTelemetry: Send + Sync {
    /// Records one recovered fault for the given filter source text.
    fn on_eval_fault(&self, source: &str, fault: &EvalFault);
}

/// Telemetry sink that drops all faults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFilterTelemetry;

impl FilterTelemetry for NoopFilterTelemetry {
    fn on_eval_fault(&self, _source: &str, _fault: &EvalFault) {}
}

// ============================================================================
// SECTION: Stderr Sink
// ============================================================================

/// Structured fault record emitted by [`StderrFilterTelemetry`].
#[derive(Debug, Serialize)]
struct FaultRecord<'a> {
    /// Record discriminator for log processors.
    kind: &'static str,
    /// Filter source text that faulted.
    filter: &'a str,
    /// Human-readable fault description.
    fault: String,
}

/// Telemetry sink that writes JSON lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrFilterTelemetry;

impl FilterTelemetry for StderrFilterTelemetry {
    fn on_eval_fault(&self, source: &str, fault: &EvalFault) {
        let record = FaultRecord {
            kind: "filter_eval_fault",
            filter: source,
            fault: fault.to_string(),
        };
        if let Ok(payload) = serde_json::to_string(&record) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}
