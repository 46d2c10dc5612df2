// buildrelay-filter/tests/eval.rs
// ============================================================================
// Test Module: Filter Evaluation
// Coverage: Determinism, fault recovery, enum names, and membership.
// ============================================================================
//! ## Overview
//! Integration tests for evaluation behavior of compiled filters.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use std::sync::Mutex;

use buildrelay_core::BuildEvent;
use buildrelay_core::BuildStatus;
use buildrelay_filter::EvalFault;
use buildrelay_filter::FilterTelemetry;
use buildrelay_filter::compile;
use support::TestResult;
use support::ensure;

// ========================================================================
// Fixtures
// ========================================================================

/// Builds a representative successful build event.
fn success_event() -> BuildEvent {
    let mut event = BuildEvent {
        id: "build-123".to_string(),
        project_id: "acme-prod".to_string(),
        trigger_id: Some("trigger-9".to_string()),
        status: BuildStatus::Success,
        tags: vec!["release".to_string(), "nightly".to_string()],
        ..BuildEvent::default()
    };
    event.substitutions.insert("_BRANCH".to_string(), "main".to_string());
    event
}

/// Telemetry sink that records every fault it sees.
#[derive(Default)]
struct RecordingTelemetry {
    /// Recorded fault descriptions.
    faults: Mutex<Vec<String>>,
}

impl FilterTelemetry for RecordingTelemetry {
    fn on_eval_fault(&self, _source: &str, fault: &EvalFault) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push(fault.to_string());
        }
    }
}

// ========================================================================
// Tests
// ========================================================================

#[test]
fn status_compares_by_canonical_name() -> TestResult {
    let filter = compile("build.status == \"SUCCESS\"")?;
    ensure(filter.apply(&success_event()), "SUCCESS event matches SUCCESS literal")?;

    let filter = compile("build.status == \"FAILURE\"")?;
    ensure(!filter.apply(&success_event()), "SUCCESS event does not match FAILURE literal")
}

#[test]
fn application_is_deterministic() -> TestResult {
    let filter = compile(
        "build.status == \"SUCCESS\" && build.substitutions['_BRANCH'] == \"main\"",
    )?;
    let event = success_event();
    let first = filter.apply(&event);
    for _ in 0 .. 100 {
        ensure(filter.apply(&event) == first, "repeated application yields the same result")?;
    }
    ensure(first, "the fixture matches the filter")
}

#[test]
fn absent_optional_field_recovers_to_non_match() -> TestResult {
    let filter = compile("build.trigger_id == \"trigger-9\"")?;
    let event = BuildEvent {
        status: BuildStatus::Success,
        ..BuildEvent::default()
    };
    ensure(!filter.apply(&event), "absent trigger id is a non-match, not a crash")
}

#[test]
fn absent_substitution_key_recovers_to_non_match() -> TestResult {
    let filter = compile("build.substitutions['_MISSING'] == \"x\"")?;
    ensure(!filter.apply(&success_event()), "absent key is a non-match, not a crash")
}

#[test]
fn faults_reach_the_telemetry_side_channel() -> TestResult {
    let filter = compile("build.trigger_id == \"trigger-9\"")?;
    let event = BuildEvent::default();
    let telemetry = RecordingTelemetry::default();
    ensure(!filter.apply_traced(&event, &telemetry), "fault downgrades to non-match")?;
    let faults = telemetry.faults.lock().map_err(|_| "poisoned lock")?;
    ensure(faults.len() == 1, "exactly one fault recorded")?;
    ensure(faults[0].contains("trigger_id"), "fault names the absent field")
}

#[test]
fn short_circuit_masks_later_faults() -> TestResult {
    // The left disjunct matches, so the absent trigger id is never touched.
    let filter = compile(
        "build.status == \"SUCCESS\" || build.trigger_id == \"trigger-9\"",
    )?;
    let event = BuildEvent {
        status: BuildStatus::Success,
        ..BuildEvent::default()
    };
    let telemetry = RecordingTelemetry::default();
    ensure(filter.apply_traced(&event, &telemetry), "left disjunct matches")?;
    let faults = telemetry.faults.lock().map_err(|_| "poisoned lock")?;
    ensure(faults.is_empty(), "no fault recorded when short-circuited")
}

#[test]
fn membership_checks_text_lists() -> TestResult {
    let filter = compile("\"release\" in build.tags")?;
    ensure(filter.apply(&success_event()), "tag membership matches")?;

    let filter = compile("\"hotfix\" in build.tags")?;
    ensure(!filter.apply(&success_event()), "missing tag does not match")?;

    let filter = compile("\"release\" in build.images")?;
    ensure(!filter.apply(&success_event()), "membership in an empty list is false")
}

#[test]
fn negation_and_grouping_evaluate_correctly() -> TestResult {
    let filter = compile(
        "!(build.status == \"FAILURE\") && \
         (build.project_id == \"acme-prod\" || build.project_id == \"acme-dev\")",
    )?;
    ensure(filter.apply(&success_event()), "composed expression matches the fixture")
}

#[test]
fn duplicate_evaluation_simulating_redelivery_is_stable() -> TestResult {
    let filter = compile("build.status == \"SUCCESS\"")?;
    let event = success_event();
    let first = filter.apply(&event);
    let second = filter.apply(&event);
    ensure(first == second, "redelivered events evaluate identically")
}
