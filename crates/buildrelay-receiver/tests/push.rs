// buildrelay-receiver/tests/push.rs
// ============================================================================
// Test Module: Push Pipeline
// Coverage: End-to-end decode, filter, resolve, deliver, and status mapping.
// ============================================================================
//! ## Overview
//! Integration tests driving the composed receiver with synthetic push
//! envelopes and in-process delivery adapters.

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

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use buildrelay_config::NotifierConfig;
use buildrelay_core::BuildEvent;
use buildrelay_core::DeliveryError;
use buildrelay_core::DeliveryValue;
use buildrelay_core::Notifier;
use buildrelay_core::SecretAliases;
use buildrelay_core::SecretError;
use buildrelay_core::SecretFetcher;
use buildrelay_core::SetUpError;
use buildrelay_receiver::CallbackNotifier;
use buildrelay_receiver::ChannelNotifier;
use buildrelay_receiver::DeliveredMessage;
use buildrelay_receiver::PushOutcome;
use buildrelay_receiver::PushReceiver;
use buildrelay_receiver::ReceiverSettings;
use buildrelay_receiver::ReceiverTelemetry;
use support::TestResult;
use support::ensure;
use tokio::sync::mpsc;

// ========================================================================
// Fixtures
// ========================================================================

/// Secret store that knows no resources.
struct EmptyFetcher;

impl SecretFetcher for EmptyFetcher {
    fn fetch(&self, resource_name: &str) -> Result<String, SecretError> {
        Err(SecretError::Fetch {
            resource: resource_name.to_string(),
            reason: "not found".to_string(),
        })
    }
}

/// Parses a minimal validated configuration with the given filter.
fn config_with_filter(filter: &str) -> TestResult<NotifierConfig> {
    let yaml = format!(
        "apiVersion: buildrelay.dev/v1\n\
         kind: BuildNotifierConfig\n\
         metadata:\n\
         \x20 name: test-relay\n\
         spec:\n\
         \x20 notification:\n\
         \x20   filter: {filter}\n\
         \x20   substitutions:\n\
         \x20     _STATUS: $(build.status)\n"
    );
    let config = NotifierConfig::from_yaml_slice(yaml.as_bytes())?;
    config.validate()?;
    Ok(config)
}

/// Composes a receiver around a channel notifier.
fn channel_receiver(
    filter: &str,
    settings: ReceiverSettings,
) -> TestResult<(PushReceiver, mpsc::Receiver<DeliveredMessage>)> {
    let config = config_with_filter(filter)?;
    let (sender, delivered) = mpsc::channel(8);
    let receiver = PushReceiver::compose(
        &config,
        Box::new(ChannelNotifier::new(sender)),
        Arc::new(EmptyFetcher),
        settings,
    )?;
    Ok((receiver, delivered))
}

/// Wraps a successful-build payload in a valid push envelope body.
fn success_envelope() -> Vec<u8> {
    envelope_with_payload(br#"{"id": "b-1", "projectId": "p", "status": "SUCCESS"}"#)
}

/// Wraps arbitrary payload bytes in a valid push envelope body.
fn envelope_with_payload(payload: &[u8]) -> Vec<u8> {
    let body = serde_json::json!({
        "message": {
            "data": STANDARD.encode(payload),
            "messageId": "m-1",
            "publishTime": "2026-01-01T00:00:00Z"
        },
        "subscription": "projects/p/subscriptions/s"
    });
    body.to_string().into_bytes()
}

// ========================================================================
// Tests
// ========================================================================

#[tokio::test]
async fn matching_event_is_delivered_once_and_acked() -> TestResult {
    let (receiver, mut delivered) =
        channel_receiver("build.status == \"SUCCESS\"", ReceiverSettings::default())?;
    let status = receiver.process_push(&success_envelope()).await;
    ensure(status == StatusCode::OK, "a delivered event is acknowledged")?;

    let message = delivered.try_recv().map_err(|_| "expected one delivery")?;
    ensure(message.event.id == "b-1", "the delivered event is the decoded one")?;
    ensure(
        message.bindings.get("_STATUS").map(String::as_str) == Some("SUCCESS"),
        "bindings are resolved before delivery",
    )?;
    ensure(delivered.try_recv().is_err(), "the adapter is invoked exactly once")
}

#[tokio::test]
async fn non_matching_event_is_consumed_without_delivery() -> TestResult {
    let (receiver, mut delivered) =
        channel_receiver("build.status == \"FAILURE\"", ReceiverSettings::default())?;
    let status = receiver.process_push(&success_envelope()).await;
    ensure(status == StatusCode::OK, "a non-match still consumes the message")?;
    ensure(delivered.try_recv().is_err(), "the adapter is never invoked")
}

#[tokio::test]
async fn malformed_base64_is_nacked_when_tolerance_is_off() -> TestResult {
    let (receiver, mut delivered) =
        channel_receiver("build.status == \"SUCCESS\"", ReceiverSettings::default())?;
    let body = serde_json::json!({
        "message": {"data": "%%%not-base64%%%", "messageId": "m-1"},
        "subscription": "projects/p/subscriptions/s"
    });
    let status = receiver.process_push(body.to_string().as_bytes()).await;
    ensure(status == StatusCode::BAD_REQUEST, "a malformed payload asks for redelivery")?;
    ensure(delivered.try_recv().is_err(), "nothing is delivered")
}

#[tokio::test]
async fn malformed_base64_is_acked_when_tolerance_is_on() -> TestResult {
    let settings = ReceiverSettings {
        tolerate_malformed: true,
        ..ReceiverSettings::default()
    };
    let (receiver, mut delivered) = channel_receiver("build.status == \"SUCCESS\"", settings)?;
    let body = serde_json::json!({
        "message": {"data": "%%%not-base64%%%", "messageId": "m-1"},
        "subscription": "projects/p/subscriptions/s"
    });
    let status = receiver.process_push(body.to_string().as_bytes()).await;
    ensure(status == StatusCode::OK, "tolerance consumes a malformed payload")?;
    ensure(delivered.try_recv().is_err(), "nothing is delivered")
}

#[tokio::test]
async fn malformed_envelope_is_always_nacked() -> TestResult {
    let settings = ReceiverSettings {
        tolerate_malformed: true,
        ..ReceiverSettings::default()
    };
    let (receiver, _delivered) = channel_receiver("build.status == \"SUCCESS\"", settings)?;
    let status = receiver.process_push(br#"{"subscription": "s"}"#).await;
    ensure(
        status == StatusCode::BAD_REQUEST,
        "tolerance covers payloads, not the envelope itself",
    )
}

#[tokio::test]
async fn resolve_failure_is_nacked_without_delivery() -> TestResult {
    let config = {
        let yaml = "apiVersion: buildrelay.dev/v1\n\
                    kind: BuildNotifierConfig\n\
                    metadata:\n\
                    \x20 name: test-relay\n\
                    spec:\n\
                    \x20 notification:\n\
                    \x20   filter: build.status == \"SUCCESS\"\n\
                    \x20   substitutions:\n\
                    \x20     _FOO: $(build.substitutions['MISSING'])\n";
        let config = NotifierConfig::from_yaml_slice(yaml.as_bytes())?;
        config.validate()?;
        config
    };
    let (sender, mut delivered) = mpsc::channel(8);
    let receiver = PushReceiver::compose(
        &config,
        Box::new(ChannelNotifier::new(sender)),
        Arc::new(EmptyFetcher),
        ReceiverSettings::default(),
    )?;
    let status = receiver.process_push(&success_envelope()).await;
    ensure(status == StatusCode::BAD_GATEWAY, "an unresolvable binding asks for redelivery")?;
    ensure(delivered.try_recv().is_err(), "no partial delivery happens")
}

#[tokio::test]
async fn delivery_failure_is_nacked() -> TestResult {
    let config = config_with_filter("build.status == \"SUCCESS\"")?;
    let notifier =
        CallbackNotifier::new(|_, _| Err(DeliveryError::Failed("destination down".to_string())));
    let receiver = PushReceiver::compose(
        &config,
        Box::new(notifier),
        Arc::new(EmptyFetcher),
        ReceiverSettings::default(),
    )?;
    let status = receiver.process_push(&success_envelope()).await;
    ensure(status == StatusCode::BAD_GATEWAY, "a failed delivery asks for redelivery")
}

/// Adapter whose send never completes within any test deadline.
struct StalledNotifier;

#[async_trait]
impl Notifier for StalledNotifier {
    fn set_up(
        &mut self,
        _delivery: &BTreeMap<String, DeliveryValue>,
        _aliases: &SecretAliases,
        _fetcher: &dyn SecretFetcher,
    ) -> Result<(), SetUpError> {
        Ok(())
    }

    async fn send(
        &self,
        _event: &BuildEvent,
        _bindings: &BTreeMap<String, String>,
    ) -> Result<(), DeliveryError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn delivery_deadline_is_enforced() -> TestResult {
    let config = config_with_filter("build.status == \"SUCCESS\"")?;
    let settings = ReceiverSettings {
        delivery_timeout: Duration::from_millis(50),
        ..ReceiverSettings::default()
    };
    let receiver =
        PushReceiver::compose(&config, Box::new(StalledNotifier), Arc::new(EmptyFetcher), settings)?;
    let status = receiver.process_push(&success_envelope()).await;
    ensure(status == StatusCode::BAD_GATEWAY, "a stalled delivery is cut off and nacked")
}

#[tokio::test]
async fn duplicate_redelivery_yields_identical_results() -> TestResult {
    let (receiver, mut delivered) =
        channel_receiver("build.status == \"SUCCESS\"", ReceiverSettings::default())?;
    let body = success_envelope();
    let first = receiver.process_push(&body).await;
    let second = receiver.process_push(&body).await;
    ensure(first == StatusCode::OK && second == StatusCode::OK, "both deliveries are acked")?;

    let one = delivered.try_recv().map_err(|_| "first delivery missing")?;
    let two = delivered.try_recv().map_err(|_| "second delivery missing")?;
    ensure(one.event == two.event, "duplicate deliveries carry identical events")?;
    ensure(one.bindings == two.bindings, "duplicate deliveries carry identical bindings")
}

/// Telemetry sink that records every outcome it sees.
#[derive(Default)]
struct RecordingTelemetry {
    /// Recorded outcomes in arrival order.
    outcomes: Mutex<Vec<PushOutcome>>,
}

impl ReceiverTelemetry for RecordingTelemetry {
    fn on_push_outcome(&self, outcome: PushOutcome) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push(outcome);
        }
    }
}

#[tokio::test]
async fn outcomes_reach_the_telemetry_side_channel() -> TestResult {
    let (receiver, _delivered) =
        channel_receiver("build.status == \"FAILURE\"", ReceiverSettings::default())?;
    let telemetry = Arc::new(RecordingTelemetry::default());
    let receiver = receiver.with_telemetry(
        Arc::new(buildrelay_filter::NoopFilterTelemetry),
        Arc::clone(&telemetry) as Arc<dyn ReceiverTelemetry>,
    );
    let status = receiver.process_push(&success_envelope()).await;
    ensure(status == StatusCode::OK, "a non-match is acked")?;
    let outcomes = telemetry.outcomes.lock().map_err(|_| "poisoned lock")?;
    ensure(
        outcomes.len() == 1 && outcomes[0] == PushOutcome::NoMatch,
        "the outcome is recorded",
    )
}
