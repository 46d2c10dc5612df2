// buildrelay-receiver/src/lib.rs
// ============================================================================
// Module: Push Receiver Root
// Description: Public API surface for the push-subscription receiver.
// Purpose: Wire together envelope decoding, the pipeline, and the server.
// Dependencies: crate::{envelope, notifiers, receiver, server, settings,
//               telemetry}
// ============================================================================

//! ## Overview
//! The receiver accepts bus push requests over HTTP, decodes the wrapped
//! build event, applies the compiled filter, resolves bindings, and hands
//! matched events to the configured delivery adapter. The response status
//! encodes acknowledgment: 2xx consumes the message, anything else asks
//! the bus to redeliver.
//! Invariants:
//! - All compiled state is built at composition time and shared read-only.
//! - No ordering guarantees across concurrent requests; duplicates are
//!   processed identically (at-least-once bus semantics).

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod envelope;
pub mod notifiers;
pub mod receiver;
pub mod server;
pub mod settings;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use envelope::EnvelopeError;
pub use envelope::PushEnvelope;
pub use envelope::PushMessage;
pub use notifiers::CallbackNotifier;
pub use notifiers::ChannelNotifier;
pub use notifiers::DeliveredMessage;
pub use notifiers::LogNotifier;
pub use receiver::ComposeError;
pub use receiver::PushReceiver;
pub use server::ServeError;
pub use server::router;
pub use server::serve;
pub use settings::ReceiverSettings;
pub use telemetry::NoopReceiverTelemetry;
pub use telemetry::PushOutcome;
pub use telemetry::ReceiverTelemetry;
pub use telemetry::StderrReceiverTelemetry;
