// buildrelay-receiver/src/notifiers/mod.rs
// ============================================================================
// Module: Reference Notifiers
// Description: Delivery adapters used for composition and tests.
// Purpose: Provide log, channel, and callback adapter variants.
// Dependencies: crate::notifiers::{callback, channel, log}
// ============================================================================

//! ## Overview
//! These adapters implement the delivery seam without talking to a real
//! destination: the log notifier records deliveries as JSON lines, the
//! channel notifier hands them to an in-process consumer, and the callback
//! notifier invokes a user-supplied function. All three validate nothing at
//! set-up; destination-specific adapters own their own `delivery` schema.

// ============================================================================
// SECTION: Submodules
// ============================================================================

mod callback;
mod channel;
mod log;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use callback::CallbackNotifier;
pub use channel::ChannelNotifier;
pub use channel::DeliveredMessage;
pub use log::LogNotifier;
