// buildrelay-receiver/src/notifiers/channel.rs
// ============================================================================
// Module: Channel Notifier
// Description: Channel-based delivery adapter for in-process consumers.
// Purpose: Hand matched events to a Tokio mpsc receiver.
// Dependencies: buildrelay-core, async-trait, tokio
// ============================================================================

//! ## Overview
//! [`ChannelNotifier`] delivers matched events by sending
//! [`DeliveredMessage`] values into a `tokio::sync::mpsc` channel.
//! Invariants:
//! - Each successful delivery enqueues exactly one message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use async_trait::async_trait;
use buildrelay_core::BuildEvent;
use buildrelay_core::DeliveryError;
use buildrelay_core::DeliveryValue;
use buildrelay_core::Notifier;
use buildrelay_core::SecretAliases;
use buildrelay_core::SecretFetcher;
use buildrelay_core::SetUpError;
use tokio::sync::mpsc::Sender;

// ============================================================================
// SECTION: Delivered Message
// ============================================================================

/// One delivered event with its resolved binding map.
#[derive(Debug, Clone)]
pub struct DeliveredMessage {
    /// Matched build event.
    pub event: BuildEvent,
    /// Resolved substitution bindings.
    pub bindings: BTreeMap<String, String>,
}

// ============================================================================
// SECTION: Channel Notifier
// ============================================================================

/// Channel-based delivery adapter.
#[derive(Debug)]
pub struct ChannelNotifier {
    /// Sender used to hand off delivered messages.
    sender: Sender<DeliveredMessage>,
}

impl ChannelNotifier {
    /// Creates a channel notifier over an mpsc sender.
    #[must_use]
    pub const fn new(sender: Sender<DeliveredMessage>) -> Self {
        Self {
            sender,
        }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
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
        event: &BuildEvent,
        bindings: &BTreeMap<String, String>,
    ) -> Result<(), DeliveryError> {
        let message = DeliveredMessage {
            event: event.clone(),
            bindings: bindings.clone(),
        };
        self.sender.try_send(message).map_err(|err| DeliveryError::Failed(err.to_string()))
    }
}
