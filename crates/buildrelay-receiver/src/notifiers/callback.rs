// buildrelay-receiver/src/notifiers/callback.rs
// ============================================================================
// Module: Callback Notifier
// Description: Callback-based delivery adapter for tests and embedding.
// Purpose: Invoke a user-provided function with matched events.
// Dependencies: buildrelay-core, async-trait, std
// ============================================================================

//! ## Overview
//! [`CallbackNotifier`] delivers matched events by invoking a user-supplied
//! function, propagating its result as the delivery outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use buildrelay_core::BuildEvent;
use buildrelay_core::DeliveryError;
use buildrelay_core::DeliveryValue;
use buildrelay_core::Notifier;
use buildrelay_core::SecretAliases;
use buildrelay_core::SecretFetcher;
use buildrelay_core::SetUpError;

// ============================================================================
// SECTION: Callback Notifier
// ============================================================================

/// Callback handler signature used by the notifier.
type CallbackHandler =
    dyn Fn(&BuildEvent, &BTreeMap<String, String>) -> Result<(), DeliveryError> + Send + Sync;

/// Callback-based delivery adapter.
#[derive(Clone)]
pub struct CallbackNotifier {
    /// Handler invoked with the event and resolved bindings.
    handler: Arc<CallbackHandler>,
}

impl CallbackNotifier {
    /// Creates a callback notifier from a handler function.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&BuildEvent, &BTreeMap<String, String>) -> Result<(), DeliveryError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }
}

#[async_trait]
impl Notifier for CallbackNotifier {
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
        (self.handler)(event, bindings)
    }
}
