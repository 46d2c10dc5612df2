// buildrelay-receiver/src/notifiers/log.rs
// ============================================================================
// Module: Log Notifier
// Description: Log-only delivery adapter for audit-grade records.
// Purpose: Record deliveries as JSON lines without an outbound send.
// Dependencies: buildrelay-core, async-trait, serde_json
// ============================================================================

//! ## Overview
//! `LogNotifier` writes one JSON record per matched event and performs no
//! external delivery. Binding values are recorded verbatim; do not route
//! secret-bearing substitutions through this adapter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use buildrelay_core::BuildEvent;
use buildrelay_core::DeliveryError;
use buildrelay_core::DeliveryValue;
use buildrelay_core::Notifier;
use buildrelay_core::SecretAliases;
use buildrelay_core::SecretFetcher;
use buildrelay_core::SetUpError;
use serde_json::json;

// ============================================================================
// SECTION: Log Notifier
// ============================================================================

/// Log-only delivery adapter.
pub struct LogNotifier<W: Write + Send> {
    /// Output writer for delivery records.
    writer: Mutex<W>,
}

impl<W: Write + Send> LogNotifier<W> {
    /// Creates a log notifier over a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

#[async_trait]
impl<W: Write + Send> Notifier for LogNotifier<W> {
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
        let record = json!({
            "kind": "delivery",
            "build_id": event.id,
            "project_id": event.project_id,
            "status": event.status.as_str(),
            "bindings": bindings,
        });
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| DeliveryError::Failed("log writer mutex poisoned".to_string()))?;
        serde_json::to_writer(&mut *guard, &record)
            .map_err(|err| DeliveryError::Failed(err.to_string()))?;
        writeln!(&mut *guard).map_err(|err| DeliveryError::Failed(err.to_string()))
    }
}
