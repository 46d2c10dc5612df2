// buildrelay-core/src/interfaces.rs
// ============================================================================
// Module: Core Interface Seams
// Description: Traits that keep external collaborators behind seams.
// Purpose: Define the delivery adapter and secret store contracts.
// Dependencies: async-trait, thiserror, crate::{delivery, event}
// ============================================================================

//! ## Overview
//! The relay core talks to two external collaborators: a delivery adapter
//! that turns matched events into outbound messages, and a secret store
//! that resolves opaque resource names into secret material. Both live
//! behind traits so the pipeline can be composed and tested without
//! network access.
//! Invariants:
//! - `Notifier::set_up` runs once at process start and fails fast; the
//!   process must not serve traffic after a set-up failure.
//! - Secret material never appears in error messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::delivery::DeliveryValue;
use crate::event::BuildEvent;

// ============================================================================
// SECTION: Secret Errors
// ============================================================================

/// Errors returned while resolving secret material.
///
/// # Invariants
/// - Variants carry names and reasons only, never secret values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// A deployment-local alias was not declared in the configuration.
    #[error("unknown secret alias: {0}")]
    UnknownAlias(String),
    /// The secret store failed to produce a value.
    #[error("secret fetch failed for {resource}: {reason}")]
    Fetch {
        /// Opaque resource name that was requested.
        resource: String,
        /// Store-reported failure reason.
        reason: String,
    },
}

// ============================================================================
// SECTION: Secret Store Seam
// ============================================================================

/// Fetches secret material from an opaque external store.
///
/// Implementations are expected to be safe for concurrent use; the relay
/// may resolve secrets for many in-flight events at once.
pub trait SecretFetcher: Send + Sync {
    /// Fetches the secret value stored under an opaque resource name.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError`] when the resource is unknown or the store is
    /// unavailable.
    fn fetch(&self, resource_name: &str) -> Result<String, SecretError>;
}

/// Deployment-local secret aliases mapped to opaque resource names.
///
/// # Invariants
/// - Alias names are unique; the configuration layer enforces this before
///   construction.
#[derive(Debug, Clone, Default)]
pub struct SecretAliases {
    /// Alias name to resource name mapping.
    map: BTreeMap<String, String>,
}

impl SecretAliases {
    /// Builds an alias table from validated `(alias, resource)` pairs.
    #[must_use]
    pub const fn new(map: BTreeMap<String, String>) -> Self {
        Self {
            map,
        }
    }

    /// Returns the resource name for an alias.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::UnknownAlias`] for undeclared aliases; an
    /// unknown alias is a hard error, never a default.
    pub fn resource(&self, alias: &str) -> Result<&str, SecretError> {
        self.map
            .get(alias)
            .map(String::as_str)
            .ok_or_else(|| SecretError::UnknownAlias(alias.to_string()))
    }

    /// Resolves an alias all the way to its secret value.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError`] when the alias is undeclared or the fetch
    /// fails.
    pub fn value(&self, alias: &str, fetcher: &dyn SecretFetcher) -> Result<String, SecretError> {
        fetcher.fetch(self.resource(alias)?)
    }
}

// ============================================================================
// SECTION: Delivery Adapter Errors
// ============================================================================

/// Errors returned by [`Notifier::set_up`].
///
/// # Invariants
/// - Set-up failures are fatal at startup.
#[derive(Debug, Error)]
pub enum SetUpError {
    /// A required delivery field is absent.
    #[error("delivery config is missing required field `{0}`")]
    MissingField(String),
    /// A delivery field is present but malformed.
    #[error("delivery field `{field}` is invalid: {reason}")]
    InvalidField {
        /// Offending delivery key.
        field: String,
        /// Human-readable reason.
        reason: String,
    },
    /// Secret resolution failed during set-up.
    #[error(transparent)]
    Secret(#[from] SecretError),
}

/// Errors returned by [`Notifier::send`].
///
/// Any variant is treated by the push receiver as a delivery failure and
/// mapped to a negative-acknowledge status so the bus redelivers.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The destination rejected or failed the send.
    #[error("delivery failed: {0}")]
    Failed(String),
    /// The send did not complete within the request deadline.
    #[error("delivery timed out")]
    Timeout,
}

// ============================================================================
// SECTION: Delivery Adapter Seam
// ============================================================================

/// Pluggable delivery adapter for one destination.
///
/// One adapter variant is selected at process composition time; the core
/// never inspects adapter types at runtime.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Validates destination-specific delivery fields once at process start.
    ///
    /// # Errors
    ///
    /// Returns [`SetUpError`] when required fields are absent or malformed;
    /// the process must fail fast and not serve traffic.
    fn set_up(
        &mut self,
        delivery: &BTreeMap<String, DeliveryValue>,
        aliases: &SecretAliases,
        fetcher: &dyn SecretFetcher,
    ) -> Result<(), SetUpError>;

    /// Sends one matched event with its resolved binding map.
    ///
    /// The relay tolerates duplicate sends (at-least-once bus semantics);
    /// adapters should be idempotent where their destination allows it.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the destination send fails; the
    /// receiver maps this to a redeliverable status.
    async fn send(
        &self,
        event: &BuildEvent,
        bindings: &BTreeMap<String, String>,
    ) -> Result<(), DeliveryError>;
}
