// buildrelay-core/src/lib.rs
// ============================================================================
// Module: Buildrelay Core Root
// Description: Public API surface for the relay data model and seams.
// Purpose: Wire together the build event model, schema table, and interfaces.
// Dependencies: crate::{event, interfaces, schema}
// ============================================================================

//! ## Overview
//! This crate holds the shared vocabulary of the relay: the immutable
//! [`BuildEvent`] snapshot, the fixed field schema the filter and binding
//! engines compile against, and the interface traits that keep delivery
//! adapters and secret stores behind seams.
//! Invariants:
//! - `BuildEvent` values are never mutated after construction; derived
//!   variants (log-URL decoration) produce new values.
//! - The schema table is a compile-time constant; engines never discover
//!   fields dynamically.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod delivery;
pub mod event;
pub mod interfaces;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use delivery::DeliveryValue;
pub use event::BuildEvent;
pub use event::BuildStatus;
pub use event::BuildStep;
pub use event::UTM_CAMPAIGN;
pub use interfaces::DeliveryError;
pub use interfaces::Notifier;
pub use interfaces::SecretAliases;
pub use interfaces::SecretError;
pub use interfaces::SecretFetcher;
pub use interfaces::SetUpError;
pub use schema::EventField;
pub use schema::StepField;
pub use schema::ValueKind;
