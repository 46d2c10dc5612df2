// buildrelay-config/src/lib.rs
// ============================================================================
// Module: Buildrelay Configuration Root
// Description: Public API surface for notification configuration.
// Purpose: Wire together the strict config model and its validation.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! One configuration document describes one deployment of the relay: the
//! filter expression, the adapter-specific delivery mapping, the named
//! substitution paths, and the secret alias table. Decoding is strict and
//! fail-closed: unknown fields anywhere in the document are rejected so a
//! typo in deployed configuration cannot be silently ignored.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::Metadata;
pub use config::Notification;
pub use config::NotifierConfig;
pub use config::NotifierSpec;
pub use config::SecretEntry;
pub use config::SUPPORTED_API_VERSIONS;
