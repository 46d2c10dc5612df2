// buildrelay-cli/src/lib.rs
// ============================================================================
// Module: CLI Library Root
// Description: Reusable composition pieces behind the relay binary.
// Purpose: Expose config sources, the env secret store, and the HTTP adapter.
// Dependencies: crate::{http_notifier, secrets, source}
// ============================================================================

//! ## Overview
//! The binary in `main.rs` wires these pieces together: a scheme-keyed
//! configuration fetch, an environment-backed secret store, and the generic
//! HTTP delivery adapter. They live in the library crate so integration
//! tests can exercise them directly.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod http_notifier;
pub mod secrets;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http_notifier::HttpNotifier;
pub use secrets::EnvSecretFetcher;
pub use source::ConfigSource;
pub use source::FileSource;
pub use source::HttpSource;
pub use source::SourceError;
pub use source::fetch_config;
