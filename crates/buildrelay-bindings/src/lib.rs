// buildrelay-bindings/src/lib.rs
// ============================================================================
// Module: Binding Resolver Root
// Description: Public API surface for the compiled binding resolver.
// Purpose: Wire together envelope validation, path parsing, and resolution.
// Dependencies: crate::{error, path, resolver}
// ============================================================================

//! ## Overview
//! The binding resolver compiles a notification's named path expressions
//! into a [`ResolverTable`], once at setup time. Each event that matches
//! the filter is then resolved against the table into a flat string-keyed
//! binding map handed to the delivery adapter.
//! Invariants:
//! - Envelope, path, and secret-alias errors surface at compile time.
//! - Resolution is fail-loud: absent data aborts the whole call, and a
//!   partial binding map is never returned.
//! - The compiled table is immutable and shared read-only across events.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod error;
mod path;
pub mod resolver;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::CompileError;
pub use error::ResolveError;
pub use resolver::ResolverTable;
