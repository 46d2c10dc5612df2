// buildrelay-filter/src/lib.rs
// ============================================================================
// Module: Event Filter Root
// Description: Public API surface for the compiled event filter.
// Purpose: Wire together lexing, compilation, evaluation, and telemetry.
// Dependencies: crate::{compile, error, expr, lexer, telemetry}
// ============================================================================

//! ## Overview
//! The filter engine compiles a boolean expression string against the fixed
//! build-event schema into a [`CompiledFilter`], once at setup time. The
//! compiled filter is then applied to every subsequent event.
//! Invariants:
//! - Compilation deterministically fails when the expression does not type
//!   as boolean; this is never deferred to evaluation time.
//! - `apply` never raises: any runtime evaluation fault is recovered to a
//!   non-match and surfaced only through the telemetry side channel.
//! - Application is a pure function of `(filter, event)`.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod compile;
pub mod error;
pub mod expr;
mod lexer;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use compile::CompiledFilter;
pub use compile::compile;
pub use error::CompileError;
pub use error::EvalFault;
pub use telemetry::FilterTelemetry;
pub use telemetry::NoopFilterTelemetry;
pub use telemetry::StderrFilterTelemetry;
