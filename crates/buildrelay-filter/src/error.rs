// buildrelay-filter/src/error.rs
// ============================================================================
// Module: Filter Errors
// Description: Compile-time and evaluation-time failure types.
// Purpose: Separate fatal compile errors from recoverable eval faults.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`CompileError`] values are fatal at startup and carry the offending
//! position in the expression text. [`EvalFault`] values are recovered to a
//! non-match by [`crate::CompiledFilter::apply`] and only reach operators
//! through the telemetry side channel.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Compile Errors
// ============================================================================

/// Errors raised while compiling a filter expression.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Every variant is fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Expression was empty or contained only whitespace.
    #[error("filter expression is empty")]
    EmptyExpression,
    /// Expression exceeded the input size limit.
    #[error("filter expression exceeds {max_bytes} bytes")]
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
    },
    /// Expression nesting exceeded the depth limit.
    #[error("filter nesting exceeds depth {max_depth} at byte {position}")]
    NestingTooDeep {
        /// Maximum allowed nesting depth.
        max_depth: usize,
        /// Byte offset in the expression.
        position: usize,
    },
    /// Unexpected token during parsing.
    #[error("unexpected token `{found}` at byte {position}, expected {expected}")]
    UnexpectedToken {
        /// Human-friendly expectation summary.
        expected: &'static str,
        /// Token that was actually seen.
        found: String,
        /// Byte offset in the expression.
        position: usize,
    },
    /// Unterminated string literal.
    #[error("unterminated string literal starting at byte {position}")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        position: usize,
    },
    /// Field name not present in the build-event schema.
    #[error("unknown field `{name}` at byte {position}")]
    UnknownField {
        /// Unresolved field name.
        name: String,
        /// Byte offset in the expression.
        position: usize,
    },
    /// Status literal compared against `build.status` is not a known status.
    #[error("`{literal}` is not a build status canonical name (at byte {position})")]
    UnknownStatus {
        /// Offending literal text.
        literal: String,
        /// Byte offset in the expression.
        position: usize,
    },
    /// Field used in a position its kind does not allow.
    #[error("field `{name}` cannot be used here: {reason} (at byte {position})")]
    KindMismatch {
        /// Field name.
        name: String,
        /// Why the usage is invalid.
        reason: &'static str,
        /// Byte offset in the expression.
        position: usize,
    },
    /// Expression result does not type as boolean.
    #[error("filter expression must evaluate to a boolean")]
    NotBoolean,
    /// Trailing input after a complete expression.
    #[error("unexpected trailing input at byte {position}")]
    TrailingInput {
        /// Byte offset where trailing input begins.
        position: usize,
    },
}

// ============================================================================
// SECTION: Evaluation Faults
// ============================================================================

/// Recoverable faults raised while evaluating a compiled filter.
///
/// A fault never propagates to the push pipeline; it downgrades the
/// evaluation to a non-match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalFault {
    /// A referenced optional field is absent on this event.
    #[error("field `{0}` is absent on this event")]
    AbsentField(String),
    /// A referenced substitution key is absent on this event.
    #[error("substitution key `{0}` is absent on this event")]
    AbsentKey(String),
}
