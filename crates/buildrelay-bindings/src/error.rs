// buildrelay-bindings/src/error.rs
// ============================================================================
// Module: Binding Errors
// Description: Compile-time and resolve-time binding failure taxonomy.
// Purpose: Stable error variants for the binding resolver.
// Dependencies: buildrelay-core, thiserror
// ============================================================================

//! ## Overview
//! Binding failures split along the same line as the filter engine: anything
//! detectable from configuration alone fails at compile time, before the
//! process serves traffic; anything that depends on a concrete event or the
//! secret store fails at resolve time. Resolve-time failures are loud by
//! design: a partial or silently-empty binding map could produce a
//! plausible-looking but wrong outbound message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use buildrelay_core::SecretError;
use thiserror::Error;

// ============================================================================
// SECTION: Compile Errors
// ============================================================================

/// Errors raised while compiling substitution path expressions.
///
/// # Invariants
/// - Every variant names the offending substitution so operators can fix
///   the configuration without guessing.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The expression is not wrapped in the `$( ... )` envelope.
    #[error("substitution `{name}`: expression `{expression}` must be wrapped as $( ... )")]
    MissingEnvelope {
        /// Substitution name carrying the malformed expression.
        name: String,
        /// Expression text as configured.
        expression: String,
    },
    /// The envelope is present but wraps nothing.
    #[error("substitution `{name}`: envelope wraps an empty path")]
    EmptyPath {
        /// Substitution name carrying the empty expression.
        name: String,
    },
    /// The path root is neither `build` nor `secrets`.
    #[error("substitution `{name}`: path must start with `build.` or `secrets.`, got `{root}`")]
    UnknownRoot {
        /// Substitution name carrying the bad path.
        name: String,
        /// Root identifier that was found.
        root: String,
    },
    /// The path names an event field that does not exist in the schema.
    #[error("substitution `{name}`: unknown event field `{field}`")]
    UnknownField {
        /// Substitution name carrying the bad path.
        name: String,
        /// Field name that failed schema lookup.
        field: String,
    },
    /// The path names a step field that does not exist in the schema.
    #[error("substitution `{name}`: unknown step field `{field}`")]
    UnknownStepField {
        /// Substitution name carrying the bad path.
        name: String,
        /// Step field name that failed schema lookup.
        field: String,
    },
    /// The path references an undeclared secret alias.
    #[error("substitution `{name}`: {source}")]
    UnknownSecret {
        /// Substitution name carrying the bad reference.
        name: String,
        /// Underlying alias lookup failure.
        source: SecretError,
    },
    /// The path addresses a field in a way its kind does not support.
    #[error("substitution `{name}`: {reason}")]
    KindMismatch {
        /// Substitution name carrying the bad path.
        name: String,
        /// Human-readable mismatch description.
        reason: String,
    },
    /// The path text does not parse.
    #[error("substitution `{name}`: {reason}")]
    Malformed {
        /// Substitution name carrying the bad path.
        name: String,
        /// Human-readable parse failure.
        reason: String,
    },
}

// ============================================================================
// SECTION: Resolve Errors
// ============================================================================

/// Errors raised while resolving a compiled table against one event.
///
/// Any variant aborts the whole `resolve` call; a partial binding map is
/// never returned.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The path's target field is absent on this event.
    #[error("binding `{name}`: field `{field}` is absent on this event")]
    AbsentField {
        /// Binding name being resolved.
        name: String,
        /// Schema field that was absent.
        field: String,
    },
    /// The path's map lookup key is not present on this event.
    #[error("binding `{name}`: key `{key}` is absent from `{field}`")]
    AbsentKey {
        /// Binding name being resolved.
        name: String,
        /// Map field that was addressed.
        field: String,
        /// Key that was not found.
        key: String,
    },
    /// The path's positional index lies outside the list on this event.
    #[error("binding `{name}`: index {index} is out of range for `{field}` (length {length})")]
    IndexOutOfRange {
        /// Binding name being resolved.
        name: String,
        /// List field that was addressed.
        field: String,
        /// Index that was requested.
        index: usize,
        /// Actual list length on this event.
        length: usize,
    },
    /// A wildcard projection yielded zero results.
    #[error("binding `{name}`: wildcard over `{field}` matched nothing")]
    EmptyProjection {
        /// Binding name being resolved.
        name: String,
        /// List field that was projected.
        field: String,
    },
    /// The secret store failed to produce a referenced value.
    #[error("binding `{name}`: secret `{alias}`: {source}")]
    Secret {
        /// Binding name being resolved.
        name: String,
        /// Deployment-local alias as written in the path.
        alias: String,
        /// Underlying secret store failure.
        source: SecretError,
    },
}
