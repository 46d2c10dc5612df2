// buildrelay-bindings/src/resolver.rs
// ============================================================================
// Module: Binding Resolver
// Description: Compiled substitution table resolved per event.
// Purpose: Turn configured path expressions into flat binding maps.
// Dependencies: buildrelay-core, crate::{error, path}
// ============================================================================

//! ## Overview
//! The resolver table is built once at process start from the notification's
//! substitution map and reused read-only for every subsequent event. Each
//! entry maps a substitution name to a compiled path accessor. Resolution is
//! all-or-nothing: any absent field, out-of-range index, empty projection,
//! or secret store failure aborts the whole call, so callers never see a
//! partial binding map.
//! Invariants:
//! - The table is immutable after construction and safe to share across
//!   concurrent resolutions without locking.
//! - Envelope and path errors surface at compile time, never per event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use buildrelay_core::BuildEvent;
use buildrelay_core::SecretAliases;
use buildrelay_core::SecretFetcher;

use crate::error::CompileError;
use crate::error::ResolveError;
use crate::path::Accessor;
use crate::path::parse;

// ============================================================================
// SECTION: Resolver Table
// ============================================================================

/// Compiled substitution table, reused read-only across events.
#[derive(Debug, Clone, Default)]
pub struct ResolverTable {
    /// Substitution name to compiled accessor, in deterministic order.
    entries: BTreeMap<String, Accessor>,
}

impl ResolverTable {
    /// Compiles a notification's substitution map into a reusable table.
    ///
    /// Every expression must be wrapped in the `$( ... )` envelope; secret
    /// references are bound to their opaque resource names here, so an
    /// undeclared alias fails before the process serves traffic.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] for a malformed envelope, an unparseable
    /// path, an unknown schema field, or an undeclared secret alias.
    pub fn compile(
        substitutions: &BTreeMap<String, String>,
        aliases: &SecretAliases,
    ) -> Result<Self, CompileError> {
        let mut entries = BTreeMap::new();
        for (name, expression) in substitutions {
            let path = strip_envelope(name, expression)?;
            let accessor = parse(name, path, aliases)?;
            entries.insert(name.clone(), accessor);
        }
        Ok(Self {
            entries,
        })
    }

    /// Returns the number of compiled bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the table has no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves every binding against one event.
    ///
    /// Safe to call repeatedly and concurrently against the same table for
    /// different events; the table is never mutated after compilation.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when any binding's data is absent, an index
    /// is out of range, a wildcard matches nothing, or the secret store
    /// fails. The whole call fails; no partial map is returned.
    pub fn resolve(
        &self,
        event: &BuildEvent,
        fetcher: &dyn SecretFetcher,
    ) -> Result<BTreeMap<String, String>, ResolveError> {
        let mut bindings = BTreeMap::new();
        for (name, accessor) in &self.entries {
            let value = accessor.extract(name, event, fetcher)?;
            bindings.insert(name.clone(), value);
        }
        Ok(bindings)
    }
}

// ============================================================================
// SECTION: Envelope Validation
// ============================================================================

/// Strips the mandatory `$( ... )` envelope from one expression.
fn strip_envelope<'a>(name: &str, expression: &'a str) -> Result<&'a str, CompileError> {
    let trimmed = expression.trim();
    let inner = trimmed
        .strip_prefix("$(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| CompileError::MissingEnvelope {
            name: name.to_string(),
            expression: expression.to_string(),
        })?;
    let inner = inner.trim();
    if inner.is_empty() {
        return Err(CompileError::EmptyPath {
            name: name.to_string(),
        });
    }
    Ok(inner)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use super::*;

    #[test]
    fn envelope_is_mandatory() {
        assert!(strip_envelope("_X", "$(build.status)").is_ok());
        assert!(matches!(
            strip_envelope("_X", "build.status"),
            Err(CompileError::MissingEnvelope { .. })
        ));
        assert!(matches!(strip_envelope("_X", "$(  )"), Err(CompileError::EmptyPath { .. })));
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(strip_envelope("_X", "  $( build.id )  ").expect("envelope"), "build.id");
    }
}
