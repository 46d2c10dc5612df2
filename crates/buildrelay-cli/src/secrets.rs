// buildrelay-cli/src/secrets.rs
// ============================================================================
// Module: Environment Secret Fetcher
// Description: Secret store backed by process environment variables.
// Purpose: Resolve opaque resource names without a network secret store.
// Dependencies: buildrelay-core, std
// ============================================================================

//! ## Overview
//! [`EnvSecretFetcher`] maps each opaque resource name to an environment
//! variable: the name is uppercased, every byte outside `[A-Z0-9]` becomes
//! `_`, and the result is prefixed with `BUILDRELAY_SECRET_`. The resource
//! `projects/p/secrets/db/versions/1` therefore reads
//! `BUILDRELAY_SECRET_PROJECTS_P_SECRETS_DB_VERSIONS_1`.
//! Invariants:
//! - An unset variable is a fetch failure, never an empty value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use buildrelay_core::SecretError;
use buildrelay_core::SecretFetcher;

// ============================================================================
// SECTION: Environment Fetcher
// ============================================================================

/// Environment variable prefix for secret material.
const SECRET_ENV_PREFIX: &str = "BUILDRELAY_SECRET_";

/// Secret store backed by process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretFetcher;

impl EnvSecretFetcher {
    /// Maps a resource name to its environment variable name.
    #[must_use]
    pub fn variable_name(resource_name: &str) -> String {
        let mut name = String::with_capacity(SECRET_ENV_PREFIX.len() + resource_name.len());
        name.push_str(SECRET_ENV_PREFIX);
        for ch in resource_name.chars() {
            if ch.is_ascii_alphanumeric() {
                name.push(ch.to_ascii_uppercase());
            } else {
                name.push('_');
            }
        }
        name
    }
}

impl SecretFetcher for EnvSecretFetcher {
    fn fetch(&self, resource_name: &str) -> Result<String, SecretError> {
        let variable = Self::variable_name(resource_name);
        std::env::var(&variable).map_err(|_| SecretError::Fetch {
            resource: resource_name.to_string(),
            reason: format!("environment variable {variable} is not set"),
        })
    }
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
    fn variable_names_are_uppercased_and_sanitized() {
        assert_eq!(
            EnvSecretFetcher::variable_name("projects/p/secrets/db/versions/1"),
            "BUILDRELAY_SECRET_PROJECTS_P_SECRETS_DB_VERSIONS_1"
        );
    }
}
