// buildrelay-config/src/config.rs
// ============================================================================
// Module: Notification Configuration
// Description: Strict configuration model for one relay deployment.
// Purpose: Provide fail-closed config parsing with hard limits.
// Dependencies: buildrelay-core, serde, serde_yaml
// ============================================================================

//! ## Overview
//! Configuration is decoded from a YAML document with `deny_unknown_fields`
//! at every level. Missing or invalid configuration fails closed at startup;
//! the process must not begin serving traffic on a bad document.
//! Invariants:
//! - `apiVersion` must be a member of [`SUPPORTED_API_VERSIONS`].
//! - Substitution keys match the reserved-prefix pattern `^_[A-Z0-9_]+$`.
//! - Secret aliases are unique within one document.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use buildrelay_core::DeliveryValue;
use buildrelay_core::SecretAliases;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Configuration document versions this build understands.
pub const SUPPORTED_API_VERSIONS: &[&str] = &["buildrelay.dev/v1", "buildrelay.dev/v1beta1"];

/// Maximum configuration document size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;

// ============================================================================
// SECTION: Configuration Errors
// ============================================================================

/// Errors raised while loading or validating configuration.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Every variant is fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the document from disk failed.
    #[error("config read failed: {0}")]
    Io(String),
    /// The document failed strict decoding.
    #[error("config parse failed: {0}")]
    Parse(String),
    /// The document version is not supported by this build.
    #[error("unsupported apiVersion `{0}`")]
    UnsupportedApiVersion(String),
    /// A required section or field is empty.
    #[error("config field `{0}` must not be empty")]
    EmptyField(&'static str),
    /// A substitution key violates the reserved-prefix pattern.
    #[error("substitution name `{0}` must match ^_[A-Z0-9_]+$")]
    InvalidSubstitutionName(String),
    /// Two secrets declare the same local alias.
    #[error("duplicate secret alias `{0}`")]
    DuplicateSecretAlias(String),
    /// The document exceeds the size limit.
    #[error("config document exceeds {MAX_CONFIG_FILE_SIZE} bytes")]
    TooLarge,
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Top-level notification configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct NotifierConfig {
    /// Document schema version; must be in [`SUPPORTED_API_VERSIONS`].
    pub api_version: String,
    /// Document kind label.
    pub kind: String,
    /// Deployment metadata.
    pub metadata: Metadata,
    /// Behavior specification.
    pub spec: NotifierSpec,
}

/// Deployment metadata block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    /// Deployment name used in diagnostics.
    pub name: String,
}

/// Behavior specification block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifierSpec {
    /// Notification pipeline settings.
    pub notification: Notification,
    /// Secret alias declarations.
    #[serde(default)]
    pub secrets: Vec<SecretEntry>,
}

/// Notification pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Notification {
    /// Boolean filter expression compiled at startup.
    pub filter: String,
    /// Adapter-specific delivery mapping, carried opaquely.
    #[serde(default)]
    pub delivery: BTreeMap<String, DeliveryValue>,
    /// Named path expressions resolved per matching event.
    #[serde(default)]
    pub substitutions: BTreeMap<String, String>,
}

/// One secret alias declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SecretEntry {
    /// Deployment-local alias referenced by delivery fields and paths.
    pub local_name: String,
    /// Opaque external secret identifier.
    pub resource_name: String,
}

// ============================================================================
// SECTION: Loading and Validation
// ============================================================================

impl NotifierConfig {
    /// Loads and validates a configuration document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, decoding, or validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_yaml_slice(&bytes)
    }

    /// Decodes and validates a configuration document from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when decoding or validation fails.
    pub fn from_yaml_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge);
        }
        let config: Self =
            serde_yaml::from_slice(bytes).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the document for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any invariant is violated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_API_VERSIONS.contains(&self.api_version.as_str()) {
            return Err(ConfigError::UnsupportedApiVersion(self.api_version.clone()));
        }
        if self.kind.is_empty() {
            return Err(ConfigError::EmptyField("kind"));
        }
        if self.metadata.name.is_empty() {
            return Err(ConfigError::EmptyField("metadata.name"));
        }
        if self.spec.notification.filter.trim().is_empty() {
            return Err(ConfigError::EmptyField("spec.notification.filter"));
        }
        for key in self.spec.notification.substitutions.keys() {
            if !is_valid_substitution_name(key) {
                return Err(ConfigError::InvalidSubstitutionName(key.clone()));
            }
        }
        let mut seen = BTreeSet::new();
        for secret in &self.spec.secrets {
            if secret.local_name.is_empty() {
                return Err(ConfigError::EmptyField("spec.secrets[].localName"));
            }
            if secret.resource_name.is_empty() {
                return Err(ConfigError::EmptyField("spec.secrets[].resourceName"));
            }
            if !seen.insert(secret.local_name.as_str()) {
                return Err(ConfigError::DuplicateSecretAlias(secret.local_name.clone()));
            }
        }
        Ok(())
    }

    /// Builds the secret alias table from the declared secrets.
    #[must_use]
    pub fn secret_aliases(&self) -> SecretAliases {
        let map = self
            .spec
            .secrets
            .iter()
            .map(|entry| (entry.local_name.clone(), entry.resource_name.clone()))
            .collect();
        SecretAliases::new(map)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when a substitution key matches `^_[A-Z0-9_]+$`.
fn is_valid_substitution_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'_' {
        return false;
    }
    bytes[1 ..].iter().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || *b == b'_')
}

// ============================================================================
// SECTION: Tests
// ============================================================================
