// buildrelay-core/src/delivery.rs
// ============================================================================
// Module: Delivery Value Tree
// Description: Untyped per-adapter delivery configuration values.
// Purpose: Carry adapter config opaquely while exposing the secretRef
//          convention.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each delivery adapter defines its own schema over the `delivery` mapping;
//! the core never interprets its contents except for two conventions: a
//! nested `{secretRef: <alias>}` object marking a secret-backed value, and
//! plain scalar/list/map values passed through verbatim. Adapters validate
//! their own required keys at set-up time and fail fast.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Delivery Values
// ============================================================================

/// One value inside the open `delivery` mapping.
///
/// # Invariants
/// - `{secretRef: <alias>}` objects always decode to [`DeliveryValue::SecretRef`];
///   any other object decodes to [`DeliveryValue::Map`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeliveryValue {
    /// Reference to a secret by deployment-local alias.
    SecretRef {
        /// Deployment-local secret alias.
        #[serde(rename = "secretRef")]
        secret_ref: String,
    },
    /// Plain text value.
    Text(String),
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(serde_json::Number),
    /// List of nested values.
    List(Vec<DeliveryValue>),
    /// Nested mapping of values.
    Map(BTreeMap<String, DeliveryValue>),
}

impl DeliveryValue {
    /// Returns the text content when this value is plain text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the secret alias when this value is a secret reference.
    #[must_use]
    pub fn as_secret_ref(&self) -> Option<&str> {
        match self {
            Self::SecretRef {
                secret_ref,
            } => Some(secret_ref),
            _ => None,
        }
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
    fn secret_ref_objects_take_priority_over_maps() {
        let value: DeliveryValue =
            serde_json::from_str(r#"{"secretRef": "webhook-token"}"#).expect("decode");
        assert_eq!(value.as_secret_ref(), Some("webhook-token"));
    }

    #[test]
    fn plain_objects_decode_as_maps() {
        let value: DeliveryValue =
            serde_json::from_str(r##"{"channel": "#builds"}"##).expect("decode");
        assert!(matches!(value, DeliveryValue::Map(_)));
    }

    #[test]
    fn scalars_pass_through() {
        let value: DeliveryValue = serde_json::from_str(r#""https://x.test""#).expect("decode");
        assert_eq!(value.as_text(), Some("https://x.test"));
    }
}
