// buildrelay-receiver/src/envelope.rs
// ============================================================================
// Module: Push Envelope
// Description: Inbound push-subscription request body model.
// Purpose: Decode the bus envelope and its base64 event payload.
// Dependencies: base64, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A push subscription wraps each bus message in a JSON envelope carrying
//! the base64-encoded payload plus delivery metadata. The envelope itself
//! is decoded leniently apart from the payload field: a request without
//! `message.data` has nothing to relay and is rejected outright.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while decoding an inbound push request body.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The request body is not a valid push envelope document.
    #[error("push envelope does not decode: {0}")]
    Decode(#[from] serde_json::Error),
    /// The embedded payload is not valid base64.
    #[error("push payload is not valid base64: {0}")]
    Payload(#[from] base64::DecodeError),
}

// ============================================================================
// SECTION: Envelope Model
// ============================================================================

/// Bus message carried inside a push envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Base64-encoded event payload.
    pub data: String,
    /// Bus-assigned message identifier.
    #[serde(default, alias = "messageId")]
    pub id: String,
    /// Bus publish timestamp as an RFC 3339 string.
    #[serde(default)]
    pub publish_time: String,
}

/// Inbound push-subscription request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEnvelope {
    /// The wrapped bus message.
    pub message: PushMessage,
    /// Fully-qualified subscription name that delivered the message.
    #[serde(default)]
    pub subscription: String,
}

impl PushEnvelope {
    /// Decodes a push envelope from a raw request body.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Decode`] when the body is not a push
    /// envelope document or lacks `message.data`.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Decodes the embedded base64 payload into raw event bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Payload`] when the payload is not valid
    /// base64.
    pub fn decoded_data(&self) -> Result<Vec<u8>, EnvelopeError> {
        Ok(STANDARD.decode(&self.message.data)?)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
