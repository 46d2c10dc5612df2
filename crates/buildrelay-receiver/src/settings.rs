// buildrelay-receiver/src/settings.rs
// ============================================================================
// Module: Receiver Settings
// Description: Explicit startup configuration for the push receiver.
// Purpose: Keep runtime behavior out of process globals.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Every behavioral knob of the receiver is carried in this struct and
//! passed in at composition time. Nothing reads environment variables or
//! process globals after startup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Default outbound delivery deadline.
const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default UTM medium recorded on decorated log URLs.
const DEFAULT_UTM_MEDIUM: &str = "push";

/// Startup configuration for one push receiver instance.
#[derive(Debug, Clone)]
pub struct ReceiverSettings {
    /// When true, a payload that fails base64 or event decoding is
    /// acknowledged and dropped instead of negatively acknowledged.
    pub tolerate_malformed: bool,
    /// Deadline applied to each outbound adapter send.
    pub delivery_timeout: Duration,
    /// UTM medium appended to decorated log URLs.
    pub utm_medium: String,
}

impl Default for ReceiverSettings {
    fn default() -> Self {
        Self {
            tolerate_malformed: false,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            utm_medium: DEFAULT_UTM_MEDIUM.to_string(),
        }
    }
}
