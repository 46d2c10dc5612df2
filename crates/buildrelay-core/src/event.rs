// buildrelay-core/src/event.rs
// ============================================================================
// Module: Build Event Model
// Description: Immutable snapshot of one build's lifecycle state.
// Purpose: Decode bus payloads leniently and expose typed field access.
// Dependencies: serde, serde_json, time, url
// ============================================================================

//! ## Overview
//! A [`BuildEvent`] is constructed exactly once per inbound push request and
//! then passed by shared reference through the filter, the binding resolver,
//! and the delivery adapter. Decoding is lenient: unknown wire fields are
//! discarded for forward compatibility, absent fields take their defaults,
//! and only mis-typed fields fail the decode.
//! Invariants:
//! - No component mutates an event; [`BuildEvent::with_decorated_log_url`]
//!   returns a new value.
//! - Status comparisons use the canonical wire name, never an ordinal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// UTM campaign tag appended to decorated log URLs.
pub const UTM_CAMPAIGN: &str = "buildrelay";

// ============================================================================
// SECTION: Build Status
// ============================================================================

/// Lifecycle status of a build or build step.
///
/// # Invariants
/// - Canonical names are stable wire values; comparisons use them, not the
///   declaration order.
/// - Unrecognized wire values decode to [`BuildStatus::Unknown`] so schema
///   evolution on the bus cannot poison the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    /// Build is pending admission.
    Pending,
    /// Build is queued for execution.
    Queued,
    /// Build is executing.
    Working,
    /// Build finished successfully.
    Success,
    /// Build finished with a step failure.
    Failure,
    /// Build was aborted by the build service.
    InternalError,
    /// Build exceeded its execution deadline.
    Timeout,
    /// Build was cancelled by a user or trigger.
    Cancelled,
    /// Build expired before starting.
    Expired,
    /// Reserved unknown status; must stay last so unrecognized wire values
    /// decode here.
    #[default]
    #[serde(rename = "STATUS_UNKNOWN")]
    #[serde(other)]
    Unknown,
}

impl BuildStatus {
    /// Returns the canonical wire name for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "STATUS_UNKNOWN",
            Self::Pending => "PENDING",
            Self::Queued => "QUEUED",
            Self::Working => "WORKING",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Parses a canonical wire name into a status.
    #[must_use]
    pub fn from_canonical(name: &str) -> Option<Self> {
        match name {
            "STATUS_UNKNOWN" => Some(Self::Unknown),
            "PENDING" => Some(Self::Pending),
            "QUEUED" => Some(Self::Queued),
            "WORKING" => Some(Self::Working),
            "SUCCESS" => Some(Self::Success),
            "FAILURE" => Some(Self::Failure),
            "INTERNAL_ERROR" => Some(Self::InternalError),
            "TIMEOUT" => Some(Self::Timeout),
            "CANCELLED" => Some(Self::Cancelled),
            "EXPIRED" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Returns true when the status is a member of the closed terminal set.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success
                | Self::Failure
                | Self::InternalError
                | Self::Timeout
                | Self::Cancelled
                | Self::Expired
        )
    }
}

// ============================================================================
// SECTION: Build Step
// ============================================================================

/// One step of a build, with its own status and timing.
///
/// # Invariants
/// - Steps are decoded leniently; absent fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStep {
    /// Container image or builder name executing the step.
    #[serde(default)]
    pub name: String,
    /// Optional step identifier unique within the build.
    #[serde(default)]
    pub id: Option<String>,
    /// Step lifecycle status.
    #[serde(default)]
    pub status: BuildStatus,
    /// Arguments passed to the step entrypoint.
    #[serde(default)]
    pub args: Vec<String>,
    /// Step start time, absent until the step begins.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    /// Step finish time, absent until the step completes.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub finish_time: Option<OffsetDateTime>,
}

// ============================================================================
// SECTION: Build Event
// ============================================================================

/// Immutable snapshot of one build's lifecycle state.
///
/// # Invariants
/// - Constructed once per inbound request and shared read-only afterwards.
/// - Unknown wire fields are discarded; mis-typed fields fail the decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildEvent {
    /// Unique build identifier.
    #[serde(default)]
    pub id: String,
    /// Project or tenant that owns the build.
    #[serde(default)]
    pub project_id: String,
    /// Trigger that started the build, absent for manual builds.
    #[serde(default, rename = "buildTriggerId")]
    pub trigger_id: Option<String>,
    /// Build lifecycle status.
    #[serde(default)]
    pub status: BuildStatus,
    /// Time the build was created, absent only on malformed feeds.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub create_time: Option<OffsetDateTime>,
    /// Time the build started executing.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    /// Time the build finished.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub finish_time: Option<OffsetDateTime>,
    /// Steps executed by the build, in declaration order.
    #[serde(default)]
    pub steps: Vec<BuildStep>,
    /// User-defined substitution variables recorded on the build.
    #[serde(default)]
    pub substitutions: BTreeMap<String, String>,
    /// Tags attached to the build.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Images produced by the build.
    #[serde(default)]
    pub images: Vec<String>,
    /// URL of the build log viewer.
    #[serde(default)]
    pub log_url: Option<String>,
}

impl BuildEvent {
    /// Decodes a build event from a raw JSON payload.
    ///
    /// Unknown fields are discarded; fields that do not parse as their
    /// declared type fail the decode.
    ///
    /// # Errors
    ///
    /// Returns the underlying decode error when a declared field is
    /// mis-typed or the payload is not a JSON document.
    pub fn from_json_slice(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Returns a new event whose log URL carries UTM campaign parameters.
    ///
    /// When the log URL is absent or does not parse, the event is returned
    /// unchanged; decoration never invalidates an otherwise-valid event.
    #[must_use]
    pub fn with_decorated_log_url(&self, medium: &str) -> Self {
        let mut event = self.clone();
        if let Some(log_url) = &self.log_url
            && let Ok(mut url) = Url::parse(log_url)
        {
            url.query_pairs_mut()
                .append_pair("utm_campaign", UTM_CAMPAIGN)
                .append_pair("utm_medium", medium)
                .append_pair("utm_source", "buildrelay");
            event.log_url = Some(url.into());
        }
        event
    }

    /// Formats an optional timestamp field as an RFC 3339 string.
    #[must_use]
    pub fn format_timestamp(value: Option<OffsetDateTime>) -> Option<String> {
        value.and_then(|ts| ts.format(&Rfc3339).ok())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
