// buildrelay-core/src/schema.rs
// ============================================================================
// Module: Event Field Schema
// Description: Fixed schema table over the build event model.
// Purpose: Let expression engines resolve field names at compile time.
// Dependencies: crate::event
// ============================================================================

//! ## Overview
//! The filter and binding engines compile path expressions ahead of time
//! against this fixed table. Unknown field names therefore fail at compile
//! time, never during event handling.
//! Invariants:
//! - The table is a closed, compile-time constant set.
//! - Scalar extraction returns `None` for legitimately absent data; callers
//!   decide whether absence is a fault.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::event::BuildEvent;
use crate::event::BuildStep;

// ============================================================================
// SECTION: Value Kinds
// ============================================================================

/// Kind of value a schema field yields.
///
/// # Invariants
/// - Variants are stable; engines branch on them during compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Scalar text that is always present (possibly empty).
    Text,
    /// Scalar text that may be absent.
    OptionalText,
    /// Build status rendered as its canonical name.
    Status,
    /// RFC 3339 timestamp that may be absent.
    Timestamp,
    /// List of text values addressed by index or wildcard.
    TextList,
    /// Map of text values addressed by key.
    TextMap,
    /// List of build steps addressed by index or wildcard plus a step field.
    StepList,
}

// ============================================================================
// SECTION: Event Fields
// ============================================================================

/// Addressable top-level field of a build event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    /// `build.id`
    Id,
    /// `build.project_id`
    ProjectId,
    /// `build.trigger_id`
    TriggerId,
    /// `build.status`
    Status,
    /// `build.create_time`
    CreateTime,
    /// `build.start_time`
    StartTime,
    /// `build.finish_time`
    FinishTime,
    /// `build.steps`
    Steps,
    /// `build.substitutions`
    Substitutions,
    /// `build.tags`
    Tags,
    /// `build.images`
    Images,
    /// `build.log_url`
    LogUrl,
}

impl EventField {
    /// Resolves a path-language identifier into a field.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "project_id" => Some(Self::ProjectId),
            "trigger_id" => Some(Self::TriggerId),
            "status" => Some(Self::Status),
            "create_time" => Some(Self::CreateTime),
            "start_time" => Some(Self::StartTime),
            "finish_time" => Some(Self::FinishTime),
            "steps" => Some(Self::Steps),
            "substitutions" => Some(Self::Substitutions),
            "tags" => Some(Self::Tags),
            "images" => Some(Self::Images),
            "log_url" => Some(Self::LogUrl),
            _ => None,
        }
    }

    /// Returns the path-language name of this field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ProjectId => "project_id",
            Self::TriggerId => "trigger_id",
            Self::Status => "status",
            Self::CreateTime => "create_time",
            Self::StartTime => "start_time",
            Self::FinishTime => "finish_time",
            Self::Steps => "steps",
            Self::Substitutions => "substitutions",
            Self::Tags => "tags",
            Self::Images => "images",
            Self::LogUrl => "log_url",
        }
    }

    /// Returns the value kind this field yields.
    #[must_use]
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::Id | Self::ProjectId => ValueKind::Text,
            Self::TriggerId | Self::LogUrl => ValueKind::OptionalText,
            Self::Status => ValueKind::Status,
            Self::CreateTime | Self::StartTime | Self::FinishTime => ValueKind::Timestamp,
            Self::Steps => ValueKind::StepList,
            Self::Substitutions => ValueKind::TextMap,
            Self::Tags | Self::Images => ValueKind::TextList,
        }
    }

    /// Extracts a scalar field as text.
    ///
    /// Returns `None` when the field is absent, or when this field is not a
    /// scalar kind.
    #[must_use]
    pub fn scalar_text(self, event: &BuildEvent) -> Option<String> {
        match self {
            Self::Id => Some(event.id.clone()),
            Self::ProjectId => Some(event.project_id.clone()),
            Self::TriggerId => event.trigger_id.clone(),
            Self::LogUrl => event.log_url.clone(),
            Self::Status => Some(event.status.as_str().to_string()),
            Self::CreateTime => BuildEvent::format_timestamp(event.create_time),
            Self::StartTime => BuildEvent::format_timestamp(event.start_time),
            Self::FinishTime => BuildEvent::format_timestamp(event.finish_time),
            Self::Steps | Self::Substitutions | Self::Tags | Self::Images => None,
        }
    }

    /// Extracts a text-list field.
    ///
    /// Returns `None` when this field is not a text list.
    #[must_use]
    pub fn text_list(self, event: &BuildEvent) -> Option<&[String]> {
        match self {
            Self::Tags => Some(&event.tags),
            Self::Images => Some(&event.images),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Step Fields
// ============================================================================

/// Addressable scalar field of a build step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepField {
    /// `steps[..].name`
    Name,
    /// `steps[..].id`
    Id,
    /// `steps[..].status`
    Status,
}

impl StepField {
    /// Resolves a path-language identifier into a step field.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "id" => Some(Self::Id),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    /// Returns the path-language name of this step field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Id => "id",
            Self::Status => "status",
        }
    }

    /// Extracts this field from one step as text.
    ///
    /// Returns `None` when the field is absent on the step.
    #[must_use]
    pub fn scalar_text(self, step: &BuildStep) -> Option<String> {
        match self {
            Self::Name => Some(step.name.clone()),
            Self::Id => step.id.clone(),
            Self::Status => Some(step.status.as_str().to_string()),
        }
    }
}
