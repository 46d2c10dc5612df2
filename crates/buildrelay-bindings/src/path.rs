// buildrelay-bindings/src/path.rs
// ============================================================================
// Module: Path Accessors
// Description: Compiled path expressions over the build event schema.
// Purpose: Parse substitution paths once and extract text per event.
// Dependencies: buildrelay-core, crate::error
// ============================================================================

//! ## Overview
//! A substitution path addresses one piece of a build event: a scalar field,
//! a list element by index, a map value by key, a wildcard projection over a
//! list, or a secret by its deployment-local alias. Paths are parsed against
//! the fixed event schema at compile time, so a typo in configuration fails
//! before the process serves traffic.
//! Invariants:
//! - Secret aliases are bound to their opaque resource names at compile
//!   time; only the fetch itself is deferred to resolution.
//! - Extraction is read-only over the event; accessors hold no mutable
//!   state and are safe to share across concurrent resolutions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use buildrelay_core::BuildEvent;
use buildrelay_core::EventField;
use buildrelay_core::SecretAliases;
use buildrelay_core::SecretFetcher;
use buildrelay_core::StepField;
use buildrelay_core::ValueKind;

use crate::error::CompileError;
use crate::error::ResolveError;

// ============================================================================
// SECTION: Compiled Accessors
// ============================================================================

/// One compiled path expression, ready for repeated extraction.
#[derive(Debug, Clone)]
pub(crate) enum Accessor {
    /// A scalar event field, e.g. `build.status`.
    Scalar(EventField),
    /// A map value by key, e.g. `build.substitutions['_BRANCH']`.
    MapKey {
        /// Map-kinded event field being addressed.
        field: EventField,
        /// Lookup key inside the map.
        key: String,
    },
    /// A text-list element by index, e.g. `build.tags[0]`.
    ListIndex {
        /// List-kinded event field being addressed.
        field: EventField,
        /// Zero-based positional index.
        index: usize,
    },
    /// A wildcard projection over a text list, e.g. `build.images[*]`.
    ListWildcard {
        /// List-kinded event field being projected.
        field: EventField,
    },
    /// A scalar step field by step index, e.g. `build.steps[0].name`.
    StepIndex {
        /// Zero-based step index.
        index: usize,
        /// Scalar field extracted from the selected step.
        field: StepField,
    },
    /// A wildcard projection over step fields, e.g. `build.steps[*].status`.
    StepWildcard {
        /// Scalar field extracted from every step.
        field: StepField,
    },
    /// A secret reference, e.g. `secrets.db`, bound to its resource name.
    Secret {
        /// Deployment-local alias as written in the path.
        alias: String,
        /// Opaque store resource name bound at compile time.
        resource: String,
    },
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Bracket selector parsed from a `[...]` path segment.
#[derive(Debug)]
enum Selector {
    /// Positional index.
    Index(usize),
    /// `*` projection over every element.
    Wildcard,
    /// Quoted map key.
    Key(String),
}

/// Parses the path text inside an already-stripped `$( ... )` envelope.
///
/// `name` is the substitution name, carried into every error.
pub(crate) fn parse(
    name: &str,
    path: &str,
    aliases: &SecretAliases,
) -> Result<Accessor, CompileError> {
    let mut cursor = Cursor::new(name, path);
    let root = cursor.ident()?;
    match root.as_str() {
        "secrets" => parse_secret(&mut cursor, aliases),
        "build" => parse_event_path(&mut cursor),
        other => Err(CompileError::UnknownRoot {
            name: name.to_string(),
            root: other.to_string(),
        }),
    }
}

/// Parses the remainder of a `secrets.<alias>` path.
fn parse_secret(cursor: &mut Cursor<'_>, aliases: &SecretAliases) -> Result<Accessor, CompileError> {
    cursor.expect(b'.')?;
    let alias = cursor.ident()?;
    cursor.expect_end()?;
    let resource = aliases.resource(&alias).map_err(|source| CompileError::UnknownSecret {
        name: cursor.name.to_string(),
        source,
    })?;
    Ok(Accessor::Secret {
        alias,
        resource: resource.to_string(),
    })
}

/// Parses the remainder of a `build.<field>...` path.
fn parse_event_path(cursor: &mut Cursor<'_>) -> Result<Accessor, CompileError> {
    cursor.expect(b'.')?;
    let field_name = cursor.ident()?;
    let field = EventField::parse(&field_name).ok_or_else(|| CompileError::UnknownField {
        name: cursor.name.to_string(),
        field: field_name.clone(),
    })?;
    match field.kind() {
        ValueKind::Text | ValueKind::OptionalText | ValueKind::Status | ValueKind::Timestamp => {
            cursor.expect_end()?;
            Ok(Accessor::Scalar(field))
        }
        ValueKind::TextMap => {
            let selector = cursor.selector()?;
            cursor.expect_end()?;
            match selector {
                Selector::Key(key) => Ok(Accessor::MapKey {
                    field,
                    key,
                }),
                Selector::Index(_) | Selector::Wildcard => Err(CompileError::KindMismatch {
                    name: cursor.name.to_string(),
                    reason: format!("`{}` is a map and requires a quoted key", field.name()),
                }),
            }
        }
        ValueKind::TextList => {
            let selector = cursor.selector()?;
            cursor.expect_end()?;
            match selector {
                Selector::Index(index) => Ok(Accessor::ListIndex {
                    field,
                    index,
                }),
                Selector::Wildcard => Ok(Accessor::ListWildcard {
                    field,
                }),
                Selector::Key(_) => Err(CompileError::KindMismatch {
                    name: cursor.name.to_string(),
                    reason: format!("`{}` is a list and requires an index or `*`", field.name()),
                }),
            }
        }
        ValueKind::StepList => {
            let selector = cursor.selector()?;
            cursor.expect(b'.')?;
            let step_field_name = cursor.ident()?;
            let step_field =
                StepField::parse(&step_field_name).ok_or_else(|| CompileError::UnknownStepField {
                    name: cursor.name.to_string(),
                    field: step_field_name,
                })?;
            cursor.expect_end()?;
            match selector {
                Selector::Index(index) => Ok(Accessor::StepIndex {
                    index,
                    field: step_field,
                }),
                Selector::Wildcard => Ok(Accessor::StepWildcard {
                    field: step_field,
                }),
                Selector::Key(_) => Err(CompileError::KindMismatch {
                    name: cursor.name.to_string(),
                    reason: "`steps` is a list and requires an index or `*`".to_string(),
                }),
            }
        }
    }
}

/// Byte cursor over one path expression.
struct Cursor<'a> {
    /// Substitution name, carried into errors.
    name: &'a str,
    /// Path bytes being scanned.
    bytes: &'a [u8],
    /// Current scan position.
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over trimmed path text.
    fn new(name: &'a str, path: &'a str) -> Self {
        Self {
            name,
            bytes: path.as_bytes(),
            pos: 0,
        }
    }

    /// Builds a malformed-path error at the current position.
    fn malformed(&self, reason: impl Into<String>) -> CompileError {
        CompileError::Malformed {
            name: self.name.to_string(),
            reason: reason.into(),
        }
    }

    /// Scans one `[A-Za-z0-9_]+` identifier.
    fn ident(&mut self) -> Result<String, CompileError> {
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|byte| byte.is_ascii_alphanumeric() || *byte == b'_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.malformed(format!("expected an identifier at byte {start}")));
        }
        Ok(String::from_utf8_lossy(&self.bytes[start .. self.pos]).into_owned())
    }

    /// Consumes one expected punctuation byte.
    fn expect(&mut self, expected: u8) -> Result<(), CompileError> {
        if self.bytes.get(self.pos) == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.malformed(format!(
                "expected `{}` at byte {}",
                char::from(expected),
                self.pos
            )))
        }
    }

    /// Requires that the whole path has been consumed.
    fn expect_end(&mut self) -> Result<(), CompileError> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(self.malformed(format!("unexpected trailing text at byte {}", self.pos)))
        }
    }

    /// Scans one `[...]` selector: an index, `*`, or a quoted key.
    fn selector(&mut self) -> Result<Selector, CompileError> {
        self.expect(b'[')?;
        let selector = match self.bytes.get(self.pos) {
            Some(b'*') => {
                self.pos += 1;
                Selector::Wildcard
            }
            Some(quote @ (b'\'' | b'"')) => {
                self.pos += 1;
                let start = self.pos;
                while self.bytes.get(self.pos).is_some_and(|byte| byte != quote) {
                    self.pos += 1;
                }
                if self.pos == self.bytes.len() {
                    return Err(self.malformed(format!("unterminated key starting at byte {start}")));
                }
                let key = String::from_utf8_lossy(&self.bytes[start .. self.pos]).into_owned();
                self.pos += 1;
                Selector::Key(key)
            }
            Some(byte) if byte.is_ascii_digit() => {
                let start = self.pos;
                while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
                    self.pos += 1;
                }
                let digits = String::from_utf8_lossy(&self.bytes[start .. self.pos]);
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| self.malformed(format!("index `{digits}` is out of range")))?;
                Selector::Index(index)
            }
            _ => {
                return Err(self.malformed(format!(
                    "expected an index, `*`, or a quoted key at byte {}",
                    self.pos
                )));
            }
        };
        self.expect(b']')?;
        Ok(selector)
    }
}

// ============================================================================
// SECTION: Extraction
// ============================================================================

impl Accessor {
    /// Extracts this accessor's text from one event.
    ///
    /// `name` is the binding name, carried into every error.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the addressed data is absent, an index
    /// is out of range, a wildcard matches nothing, or the secret store
    /// fails. Absence is never substituted with an empty string.
    pub(crate) fn extract(
        &self,
        name: &str,
        event: &BuildEvent,
        fetcher: &dyn SecretFetcher,
    ) -> Result<String, ResolveError> {
        match self {
            Self::Scalar(field) => {
                field.scalar_text(event).ok_or_else(|| ResolveError::AbsentField {
                    name: name.to_string(),
                    field: field.name().to_string(),
                })
            }
            Self::MapKey {
                field,
                key,
            } => event.substitutions.get(key).cloned().ok_or_else(|| ResolveError::AbsentKey {
                name: name.to_string(),
                field: field.name().to_string(),
                key: key.clone(),
            }),
            Self::ListIndex {
                field,
                index,
            } => {
                let list = field.text_list(event).unwrap_or(&[]);
                list.get(*index).cloned().ok_or_else(|| ResolveError::IndexOutOfRange {
                    name: name.to_string(),
                    field: field.name().to_string(),
                    index: *index,
                    length: list.len(),
                })
            }
            Self::ListWildcard {
                field,
            } => {
                let list = field.text_list(event).unwrap_or(&[]);
                if list.is_empty() {
                    return Err(ResolveError::EmptyProjection {
                        name: name.to_string(),
                        field: field.name().to_string(),
                    });
                }
                Ok(list.join(" "))
            }
            Self::StepIndex {
                index,
                field,
            } => {
                let step =
                    event.steps.get(*index).ok_or_else(|| ResolveError::IndexOutOfRange {
                        name: name.to_string(),
                        field: "steps".to_string(),
                        index: *index,
                        length: event.steps.len(),
                    })?;
                field.scalar_text(step).ok_or_else(|| ResolveError::AbsentField {
                    name: name.to_string(),
                    field: format!("steps[{index}].{}", field.name()),
                })
            }
            Self::StepWildcard {
                field,
            } => {
                if event.steps.is_empty() {
                    return Err(ResolveError::EmptyProjection {
                        name: name.to_string(),
                        field: "steps".to_string(),
                    });
                }
                let mut parts = Vec::with_capacity(event.steps.len());
                for (position, step) in event.steps.iter().enumerate() {
                    let part =
                        field.scalar_text(step).ok_or_else(|| ResolveError::AbsentField {
                            name: name.to_string(),
                            field: format!("steps[{position}].{}", field.name()),
                        })?;
                    parts.push(part);
                }
                Ok(parts.join(" "))
            }
            Self::Secret {
                alias,
                resource,
            } => fetcher.fetch(resource).map_err(|source| ResolveError::Secret {
                name: name.to_string(),
                alias: alias.clone(),
                source,
            }),
        }
    }
}
