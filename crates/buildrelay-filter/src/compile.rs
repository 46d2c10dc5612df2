// buildrelay-filter/src/compile.rs
// ============================================================================
// Module: Filter Compiler
// Description: Parser and type checker for the filter expression language.
// Purpose: Turn expression text into a reusable [`CompiledFilter`].
// Dependencies: buildrelay-core, crate::{error, expr, lexer, telemetry}
// ============================================================================

//! ## Overview
//!
//! The compiler runs once at setup time and produces a [`CompiledFilter`]
//! that is reused across every subsequent event. Filter text is untrusted
//! deployment configuration; size and nesting limits apply.
//!
//! ### Grammar (informal)
//! - **Paths**: `build.status`, `build.project_id`,
//!   `build.substitutions['_KEY']`
//! - **Comparisons**: `a == b`, `a != b` over paths and quoted literals
//! - **Membership**: `"tag" in build.tags`, `build.id in build.images`
//! - **Boolean operators**: `&&`, `||`, `!`, with `( ... )` grouping
//!
//! ### Example
//!
//! ```
//! use buildrelay_core::BuildEvent;
//! use buildrelay_core::BuildStatus;
//!
//! let filter = buildrelay_filter::compile("build.status == \"SUCCESS\"").unwrap();
//! let event = BuildEvent {
//!     status: BuildStatus::Success,
//!     ..BuildEvent::default()
//! };
//! assert!(filter.apply(&event));
//! ```
//!
//! Type checking is part of compilation: an expression whose result is not
//! boolean fails here, never at evaluation time. Enum-valued comparisons use
//! the status canonical name, and literals compared against `build.status`
//! must name a known status.

// ============================================================================
// SECTION: Imports
// ============================================================================

use buildrelay_core::BuildEvent;
use buildrelay_core::BuildStatus;
use buildrelay_core::EventField;
use buildrelay_core::ValueKind;

use crate::error::CompileError;
use crate::expr::CompareOp;
use crate::expr::Expr;
use crate::expr::Operand;
use crate::expr::ScalarPath;
use crate::lexer::Lexer;
use crate::lexer::SpannedToken;
use crate::lexer::Token;
use crate::telemetry::FilterTelemetry;
use crate::telemetry::NoopFilterTelemetry;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum allowed filter expression size in bytes.
const MAX_FILTER_INPUT_BYTES: usize = 64 * 1024;
/// Maximum supported nesting depth for filter expressions.
const MAX_FILTER_NESTING: usize = 32;

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Compiles a filter expression against the build-event schema.
///
/// # Errors
///
/// Returns [`CompileError`] for syntax errors, unknown fields, kind
/// mismatches, and expressions that do not type as boolean.
pub fn compile(input: &str) -> Result<CompiledFilter, CompileError> {
    if input.len() > MAX_FILTER_INPUT_BYTES {
        return Err(CompileError::InputTooLarge {
            max_bytes: MAX_FILTER_INPUT_BYTES,
        });
    }
    let mut lexer = Lexer::new(input);
    let tokens = lexer.lex()?;

    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expression()?;
    parser.expect_eof()?;

    Ok(CompiledFilter {
        source: input.to_string(),
        expr,
    })
}

/// A filter compiled once at setup time and reused across events.
///
/// # Invariants
/// - The inner tree is well-typed boolean; this was checked at compile time.
/// - The value is immutable and safe to share across concurrent request
///   handlers.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    /// Original expression text, retained for diagnostics.
    source: String,
    /// Compiled expression tree.
    expr: Expr,
}

impl CompiledFilter {
    /// Applies the filter to one event, recovering faults to a non-match.
    ///
    /// Repeated application with the same inputs always yields the same
    /// result; evaluation performs no I/O and mutates nothing.
    #[must_use]
    pub fn apply(&self, event: &BuildEvent) -> bool {
        self.apply_traced(event, &NoopFilterTelemetry)
    }

    /// Applies the filter, reporting evaluation faults to a telemetry sink.
    ///
    /// A fault downgrades the evaluation to `false`; it never propagates to
    /// the caller, so a misbehaving filter cannot make the receiver
    /// unavailable for other events.
    #[must_use]
    pub fn apply_traced(&self, event: &BuildEvent, telemetry: &dyn FilterTelemetry) -> bool {
        match self.expr.eval(event) {
            Ok(matched) => matched,
            Err(fault) => {
                telemetry.on_eval_fault(&self.source, &fault);
                false
            }
        }
    }

    /// Returns the original expression text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Parsed operand, scalar or list, with its source position.
enum ParsedOperand {
    /// Scalar operand usable on either side of a comparison.
    Scalar(Operand, usize),
    /// Text-list field usable only as a membership haystack.
    List(EventField, usize),
}

/// Recursive-descent parser for the filter language.
struct Parser<'input> {
    /// Token stream with source positions.
    tokens: Vec<SpannedToken<'input>>,
    /// Current token index.
    index: usize,
    /// Current nesting depth for parenthesized expressions.
    nesting: usize,
}

impl<'input> Parser<'input> {
    /// Creates a parser over the token stream.
    const fn new(tokens: Vec<SpannedToken<'input>>) -> Self {
        Self {
            tokens,
            index: 0,
            nesting: 0,
        }
    }

    /// Parses a full boolean expression.
    fn parse_expression(&mut self) -> Result<Expr, CompileError> {
        self.parse_or()
    }

    /// Parses OR expressions.
    fn parse_or(&mut self) -> Result<Expr, CompileError> {
        let mut parts = Vec::new();
        parts.push(self.parse_and()?);

        while self.matches(Token::Or) {
            parts.push(self.parse_and()?);
        }

        if parts.len() == 1 {
            Ok(remove_first(parts))
        } else {
            Ok(Expr::Or(parts.into_iter().map(Box::new).collect()))
        }
    }

    /// Parses AND expressions.
    fn parse_and(&mut self) -> Result<Expr, CompileError> {
        let mut parts = Vec::new();
        parts.push(self.parse_unary()?);

        while self.matches(Token::And) {
            parts.push(self.parse_unary()?);
        }

        if parts.len() == 1 {
            Ok(remove_first(parts))
        } else {
            Ok(Expr::And(parts.into_iter().map(Box::new).collect()))
        }
    }

    /// Parses unary expressions, including NOT.
    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        if self.matches(Token::Not) {
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    /// Parses a primary expression: a group or a comparison.
    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        if let Token::LParen = self.current().token {
            let pos = self.current().position;
            self.advance();
            return self.with_nesting(pos, |parser| {
                let expr = parser.parse_expression()?;
                parser.expect(Token::RParen, "`)`")?;
                Ok(expr)
            });
        }
        self.parse_comparison()
    }

    /// Parses a comparison or membership test.
    ///
    /// A bare operand with no operator is a type error: the expression must
    /// evaluate to a boolean.
    fn parse_comparison(&mut self) -> Result<Expr, CompileError> {
        let lhs = self.parse_operand()?;

        if self.matches(Token::In) {
            let needle = match lhs {
                ParsedOperand::Scalar(operand, _) => operand,
                ParsedOperand::List(field, position) => {
                    return Err(CompileError::KindMismatch {
                        name: field.name().to_string(),
                        reason: "membership needle must be a scalar",
                        position,
                    });
                }
            };
            let rhs = self.parse_operand()?;
            let haystack = match rhs {
                ParsedOperand::List(field, _) => field,
                ParsedOperand::Scalar(_, position) => {
                    return Err(CompileError::KindMismatch {
                        name: "in".to_string(),
                        reason: "membership requires a list field on the right",
                        position,
                    });
                }
            };
            return Ok(Expr::Contains {
                needle,
                haystack,
            });
        }

        let op = if self.matches(Token::EqEq) {
            CompareOp::Eq
        } else if self.matches(Token::NotEq) {
            CompareOp::Ne
        } else {
            return Err(CompileError::NotBoolean);
        };

        let lhs = match lhs {
            ParsedOperand::Scalar(operand, _) => operand,
            ParsedOperand::List(field, position) => {
                return Err(CompileError::KindMismatch {
                    name: field.name().to_string(),
                    reason: "list fields only support `in` membership",
                    position,
                });
            }
        };
        let rhs = match self.parse_operand()? {
            ParsedOperand::Scalar(operand, _) => operand,
            ParsedOperand::List(field, position) => {
                return Err(CompileError::KindMismatch {
                    name: field.name().to_string(),
                    reason: "list fields only support `in` membership",
                    position,
                });
            }
        };
        check_status_literal(&lhs, &rhs, self.current().position)?;
        Ok(Expr::Compare {
            op,
            lhs,
            rhs,
        })
    }

    /// Parses one operand: a literal or a `build.` path.
    fn parse_operand(&mut self) -> Result<ParsedOperand, CompileError> {
        let SpannedToken {
            token,
            position,
        } = *self.current();

        match token {
            Token::Str(text) => {
                self.advance();
                Ok(ParsedOperand::Scalar(Operand::Literal(text.to_string()), position))
            }
            Token::Ident("build") => {
                self.advance();
                self.parse_path(position)
            }
            Token::Ident(name) => Err(CompileError::UnknownField {
                name: name.to_string(),
                position,
            }),
            _ => Err(CompileError::UnexpectedToken {
                expected: "`build.` path or string literal",
                found: token.describe(),
                position,
            }),
        }
    }

    /// Parses the remainder of a `build.` path.
    fn parse_path(&mut self, root_pos: usize) -> Result<ParsedOperand, CompileError> {
        self.expect(Token::Dot, "`.` after `build`")?;
        let SpannedToken {
            token,
            position,
        } = *self.current();
        let Token::Ident(name) = token else {
            return Err(CompileError::UnexpectedToken {
                expected: "field name",
                found: token.describe(),
                position,
            });
        };
        let Some(field) = EventField::parse(name) else {
            return Err(CompileError::UnknownField {
                name: name.to_string(),
                position,
            });
        };
        self.advance();

        match field.kind() {
            ValueKind::Text | ValueKind::OptionalText | ValueKind::Status
            | ValueKind::Timestamp => {
                Ok(ParsedOperand::Scalar(Operand::Path(ScalarPath::Field(field)), root_pos))
            }
            ValueKind::TextList => Ok(ParsedOperand::List(field, root_pos)),
            ValueKind::TextMap => {
                self.expect(Token::LBracket, "`[` after `substitutions`")?;
                let SpannedToken {
                    token: key_token,
                    position: key_pos,
                } = *self.current();
                let Token::Str(key) = key_token else {
                    return Err(CompileError::UnexpectedToken {
                        expected: "quoted substitution key",
                        found: key_token.describe(),
                        position: key_pos,
                    });
                };
                self.advance();
                self.expect(Token::RBracket, "`]` after substitution key")?;
                Ok(ParsedOperand::Scalar(
                    Operand::Path(ScalarPath::Substitution(key.to_string())),
                    root_pos,
                ))
            }
            ValueKind::StepList => Err(CompileError::KindMismatch {
                name: field.name().to_string(),
                reason: "the step list is not addressable in filter expressions",
                position,
            }),
        }
    }

    /// Runs a parser step while enforcing the nesting limit.
    fn with_nesting<T>(
        &mut self,
        position: usize,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        let next_depth = self.nesting + 1;
        if next_depth > MAX_FILTER_NESTING {
            return Err(CompileError::NestingTooDeep {
                max_depth: MAX_FILTER_NESTING,
                position,
            });
        }
        self.nesting = next_depth;
        let result = f(self);
        self.nesting = self.nesting.saturating_sub(1);
        result
    }

    /// Consumes the expected token or returns an error.
    fn expect(&mut self, token: Token<'_>, expected: &'static str) -> Result<(), CompileError> {
        if std::mem::discriminant(&self.current().token) == std::mem::discriminant(&token) {
            self.advance();
            Ok(())
        } else {
            Err(CompileError::UnexpectedToken {
                expected,
                found: self.current().token.describe(),
                position: self.current().position,
            })
        }
    }

    /// Ensures the parser is at end-of-input.
    fn expect_eof(&self) -> Result<(), CompileError> {
        if matches!(self.current().token, Token::Eof) {
            Ok(())
        } else {
            Err(CompileError::TrailingInput {
                position: self.current().position,
            })
        }
    }

    /// Consumes the token if it matches the expected kind.
    fn matches(&mut self, kind: Token<'_>) -> bool {
        if std::mem::discriminant(&self.current().token) == std::mem::discriminant(&kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Returns the current token.
    fn current(&self) -> &SpannedToken<'input> {
        debug_assert!(self.index < self.tokens.len(), "parser index out of bounds");
        &self.tokens[self.index]
    }

    /// Advances to the next token.
    const fn advance(&mut self) {
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Removes and returns the first element of a single-element vector.
fn remove_first(mut parts: Vec<Expr>) -> Expr {
    parts.swap_remove(0)
}

/// Validates literals compared against the status field.
///
/// Comparing `build.status` against text that is not a canonical status
/// name would never match; that is a configuration typo and fails at
/// compile time.
fn check_status_literal(lhs: &Operand, rhs: &Operand, position: usize) -> Result<(), CompileError> {
    let pairs = [(lhs, rhs), (rhs, lhs)];
    for (path_side, literal_side) in pairs {
        if let Operand::Path(ScalarPath::Field(EventField::Status)) = path_side
            && let Operand::Literal(text) = literal_side
            && BuildStatus::from_canonical(text).is_none()
        {
            return Err(CompileError::UnknownStatus {
                literal: text.clone(),
                position,
            });
        }
    }
    Ok(())
}
