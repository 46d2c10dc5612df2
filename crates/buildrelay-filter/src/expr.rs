// buildrelay-filter/src/expr.rs
// ============================================================================
// Module: Filter Expression Tree
// Description: Typed boolean expression tree over the build-event schema.
// Purpose: Evaluate compiled expressions purely and without panicking.
// Dependencies: buildrelay-core, smallvec, crate::error
// ============================================================================

//! ## Overview
//! The expression tree is produced by the compiler and evaluated per event.
//! Evaluation is a pure function of `(tree, event)`: no I/O, no mutation.
//! Boolean operators short-circuit; scalar operands resolve through the
//! fixed schema and report absence as an [`EvalFault`] instead of
//! panicking.

// ============================================================================
// SECTION: Imports
// ============================================================================

use buildrelay_core::BuildEvent;
use buildrelay_core::EventField;
use smallvec::SmallVec;

use crate::error::EvalFault;

// ============================================================================
// SECTION: Operands
// ============================================================================

/// Comparison operator between two text operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equality (`==`).
    Eq,
    /// Inequality (`!=`).
    Ne,
}

/// Scalar path into the build event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarPath {
    /// Scalar top-level field, including status and timestamps.
    Field(EventField),
    /// Lookup into the substitutions map by key.
    Substitution(String),
}

impl ScalarPath {
    /// Resolves the path on one event.
    ///
    /// # Errors
    ///
    /// Returns [`EvalFault`] when the target is legitimately absent.
    pub fn resolve(&self, event: &BuildEvent) -> Result<String, EvalFault> {
        match self {
            Self::Field(field) => field
                .scalar_text(event)
                .ok_or_else(|| EvalFault::AbsentField(field.name().to_string())),
            Self::Substitution(key) => event
                .substitutions
                .get(key)
                .cloned()
                .ok_or_else(|| EvalFault::AbsentKey(key.clone())),
        }
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Quoted string literal.
    Literal(String),
    /// Scalar path into the event.
    Path(ScalarPath),
}

impl Operand {
    /// Resolves the operand to text on one event.
    ///
    /// # Errors
    ///
    /// Returns [`EvalFault`] when a path target is absent.
    pub fn resolve(&self, event: &BuildEvent) -> Result<String, EvalFault> {
        match self {
            Self::Literal(text) => Ok(text.clone()),
            Self::Path(path) => path.resolve(event),
        }
    }
}

// ============================================================================
// SECTION: Expression Tree
// ============================================================================

/// Typed boolean expression over one build event.
///
/// # Invariants
/// - The compiler only constructs well-typed trees; every node yields a
///   boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Logical AND; short-circuits on the first false child.
    And(SmallVec<[Box<Expr>; 4]>),
    /// Logical OR; short-circuits on the first true child.
    Or(SmallVec<[Box<Expr>; 4]>),
    /// Logical NOT.
    Not(Box<Expr>),
    /// Text comparison between two operands.
    Compare {
        /// Comparison operator.
        op: CompareOp,
        /// Left operand.
        lhs: Operand,
        /// Right operand.
        rhs: Operand,
    },
    /// Membership test of a scalar inside a text-list field.
    Contains {
        /// Value searched for.
        needle: Operand,
        /// Text-list field searched in (`tags` or `images`).
        haystack: EventField,
    },
}

impl Expr {
    /// Evaluates the tree against one event.
    ///
    /// # Errors
    ///
    /// Returns [`EvalFault`] when a referenced optional field or key is
    /// absent; callers recover this to a non-match.
    pub fn eval(&self, event: &BuildEvent) -> Result<bool, EvalFault> {
        match self {
            Self::And(children) => {
                for child in children {
                    if !child.eval(event)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or(children) => {
                for child in children {
                    if child.eval(event)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Not(child) => Ok(!child.eval(event)?),
            Self::Compare {
                op,
                lhs,
                rhs,
            } => {
                let left = lhs.resolve(event)?;
                let right = rhs.resolve(event)?;
                Ok(match op {
                    CompareOp::Eq => left == right,
                    CompareOp::Ne => left != right,
                })
            }
            Self::Contains {
                needle,
                haystack,
            } => {
                let value = needle.resolve(event)?;
                let found = haystack
                    .text_list(event)
                    .is_some_and(|items| items.iter().any(|item| *item == value));
                Ok(found)
            }
        }
    }
}
