// buildrelay-filter/tests/compile.rs
// ============================================================================
// Test Module: Filter Compilation
// Coverage: Type checking, unknown fields, limits, and syntax errors.
// ============================================================================
//! ## Overview
//! Integration tests for compile-time behavior of the filter engine.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use buildrelay_filter::CompileError;
use buildrelay_filter::compile;
use support::TestResult;
use support::ensure;

#[test]
fn empty_expression_is_a_compile_error() -> TestResult {
    ensure(
        matches!(compile(""), Err(CompileError::EmptyExpression)),
        "empty input must fail to compile",
    )?;
    ensure(
        matches!(compile("   \t\n"), Err(CompileError::EmptyExpression)),
        "whitespace-only input must fail to compile",
    )
}

#[test]
fn non_boolean_expression_is_a_compile_error() -> TestResult {
    ensure(
        matches!(compile("build.status"), Err(CompileError::NotBoolean)),
        "a bare path does not type as boolean",
    )?;
    ensure(
        matches!(compile("\"SUCCESS\""), Err(CompileError::NotBoolean)),
        "a bare literal does not type as boolean",
    )
}

#[test]
fn unknown_field_is_a_compile_error_not_a_runtime_error() -> TestResult {
    let result = compile("build.does_not_exist == \"x\"");
    match result {
        Err(CompileError::UnknownField {
            name, ..
        }) => ensure(name == "does_not_exist", "error names the unknown field"),
        other => ensure(false, format!("expected UnknownField, got {other:?}")),
    }
}

#[test]
fn unknown_root_identifier_is_rejected() -> TestResult {
    ensure(
        matches!(compile("status == \"SUCCESS\""), Err(CompileError::UnknownField { .. })),
        "paths must be rooted at `build`",
    )
}

#[test]
fn status_literals_must_be_canonical_names() -> TestResult {
    ensure(
        matches!(
            compile("build.status == \"success\""),
            Err(CompileError::UnknownStatus { .. })
        ),
        "lowercase status text is a typo, not a match-nothing filter",
    )?;
    ensure(compile("build.status == \"SUCCESS\"").is_ok(), "canonical names compile")
}

#[test]
fn list_fields_only_support_membership() -> TestResult {
    ensure(
        matches!(compile("build.tags == \"x\""), Err(CompileError::KindMismatch { .. })),
        "equality on a list field is a kind mismatch",
    )?;
    ensure(compile("\"release\" in build.tags").is_ok(), "membership on a list compiles")
}

#[test]
fn substitutions_require_a_key_lookup() -> TestResult {
    ensure(
        compile("build.substitutions['_BRANCH'] == \"main\"").is_ok(),
        "keyed substitution lookup compiles",
    )?;
    ensure(
        compile("build.substitutions == \"main\"").is_err(),
        "substitutions without a key must not compile",
    )
}

#[test]
fn step_list_is_not_addressable() -> TestResult {
    ensure(
        matches!(compile("build.steps == \"x\""), Err(CompileError::KindMismatch { .. })),
        "the step list is out of the filter language",
    )
}

#[test]
fn trailing_input_is_rejected() -> TestResult {
    ensure(
        matches!(
            compile("build.status == \"SUCCESS\" build"),
            Err(CompileError::TrailingInput { .. })
        ),
        "trailing tokens after a complete expression must fail",
    )
}

#[test]
fn unterminated_string_is_rejected() -> TestResult {
    ensure(
        matches!(
            compile("build.status == \"SUCCESS"),
            Err(CompileError::UnterminatedString { .. })
        ),
        "unterminated literals must fail",
    )
}

#[test]
fn boolean_composition_compiles() -> TestResult {
    let source = "(build.status == \"SUCCESS\" || build.status == \"FAILURE\") \
                  && !(build.project_id == \"sandbox\")";
    ensure(compile(source).is_ok(), "nested boolean composition compiles")
}

#[test]
fn deep_nesting_is_bounded() -> TestResult {
    let mut source = String::new();
    for _ in 0 .. 64 {
        source.push('(');
    }
    source.push_str("build.status == \"SUCCESS\"");
    for _ in 0 .. 64 {
        source.push(')');
    }
    ensure(
        matches!(compile(&source), Err(CompileError::NestingTooDeep { .. })),
        "nesting beyond the limit must fail",
    )
}
