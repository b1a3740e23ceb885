//! Integration tests for the `stencil` binary.
//!
//! Test fixtures are located in: crates/stencil-cli/tests/fixtures/

use serde::Deserialize;
use std::path::PathBuf;
use std::process::{Command, Output};

// ============================================================================
// TEST INFRASTRUCTURE
// ============================================================================

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(name: &str, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stencil"))
        .arg(fixture(name))
        .args(extra)
        .output()
        .expect("failed to run stencil")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput {
    render: String,
    static_render_fns: Vec<String>,
    errors: Vec<JsonDiagnostic>,
    tips: Vec<JsonDiagnostic>,
}

#[derive(Debug, Deserialize)]
struct JsonDiagnostic {
    #[serde(rename = "type")]
    diagnostic_type: String,
    message: String,
    start: Option<JsonPosition>,
}

#[derive(Debug, Deserialize)]
struct JsonPosition {
    line: u32,
    column: u32,
}

fn run_json(name: &str, extra: &[&str]) -> (Output, JsonOutput) {
    let mut args = vec!["--format", "json"];
    args.extend_from_slice(extra);
    let output = run(name, &args);
    let parsed = serde_json::from_str(&stdout(&output)).expect("valid JSON output");
    (output, parsed)
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
fn test_compiles_valid_template() {
    let output = run("basic.html", &[]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains(r#"(show)?_c('p',[_v("shown")]):_c('p',[_v("hidden")])"#), "{text}");
    assert!(text.contains("stencil found 0 errors and 0 tips"), "{text}");
}

#[test]
fn test_code_format_prints_only_code() {
    let output = run("basic.html", &["--format", "code"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("var render = function () {with(this){return "));
    assert!(!text.contains("stencil found"));
}

#[test]
fn test_errors_fail_the_run() {
    let (output, json) = run_json("unclosed.html", &["--source-range"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json.errors.len(), 1);
    let error = &json.errors[0];
    assert_eq!(error.diagnostic_type, "Error");
    assert_eq!(error.message, "tag <span> has no matching end tag.");
    let start = error.start.as_ref().expect("position");
    assert_eq!((start.line, start.column), (3, 3));
}

#[test]
fn test_positions_need_source_range() {
    let (_, json) = run_json("unclosed.html", &[]);
    assert!(json.errors[0].start.is_none());
}

#[test]
fn test_human_output_has_code_frame() {
    let output = run("unclosed.html", &["--source-range"]);
    let text = stdout(&output);
    assert!(text.contains("unclosed.html:3:3\nError: tag <span> has no matching end tag."), "{text}");
    assert!(text.contains("  3 |   <span>{{ msg }}\n    |   ^^^^^^"), "{text}");
}

#[test]
fn test_tips_only_fail_on_request() {
    let (output, json) = run_json("unkeyed.html", &[]);
    assert!(output.status.success());
    assert!(json.errors.is_empty());
    assert_eq!(json.tips.len(), 1);
    assert_eq!(json.tips[0].diagnostic_type, "Tip");

    let output = run("unkeyed.html", &["--fail-on-warnings"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_no_optimize_skips_hoisting() {
    let (_, optimized) = run_json("static.html", &[]);
    assert_eq!(optimized.render, "with(this){return _m(0)}");
    assert_eq!(optimized.static_render_fns.len(), 1);

    let (_, plain) = run_json("static.html", &["--no-optimize"]);
    assert!(plain.static_render_fns.is_empty());
    assert!(plain.render.contains(r#"_c('h2',[_v("Static")])"#), "{}", plain.render);
}

#[test]
fn test_custom_delimiters() {
    let (_, json) = run_json("basic.html", &["--delimiters", "[[", "]]"]);
    assert!(json.render.contains(r#"_v("{{ title }}")"#), "{}", json.render);
}

#[test]
fn test_missing_file_is_reported() {
    let output = Command::new(env!("CARGO_BIN_EXE_stencil"))
        .arg(fixture("does-not-exist.html"))
        .output()
        .expect("failed to run stencil");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"), "{stderr}");
}
