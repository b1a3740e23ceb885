//! Output formatting.

use crate::cli::OutputFormat;
use camino::Utf8Path;
use serde::Serialize;
use stencil::{CompileResult, CompilerError};
use stencil_span::{ByteOffset, LineCol, LineIndex};

/// A formatted diagnostic for output.
#[derive(Debug, Serialize)]
pub struct FormattedDiagnostic {
    /// The diagnostic type (Error or Tip).
    #[serde(rename = "type")]
    pub diagnostic_type: &'static str,
    /// The message.
    pub message: String,
    /// The start position, when the diagnostic has a source range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Position>,
    /// The end position, when the diagnostic has a source range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Position>,
}

/// A position in the source.
#[derive(Debug, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
    /// Byte offset.
    pub offset: u32,
}

/// Everything the JSON format prints for one template.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonOutput<'a> {
    pub filename: &'a str,
    pub render: &'a str,
    pub static_render_fns: &'a [String],
    pub errors: Vec<FormattedDiagnostic>,
    pub tips: Vec<FormattedDiagnostic>,
}

#[derive(Debug, Clone, Copy)]
enum Severity {
    Error,
    Tip,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Tip => "Tip",
        }
    }
}

/// Formats compile results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the result of compiling `source`.
    pub fn format(&self, result: &CompileResult, file_path: &Utf8Path, source: &str) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(result, file_path, source),
            OutputFormat::Json => self.format_json(result, file_path, source),
            OutputFormat::Code => format_code(result),
        }
    }

    /// Formats as diagnostics with code frames, then the code.
    fn format_human(&self, result: &CompileResult, file_path: &Utf8Path, source: &str) -> String {
        let line_index = LineIndex::new(source);
        let mut output = String::new();

        let diagnostics = result
            .errors
            .iter()
            .map(|error| (Severity::Error, error))
            .chain(result.tips.iter().map(|tip| (Severity::Tip, tip)));
        for (severity, diag) in diagnostics {
            let location = diag
                .span
                .and_then(|span| line_index.line_col(span.start).map(|start| (span, start)));
            match location {
                Some((span, start)) => {
                    output.push_str(&format!(
                        "{}:{}:{}\n{}: {}\n{}\n\n",
                        file_path,
                        start.line + 1,
                        start.col + 1,
                        severity.label(),
                        diag.message(),
                        line_index.code_frame(source, span)
                    ));
                }
                None => {
                    output.push_str(&format!(
                        "{}\n{}: {}\n\n",
                        file_path,
                        severity.label(),
                        diag.message()
                    ));
                }
            }
        }

        output.push_str(&format_code(result));
        output
    }

    /// Formats as JSON output.
    fn format_json(&self, result: &CompileResult, file_path: &Utf8Path, source: &str) -> String {
        let line_index = LineIndex::new(source);
        let output = JsonOutput {
            filename: file_path.as_str(),
            render: &result.render,
            static_render_fns: &result.static_render_fns,
            errors: format_json_diagnostics(&result.errors, Severity::Error, &line_index),
            tips: format_json_diagnostics(&result.tips, Severity::Tip, &line_index),
        };
        serde_json::to_string_pretty(&output).unwrap_or_default()
    }
}

fn format_json_diagnostics(
    diagnostics: &[CompilerError],
    severity: Severity,
    line_index: &LineIndex,
) -> Vec<FormattedDiagnostic> {
    let position = |offset: ByteOffset| {
        let at = line_index.line_col(offset).unwrap_or(LineCol::new(0, 0));
        Position {
            line: at.line + 1,
            column: at.col + 1,
            offset: u32::from(offset),
        }
    };
    diagnostics
        .iter()
        .map(|diag| FormattedDiagnostic {
            diagnostic_type: severity.label(),
            message: diag.message(),
            start: diag.span.map(|span| position(span.start)),
            end: diag.span.map(|span| position(span.end)),
        })
        .collect()
}

/// Formats the render functions as script declarations.
fn format_code(result: &CompileResult) -> String {
    let static_fns: Vec<String> = result
        .static_render_fns
        .iter()
        .map(|code| format!("function () {{{code}}}"))
        .collect();
    format!(
        "var render = function () {{{}}}\nvar staticRenderFns = [{}]\n",
        result.render,
        static_fns.join(",")
    )
}

/// Summary of a compile run.
#[derive(Debug, Default)]
pub struct CompileSummary {
    /// Number of errors.
    pub error_count: usize,
    /// Number of tips.
    pub tip_count: usize,
    /// Whether to fail on tips.
    pub fail_on_warnings: bool,
}

impl CompileSummary {
    /// Counts the diagnostics of `result`.
    pub fn new(result: &CompileResult, fail_on_warnings: bool) -> Self {
        Self {
            error_count: result.errors.len(),
            tip_count: result.tips.len(),
            fail_on_warnings,
        }
    }

    /// Whether the process should exit with an error.
    pub fn failed(&self) -> bool {
        self.error_count > 0 || (self.tip_count > 0 && self.fail_on_warnings)
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let error_word = if self.error_count == 1 {
            "error"
        } else {
            "errors"
        };
        let tip_word = if self.tip_count == 1 { "tip" } else { "tips" };

        format!(
            "====================================\nstencil found {} {} and {} {}",
            self.error_count, error_word, self.tip_count, tip_word
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stencil::CompilerOptions;

    fn compile(source: &str) -> CompileResult {
        let options = CompilerOptions::new().with_output_source_range(true);
        stencil::compile(source, Some(&options))
    }

    #[test]
    fn test_format_human() {
        let source = "<div>\n  <span>\n</div>";
        let result = compile(source);
        let output = Formatter::new(OutputFormat::Human).format(&result, Utf8Path::new("app.html"), source);
        assert!(output.starts_with("app.html:2:3\nError: tag <span> has no matching end tag.\n"));
        assert!(output.contains("  2 |   <span>\n    |   ^^^^^^"));
        assert!(output.contains("var render = function () {with(this){"));
    }

    #[test]
    fn test_format_human_without_range() {
        let source = "<div><span></div>";
        let result = stencil::compile(source, None);
        let output = Formatter::new(OutputFormat::Human).format(&result, Utf8Path::new("app.html"), source);
        assert!(output.starts_with("app.html\nError: tag <span> has no matching end tag.\n\n"));
    }

    #[test]
    fn test_format_json() {
        let source = "<div><span></div>";
        let result = compile(source);
        let output = Formatter::new(OutputFormat::Json).format(&result, Utf8Path::new("app.html"), source);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["filename"], "app.html");
        assert_eq!(value["errors"][0]["type"], "Error");
        assert_eq!(value["errors"][0]["start"]["line"], 1);
        assert_eq!(value["errors"][0]["start"]["column"], 6);
        assert_eq!(value["errors"][0]["start"]["offset"], 5);
        assert!(value["staticRenderFns"].is_array());
    }

    #[test]
    fn test_format_code() {
        let result = compile("<div><b>a</b><i>b</i></div>");
        let output = Formatter::new(OutputFormat::Code).format(&result, Utf8Path::new("app.html"), "");
        insta::assert_snapshot!(output, @r#"
        var render = function () {with(this){return _m(0)}}
        var staticRenderFns = [function () {with(this){return _c('div',[_c('b',[_v("a")]),_c('i',[_v("b")])])}}]
        "#);
    }

    #[test]
    fn test_summary() {
        let summary = CompileSummary {
            error_count: 1,
            tip_count: 3,
            fail_on_warnings: false,
        };
        let output = summary.format();
        assert!(output.contains("1 error and 3 tips"));
        assert!(summary.failed());
    }

    #[test]
    fn test_fail_on_warnings() {
        let summary = CompileSummary {
            error_count: 0,
            tip_count: 1,
            fail_on_warnings: true,
        };
        assert!(summary.failed());
        assert!(!CompileSummary::default().failed());
    }
}
