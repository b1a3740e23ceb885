//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use stencil::{CompilerOptions, Delimiters, WhitespaceMode};

/// Compile an HTML template into render functions.
#[derive(Debug, Parser)]
#[command(name = "stencil")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Template file to compile
    pub file: Utf8PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Interpolation delimiters, e.g. `--delimiters '${' '}'`
    #[arg(long, num_args = 2, value_names = ["OPEN", "CLOSE"], allow_hyphen_values = true)]
    pub delimiters: Option<Vec<String>>,

    /// Whitespace handling between tags
    #[arg(long, value_enum)]
    pub whitespace: Option<Whitespace>,

    /// Keep HTML comments in the output
    #[arg(long)]
    pub comments: bool,

    /// Skip static subtree hoisting
    #[arg(long = "no-optimize")]
    pub no_optimize: bool,

    /// Report diagnostics with source locations and code frames
    #[arg(long = "source-range")]
    pub source_range: bool,

    /// Exit with error on tips
    #[arg(long = "fail-on-warnings")]
    pub fail_on_warnings: bool,

    /// Print debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Diagnostics followed by the generated code (default)
    #[default]
    Human,
    /// JSON object with code and diagnostics
    Json,
    /// Only the generated code
    Code,
}

/// Whitespace modes.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Whitespace {
    /// Keep whitespace-only text as a single space
    Preserve,
    /// Drop whitespace-only text containing a line break
    Condense,
}

impl From<Whitespace> for WhitespaceMode {
    fn from(mode: Whitespace) -> Self {
        match mode {
            Whitespace::Preserve => WhitespaceMode::Preserve,
            Whitespace::Condense => WhitespaceMode::Condense,
        }
    }
}

impl Args {
    /// Per-call compiler options; unset flags keep the web defaults.
    pub fn compiler_options(&self) -> CompilerOptions {
        let mut options = CompilerOptions::new()
            .with_optimize(!self.no_optimize)
            .with_output_source_range(self.source_range);
        if self.comments {
            options = options.with_comments(true);
        }
        if let Some(mode) = self.whitespace {
            options = options.with_whitespace(mode.into());
        }
        if let Some([open, close]) = self.delimiters.as_deref() {
            options = options.with_delimiters(Delimiters::new(open.as_str(), close.as_str()));
        }
        options
    }
}
