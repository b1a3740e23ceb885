//! stencil: compile HTML templates into render functions.

mod cli;
mod output;

use clap::Parser;
use cli::Args;
use miette::{IntoDiagnostic, Result, WrapErr};
use output::{CompileSummary, Formatter};

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let source = std::fs::read_to_string(&args.file)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", args.file))?;
    log::debug!("read {} ({} bytes)", args.file, source.len());

    let options = args.compiler_options();
    let result = stencil::compile(&source, Some(&options));

    let formatter = Formatter::new(args.format);
    print!("{}", formatter.format(&result, &args.file, &source));

    let summary = CompileSummary::new(&result, args.fail_on_warnings);
    if args.format == cli::OutputFormat::Human {
        println!("{}", summary.format());
    }
    if summary.failed() {
        std::process::exit(1);
    }
    Ok(())
}
