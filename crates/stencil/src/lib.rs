//! Compiles HTML-based templates into render functions.
//!
//! A [`Compiler`] holds platform options and runs the whole pipeline:
//! parse the trimmed template, mark static subtrees, generate code. Results
//! of [`Compiler::compile_to_functions`] are cached per template.
//!
//! # Example
//!
//! ```
//! use stencil::Compiler;
//!
//! let compiler = Compiler::web();
//! let result = compiler.compile(r#"<div id="app">{{ msg }}</div>"#, None);
//! assert!(result.errors.is_empty());
//! assert_eq!(
//!     result.render,
//!     r#"with(this){return _c('div',{attrs:{"id":"app"}},[_v(_s(msg))])}"#
//! );
//!
//! let first = compiler.compile_to_functions("<p>{{ a }}</p>", None);
//! let second = compiler.compile_to_functions("<p>{{ a }}</p>", None);
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! ```

use std::sync::Arc;

use stencil_codegen::web::web_directives;
use stencil_parser::web::{web_modules, WebPlatform};

pub mod compiler;
pub mod function;
pub mod options;

pub use compiler::{compile_with, CompileResult, Compiler};
pub use function::{check_syntax, CompiledFunctions, RenderFunction};
pub use options::CompilerOptions;
pub use stencil_parser::{CompilerError, Delimiters, ErrorKind, Span, WhitespaceMode};

/// Base options for HTML templates: the web platform, the class, style and
/// `v-model` input modules, and the `model`, `text` and `html` directives.
pub fn web_options() -> CompilerOptions {
    CompilerOptions {
        platform: Some(Arc::new(WebPlatform)),
        modules: web_modules(),
        directives: web_directives(),
        expect_html: Some(true),
        ..CompilerOptions::default()
    }
}

/// Compiles `template` with [`web_options`].
pub fn compile(template: &str, options: Option<&CompilerOptions>) -> CompileResult {
    let base = web_options();
    match options {
        Some(options) => compile_with(template, &base.merge(options)),
        None => compile_with(template, &base),
    }
}
