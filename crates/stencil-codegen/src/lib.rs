//! Optimizer and code generator for the stencil template compiler.
//!
//! [`optimize`] marks the static parts of a parsed tree, then [`generate`]
//! turns the tree into render code.
//!
//! # Example
//!
//! ```
//! use stencil_codegen::{generate, optimize, web::web_codegen_options, OptimizerOptions};
//! use stencil_parser::{parse, web::web_parser_options};
//!
//! let parser_options = web_parser_options();
//! let mut ast = parse("<div><p>a</p><p>b</p></div>", &parser_options).ast;
//! optimize(
//!     &mut ast,
//!     &OptimizerOptions::new(parser_options.platform.clone(), &parser_options.modules),
//! );
//! let result = generate(&mut ast, &web_codegen_options());
//! assert_eq!(result.render, "with(this){return _m(0)}");
//! assert_eq!(
//!     result.static_render_fns,
//!     vec!["with(this){return _c('div',[_c('p',[_v(\"a\")]),_c('p',[_v(\"b\")])])}"]
//! );
//! ```

pub mod codegen;
pub mod optimizer;
pub mod web;

pub use codegen::{generate, CodegenOptions, CodegenResult, DirectiveContext, DirectiveGen, DirectiveMap};
pub use optimizer::{optimize, OptimizerOptions};
