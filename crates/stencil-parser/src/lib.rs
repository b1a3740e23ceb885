//! Template parser for the stencil compiler.
//!
//! This crate turns a template string into an [`Ast`]:
//! - [`scanner`] tokenizes markup into start tags, end tags, text and
//!   comments, recovering from unclosed and stray tags
//! - [`parse`] builds the element tree from those events and resolves
//!   directives, bindings, events and slots on every element
//! - [`filter`] and [`text`] split interpolations and `|` filter chains into
//!   expressions
//! - [`web`] provides HTML/SVG tag knowledge and the class, style and
//!   `v-model` node modules
//!
//! # Example
//!
//! ```
//! use stencil_parser::{parse, web::web_parser_options};
//!
//! let result = parse(r#"<div :id="id">{{ message | upper }}</div>"#, &web_parser_options());
//! assert!(result.errors.is_empty());
//! let root = result.ast.root_element().unwrap();
//! assert_eq!(root.tag, "div");
//! assert_eq!(root.attrs[0].value, "id");
//! ```

pub mod assign;
pub mod ast;
pub mod context;
pub mod entities;
pub mod error;
pub mod filter;
pub mod helpers;
pub mod lexer;
pub mod module;
pub mod options;
mod parser;
pub mod platform;
pub mod process;
pub mod scanner;
pub mod text;
pub mod util;
pub mod web;

pub use ast::{Ast, Element, Node, NodeId};
pub use context::ParseContext;
pub use error::{CompilerError, Diagnostics, ErrorKind};
pub use module::Module;
pub use options::{ParserOptions, WhitespaceMode};
pub use parser::{parse, ParseResult};
pub use platform::{BasePlatform, Platform};
pub use stencil_span::Span;
pub use text::{Delimiters, TextExpression, TextToken};
