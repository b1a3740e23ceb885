//! Source positions for the stencil template compiler.
//!
//! Every diagnostic produced while compiling a template carries an optional
//! [`Span`]. [`LineIndex`] turns those spans into line/column pairs and
//! renders code frames for human-readable output.

mod line_index;
mod span;

pub use line_index::{LineCol, LineIndex};
pub use span::{ByteOffset, Span};
