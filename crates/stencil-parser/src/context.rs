//! Per-parse state shared by the tree builder and module hooks.

use stencil_span::Span;

use crate::ast::Element;
use crate::error::{Diagnostics, ErrorKind};
use crate::options::ParserOptions;
use crate::platform::Platform;
use crate::text::Delimiters;

/// Options and diagnostics of one parse.
///
/// Module hooks receive the context so they can report problems and run the
/// same attribute resolvers as the tree builder.
#[derive(Debug)]
pub struct ParseContext<'o> {
    /// The options the parse was started with.
    pub options: &'o ParserOptions,
    /// Everything reported so far.
    pub diagnostics: Diagnostics,
    warned: bool,
}

impl<'o> ParseContext<'o> {
    /// Creates a context with no diagnostics.
    pub fn new(options: &'o ParserOptions) -> Self {
        Self {
            options,
            diagnostics: Diagnostics::new(),
            warned: false,
        }
    }

    /// The platform predicates.
    pub fn platform(&self) -> &'o dyn Platform {
        self.options.platform.as_ref()
    }

    /// Custom interpolation markers, if any.
    pub fn delimiters(&self) -> Option<&'o Delimiters> {
        self.options.delimiters.as_ref()
    }

    /// Records an error.
    pub fn warn(&mut self, kind: ErrorKind, span: Option<Span>) {
        self.diagnostics.error(kind, span);
    }

    /// Records a tip.
    pub fn tip(&mut self, kind: ErrorKind, span: Option<Span>) {
        self.diagnostics.tip(kind, span);
    }

    /// Records an error unless a root-level problem was already reported.
    pub fn warn_once(&mut self, kind: ErrorKind, span: Option<Span>) {
        if !self.warned {
            self.warned = true;
            self.warn(kind, span);
        }
    }

    /// Whether `el` may be a component rather than a native element.
    pub fn maybe_component(&self, el: &Element) -> bool {
        el.component.is_some() || !self.platform().is_reserved_tag(&el.tag)
    }

    /// Whether `attr` on `el` is bound as a DOM property.
    pub fn must_use_prop(&self, el: &Element, attr: &str) -> bool {
        self.platform().must_use_prop(&el.tag, el.attr("type"), attr)
    }
}
