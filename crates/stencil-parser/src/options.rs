//! Parser configuration.

use std::sync::Arc;

use crate::module::Module;
use crate::platform::{BasePlatform, Platform};
use crate::text::Delimiters;

/// How whitespace-only text between tags is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WhitespaceMode {
    /// Keep one space for every whitespace-only run.
    Preserve,
    /// Drop runs that contain a line break and collapse the rest.
    Condense,
}

/// Options for [`parse`](crate::parse).
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Tag and attribute knowledge.
    pub platform: Arc<dyn Platform>,
    /// Node hooks, run in order.
    pub modules: Vec<Arc<dyn Module>>,
    /// Interpolation markers; `{{ }}` when unset.
    pub delimiters: Option<Delimiters>,
    /// Whitespace handling; falls back to `preserve_whitespace` when unset.
    pub whitespace: Option<WhitespaceMode>,
    /// Keep whitespace between elements as a single space.
    pub preserve_whitespace: bool,
    /// Keep comment nodes.
    pub comments: bool,
    /// Apply HTML content-model rules such as implicit `</p>`.
    pub expect_html: bool,
    /// Decode `&#10;` and `&#9;` in attribute values.
    pub should_decode_newlines: bool,
    /// Decode `&#10;` and `&#9;` in `href` of `<a>`.
    pub should_decode_newlines_for_href: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            platform: Arc::new(BasePlatform),
            modules: Vec::new(),
            delimiters: None,
            whitespace: None,
            preserve_whitespace: true,
            comments: false,
            expect_html: false,
            should_decode_newlines: false,
            should_decode_newlines_for_href: false,
        }
    }
}

impl ParserOptions {
    /// Sets the platform.
    pub fn with_platform(mut self, platform: Arc<dyn Platform>) -> Self {
        self.platform = platform;
        self
    }

    /// Appends a module.
    pub fn with_module(mut self, module: Arc<dyn Module>) -> Self {
        self.modules.push(module);
        self
    }

    /// Sets custom interpolation markers.
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = Some(delimiters);
        self
    }

    /// Sets the whitespace mode.
    pub fn with_whitespace(mut self, mode: WhitespaceMode) -> Self {
        self.whitespace = Some(mode);
        self
    }

    /// Keeps comments in the tree.
    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    /// Enables HTML content-model rules.
    pub fn with_expect_html(mut self, expect_html: bool) -> Self {
        self.expect_html = expect_html;
        self
    }
}
