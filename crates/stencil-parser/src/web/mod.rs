//! The web (HTML/SVG) platform.
//!
//! [`WebPlatform`] knows which tags are native, unary or implicitly closed;
//! [`web_modules`] returns the class, style and `v-model` input hooks.

mod class;
mod model;
mod style;

use std::sync::Arc;

pub use class::ClassModule;
pub use model::ModelModule;
pub use style::{parse_style_text, StyleModule};

use crate::module::Module;
use crate::options::ParserOptions;
use crate::platform::Platform;

/// Returns true for every HTML element name.
pub fn is_html_tag(tag: &str) -> bool {
    matches!(
        tag,
        "html" | "body" | "base" | "head" | "link" | "meta" | "style" | "title"
            | "address" | "article" | "aside" | "footer" | "header"
            | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "hgroup" | "nav" | "section"
            | "div" | "dd" | "dl" | "dt" | "figcaption" | "figure" | "picture" | "hr" | "img"
            | "li" | "main" | "ol" | "p" | "pre" | "ul"
            | "a" | "b" | "abbr" | "bdi" | "bdo" | "br" | "cite" | "code" | "data" | "dfn" | "em"
            | "i" | "kbd" | "mark" | "q" | "rp" | "rt" | "rtc" | "ruby" | "s" | "samp" | "small"
            | "span" | "strong" | "sub" | "sup" | "time" | "u" | "var" | "wbr"
            | "area" | "audio" | "map" | "track" | "video"
            | "embed" | "object" | "param" | "source" | "canvas" | "script" | "noscript"
            | "del" | "ins"
            | "caption" | "col" | "colgroup" | "table" | "thead" | "tbody" | "td" | "th" | "tr"
            | "button" | "datalist" | "fieldset" | "form" | "input" | "label" | "legend"
            | "meter" | "optgroup" | "option" | "output" | "progress" | "select" | "textarea"
            | "details" | "dialog" | "menu" | "menuitem" | "summary"
            | "content" | "element" | "shadow" | "template" | "blockquote" | "iframe" | "tfoot"
    )
}

/// Returns true for SVG element names, compared case-insensitively.
pub fn is_svg_tag(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "svg" | "animate" | "circle" | "clippath" | "cursor" | "defs" | "desc" | "ellipse"
            | "filter" | "font-face" | "foreignobject" | "g" | "glyph" | "image" | "line"
            | "marker" | "mask" | "missing-glyph" | "path" | "pattern" | "polygon" | "polyline"
            | "rect" | "switch" | "symbol" | "text" | "textpath" | "tspan" | "use" | "view"
    )
}

/// Tag knowledge of HTML and SVG.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebPlatform;

impl Platform for WebPlatform {
    fn is_pre_tag(&self, tag: &str) -> bool {
        tag == "pre"
    }

    fn is_unary_tag(&self, tag: &str) -> bool {
        matches!(
            tag,
            "area" | "base" | "br" | "col" | "embed" | "frame" | "hr" | "img" | "input"
                | "isindex" | "keygen" | "link" | "meta" | "param" | "source" | "track" | "wbr"
        )
    }

    fn can_be_left_open_tag(&self, tag: &str) -> bool {
        matches!(
            tag,
            "colgroup" | "dd" | "dt" | "li" | "options" | "p" | "td" | "tfoot" | "th" | "thead"
                | "tr" | "source"
        )
    }

    fn is_non_phrasing_tag(&self, tag: &str) -> bool {
        matches!(
            tag,
            "address" | "article" | "aside" | "base" | "blockquote" | "body" | "caption" | "col"
                | "colgroup" | "dd" | "details" | "dialog" | "div" | "dl" | "dt" | "fieldset"
                | "figcaption" | "figure" | "footer" | "form" | "h1" | "h2" | "h3" | "h4" | "h5"
                | "h6" | "head" | "header" | "hgroup" | "hr" | "html" | "legend" | "li"
                | "menuitem" | "meta" | "optgroup" | "option" | "param" | "rp" | "rt" | "source"
                | "style" | "summary" | "tbody" | "td" | "tfoot" | "th" | "thead" | "title" | "tr"
                | "track"
        )
    }

    fn must_use_prop(&self, tag: &str, ty: Option<&str>, attr: &str) -> bool {
        let accepts_value = matches!(tag, "input" | "textarea" | "option" | "select" | "progress");
        (attr == "value" && accepts_value && ty != Some("button"))
            || (attr == "selected" && tag == "option")
            || (attr == "checked" && tag == "input")
            || (attr == "muted" && tag == "video")
    }

    fn tag_namespace(&self, tag: &str) -> Option<&'static str> {
        if is_svg_tag(tag) {
            Some("svg")
        } else if tag == "math" {
            Some("math")
        } else {
            None
        }
    }

    fn is_reserved_tag(&self, tag: &str) -> bool {
        is_html_tag(tag) || is_svg_tag(tag)
    }
}

/// The class, style and `v-model` input modules, in that order.
pub fn web_modules() -> Vec<Arc<dyn Module>> {
    vec![
        Arc::new(ClassModule),
        Arc::new(StyleModule),
        Arc::new(ModelModule),
    ]
}

/// Parser options for HTML templates.
pub fn web_parser_options() -> ParserOptions {
    ParserOptions {
        platform: Arc::new(WebPlatform),
        modules: web_modules(),
        expect_html: true,
        ..ParserOptions::default()
    }
}
