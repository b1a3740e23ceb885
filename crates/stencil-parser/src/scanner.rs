//! The markup tokenizer.
//!
//! [`scan`] walks the template once from left to right and reports start
//! tags, end tags, text and comments to a [`ScanHandler`]. It keeps its own
//! stack of open tags so it can close elements that were left open and
//! recover from stray end tags. It never fails: input it cannot make sense
//! of is reported as text.

use stencil_span::Span;

use crate::ast::RawAttr;
use crate::entities::decode_attr;
use crate::error::ErrorKind;
use crate::lexer::{end_tag_name, lex_markup, lex_start_tag, starts_markup, LexedStartTag, MarkupToken};
use crate::platform::Platform;

/// Receives tokenizer events in document order.
pub trait ScanHandler {
    /// A start tag. `unary` tags get no matching [`end`](Self::end).
    fn start(&mut self, tag: &str, attrs: Vec<RawAttr>, unary: bool, span: Span);

    /// An end tag, explicit or implied.
    fn end(&mut self, tag: &str, span: Span);

    /// A run of text, not yet entity-decoded.
    fn chars(&mut self, text: &str, span: Span);

    /// A comment body. Only reported when comments are kept.
    fn comment(&mut self, text: &str, span: Span);

    /// A recoverable problem with the markup.
    fn warn(&mut self, kind: ErrorKind, span: Option<Span>);
}

/// Tokenizer settings.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions<'a> {
    pub platform: &'a dyn Platform,
    pub expect_html: bool,
    pub should_decode_newlines: bool,
    pub should_decode_newlines_for_href: bool,
    pub keep_comments: bool,
}

/// Tokenizes `html`, reporting every event to `handler`.
pub fn scan<H: ScanHandler + ?Sized>(html: &str, options: &ScanOptions<'_>, handler: &mut H) {
    Scanner {
        html,
        index: 0,
        stack: Vec::new(),
        options,
        handler,
    }
    .run();
}

#[derive(Debug)]
struct OpenTag {
    tag: String,
    lower: String,
    span: Span,
}

/// Tags whose content is text up to the matching end tag.
fn is_raw_text_tag(tag: &str) -> bool {
    ["script", "style", "textarea"]
        .iter()
        .any(|raw| raw.eq_ignore_ascii_case(tag))
}

fn ignores_first_newline(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("pre") || tag.eq_ignore_ascii_case("textarea")
}

struct Scanner<'src, 'o, H: ?Sized> {
    html: &'src str,
    index: usize,
    stack: Vec<OpenTag>,
    options: &'o ScanOptions<'o>,
    handler: &'o mut H,
}

impl<'src, H: ScanHandler + ?Sized> Scanner<'src, '_, H> {
    fn rest(&self) -> &'src str {
        &self.html[self.index..]
    }

    fn advance(&mut self, n: usize) {
        self.index += n;
    }

    fn last_tag(&self) -> Option<&str> {
        self.stack.last().map(|open| open.tag.as_str())
    }

    fn run(&mut self) {
        while self.index < self.html.len() {
            let before = self.index;
            let raw_tag = self
                .last_tag()
                .filter(|tag| is_raw_text_tag(tag))
                .map(str::to_ascii_lowercase);
            match raw_tag {
                Some(tag) => self.raw_text(&tag),
                None => self.markup(),
            }

            if self.index == before {
                let rest = self.rest();
                log::trace!("no progress at offset {}, emitting the rest as text", self.index);
                self.handler.chars(rest, Span::at(self.index, self.html.len()));
                if self.stack.is_empty() {
                    self.handler.warn(
                        ErrorKind::MalformedTag {
                            rest: rest.to_string(),
                        },
                        Some(Span::empty(self.html.len())),
                    );
                }
                break;
            }
        }
        self.parse_end_tag(None, self.index, self.index);
    }

    /// Content of `script`, `style` or `textarea` up to its end tag.
    fn raw_text(&mut self, tag: &str) {
        let rest = self.rest();
        let needle = format!("</{tag}");
        let lower = rest.to_ascii_lowercase();
        let close = lower.find(&needle).and_then(|pos| {
            let after = pos + needle.len();
            rest[after..].find('>').map(|gt| (pos, after + gt + 1))
        });

        let Some((text_end, close_end)) = close else {
            self.parse_end_tag(Some(tag), self.index, self.index);
            return;
        };

        let mut text = &rest[..text_end];
        let mut text_start = self.index;
        if ignores_first_newline(tag) && text.starts_with('\n') {
            text = &text[1..];
            text_start += 1;
        }
        if !text.is_empty() {
            self.handler
                .chars(text, Span::at(text_start, self.index + text_end));
        }
        self.advance(close_end);
        let end_start = self.index - (close_end - text_end);
        self.parse_end_tag(Some(tag), end_start, self.index);
    }

    fn markup(&mut self) {
        let rest = self.rest();
        if rest.starts_with('<') && self.construct(rest) {
            return;
        }

        let text_end = match rest.find('<') {
            None => rest.len(),
            Some(mut end) => {
                loop {
                    let candidate = &rest[end..];
                    if starts_markup(candidate) {
                        break;
                    }
                    match candidate[1..].find('<') {
                        Some(next) => end += next + 1,
                        None => break,
                    }
                }
                end
            }
        };

        if text_end > 0 {
            let start = self.index;
            self.advance(text_end);
            self.handler.chars(&rest[..text_end], Span::at(start, self.index));
        }
    }

    /// Consumes the construct at a `<`, if there is a complete one.
    fn construct(&mut self, rest: &'src str) -> bool {
        let Some((token, len)) = lex_markup(rest) else {
            return false;
        };
        match token {
            MarkupToken::CommentOpen => {
                let Some(end) = rest.find("-->") else {
                    return false;
                };
                if self.options.keep_comments {
                    let body = rest.get(4..end).unwrap_or_default();
                    self.handler
                        .comment(body, Span::at(self.index, self.index + end + 3));
                }
                self.advance(end + 3);
                true
            }
            MarkupToken::ConditionalCommentOpen => match rest.find("]>") {
                Some(end) => {
                    self.advance(end + 2);
                    true
                }
                None => false,
            },
            MarkupToken::Doctype => {
                self.advance(len);
                true
            }
            MarkupToken::EndTag => {
                let start = self.index;
                self.advance(len);
                self.parse_end_tag(Some(end_tag_name(&rest[..len])), start, self.index);
                true
            }
            MarkupToken::StartTagOpen => {
                let Some(tag) = lex_start_tag(rest) else {
                    return false;
                };
                let start = self.index;
                self.advance(tag.len);
                let name = tag.name;
                self.handle_start_tag(tag, start);
                if ignores_first_newline(name) && self.rest().starts_with('\n') {
                    self.advance(1);
                }
                true
            }
        }
    }

    fn handle_start_tag(&mut self, tag: LexedStartTag<'src>, start: usize) {
        let name = tag.name;
        let platform = self.options.platform;
        if self.options.expect_html {
            if self.last_tag() == Some("p") && platform.is_non_phrasing_tag(name) {
                self.parse_end_tag(Some("p"), self.index, self.index);
            }
            if platform.can_be_left_open_tag(name) && self.last_tag() == Some(name) {
                self.parse_end_tag(Some(name), self.index, self.index);
            }
        }

        let unary = platform.is_unary_tag(name) || tag.self_closing;
        let attrs = tag
            .attrs
            .iter()
            .map(|attr| {
                let newlines = if name == "a" && attr.name == "href" {
                    self.options.should_decode_newlines_for_href
                } else {
                    self.options.should_decode_newlines
                };
                RawAttr {
                    name: attr.name.to_string(),
                    value: decode_attr(attr.value, newlines).into_owned(),
                    span: Span::at(start + attr.start, start + attr.end),
                }
            })
            .collect();

        let span = Span::at(start, self.index);
        if !unary {
            self.stack.push(OpenTag {
                tag: name.to_string(),
                lower: name.to_ascii_lowercase(),
                span,
            });
        }
        self.handler.start(name, attrs, unary, span);
    }

    /// Closes `name` and everything opened after it, or everything when
    /// `name` is `None`.
    fn parse_end_tag(&mut self, name: Option<&str>, start: usize, end: usize) {
        let span = Span::at(start, end);
        let pos = match name {
            Some(name) => {
                let lower = name.to_ascii_lowercase();
                self.stack.iter().rposition(|open| open.lower == lower)
            }
            None => Some(0),
        };

        match (pos, name) {
            (Some(pos), _) => {
                let closed: Vec<OpenTag> = self.stack.drain(pos..).collect();
                for (offset, open) in closed.iter().enumerate().rev() {
                    if offset > 0 || name.is_none() {
                        self.handler.warn(
                            ErrorKind::UnclosedTag {
                                tag: open.tag.clone(),
                            },
                            Some(open.span),
                        );
                    }
                    self.handler.end(&open.tag, span);
                }
            }
            (None, Some(name)) if name.eq_ignore_ascii_case("br") => {
                self.handler.start(name, Vec::new(), true, span);
            }
            (None, Some(name)) if name.eq_ignore_ascii_case("p") => {
                self.handler.start(name, Vec::new(), false, span);
                self.handler.end(name, span);
            }
            (None, Some(name)) => {
                log::trace!("dropping stray end tag </{name}>");
            }
            (None, None) => {}
        }
    }
}
