//! Markup lexers using logos.
//!
//! Two small lexers cover the parts of a template that have fixed lexical
//! structure:
//! - [`MarkupToken`] recognizes the construct that starts at a `<`
//!   (comment, conditional comment, doctype, end tag, start tag open)
//! - [`AttrToken`] splits the inside of a start tag into attribute names,
//!   `=`, quoted values and the closing `>`/`/>`
//!
//! Everything between those constructs is text and is handled by the
//! scanner.

use logos::Logos;

/// The construct found at a `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos)]
pub enum MarkupToken {
    /// `<!--`
    #[token("<!--")]
    CommentOpen,

    /// `<![`, the start of a conditional comment or CDATA section.
    #[token("<![")]
    ConditionalCommentOpen,

    /// `<!DOCTYPE ...>`, case-insensitive.
    #[regex(r"<![Dd][Oo][Cc][Tt][Yy][Pp][Ee] [^>]+>")]
    Doctype,

    /// `</name ...>`
    #[regex(r"</[a-zA-Z_][\-\.0-9_a-zA-Z\x{B7}\x{C0}-\x{D6}\x{D8}-\x{F6}\x{F8}-\x{37D}\x{37F}-\x{1FFF}\x{200C}-\x{200D}\x{203F}-\x{2040}\x{2070}-\x{218F}\x{2C00}-\x{2FEF}\x{3001}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFFD}]*(:[a-zA-Z_][\-\.0-9_a-zA-Z\x{B7}\x{C0}-\x{D6}\x{D8}-\x{F6}\x{F8}-\x{37D}\x{37F}-\x{1FFF}\x{200C}-\x{200D}\x{203F}-\x{2040}\x{2070}-\x{218F}\x{2C00}-\x{2FEF}\x{3001}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFFD}]*)?[^>]*>")]
    EndTag,

    /// `<name`
    #[regex(r"<[a-zA-Z_][\-\.0-9_a-zA-Z\x{B7}\x{C0}-\x{D6}\x{D8}-\x{F6}\x{F8}-\x{37D}\x{37F}-\x{1FFF}\x{200C}-\x{200D}\x{203F}-\x{2040}\x{2070}-\x{218F}\x{2C00}-\x{2FEF}\x{3001}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFFD}]*(:[a-zA-Z_][\-\.0-9_a-zA-Z\x{B7}\x{C0}-\x{D6}\x{D8}-\x{F6}\x{F8}-\x{37D}\x{37F}-\x{1FFF}\x{200C}-\x{200D}\x{203F}-\x{2040}\x{2070}-\x{218F}\x{2C00}-\x{2FEF}\x{3001}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFFD}]*)?")]
    StartTagOpen,
}

/// A token inside a start tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos)]
#[logos(skip r"[ \t\n\r\x0C]+")]
pub enum AttrToken {
    /// `>` or `/>`
    #[regex(r"/?>")]
    TagClose,

    /// A plain attribute name such as `id`, `:title` or `@click.stop`.
    #[regex(r#"[^\s"'<>/=]+"#)]
    Name,

    /// An attribute name with a dynamic argument such as `:[key]` or
    /// `v-on:[event].once`.
    #[regex(r#"(v-[\w\-]+:|@|:|#)\[[^=\]]+\][^\s"'<>/=]*"#, priority = 10)]
    DynamicName,

    /// `=`
    #[token("=")]
    Eq,

    /// `"..."`
    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    /// `'...'`
    #[regex(r#"'[^']*'"#)]
    SingleQuoted,
}

/// Recognizes the construct at the start of `input`.
///
/// Returns the token and its length in bytes. Comment and conditional
/// comment openers only cover the opener itself.
pub fn lex_markup(input: &str) -> Option<(MarkupToken, usize)> {
    let mut lexer = MarkupToken::lexer(input);
    match lexer.next() {
        Some(Ok(token)) if lexer.span().start == 0 => Some((token, lexer.span().end)),
        _ => None,
    }
}

/// Returns true if a tag, comment or conditional comment starts `input`.
///
/// Used to decide whether a `<` inside text starts markup.
pub fn starts_markup(input: &str) -> bool {
    matches!(
        lex_markup(input),
        Some((
            MarkupToken::CommentOpen
                | MarkupToken::ConditionalCommentOpen
                | MarkupToken::EndTag
                | MarkupToken::StartTagOpen,
            _
        ))
    )
}

/// Extracts the tag name from an end tag such as `</div >`.
pub fn end_tag_name(end_tag: &str) -> &str {
    let name = end_tag.get(2..).unwrap_or_default();
    let len = name
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(name.len());
    &name[..len]
}

/// An attribute as lexed from a start tag, before entity decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexedAttr<'src> {
    /// The attribute name.
    pub name: &'src str,
    /// The unquoted raw value, empty when the attribute has none.
    pub value: &'src str,
    /// Byte offset of the name relative to the lexed input.
    pub start: usize,
    /// Byte offset just past the value relative to the lexed input.
    pub end: usize,
}

/// A complete start tag as lexed from `<name ... >`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedStartTag<'src> {
    /// The tag name as written.
    pub name: &'src str,
    /// Attributes in source order.
    pub attrs: Vec<LexedAttr<'src>>,
    /// Whether the tag ended with `/>`.
    pub self_closing: bool,
    /// Length of the whole tag in bytes.
    pub len: usize,
}

/// Lexes a start tag at the beginning of `input`.
///
/// Returns `None` when the tag is not properly terminated; the caller then
/// treats the `<` as text.
pub fn lex_start_tag(input: &str) -> Option<LexedStartTag<'_>> {
    let (MarkupToken::StartTagOpen, open_len) = lex_markup(input)? else {
        return None;
    };
    let name = &input[1..open_len];
    let body = &input[open_len..];

    let mut attrs = Vec::new();
    let mut lexer = AttrToken::lexer(body);
    loop {
        match lexer.next()? {
            Ok(AttrToken::TagClose) => {
                return Some(LexedStartTag {
                    name,
                    attrs,
                    self_closing: lexer.slice().starts_with('/'),
                    len: open_len + lexer.span().end,
                });
            }
            Ok(AttrToken::Name | AttrToken::DynamicName) => {
                let attr_name = lexer.slice();
                let start = lexer.span().start;
                let mut end = lexer.span().end;

                let mut peek = lexer.clone();
                let value = match peek.next() {
                    Some(Ok(AttrToken::Eq)) => {
                        lexer = peek;
                        let (value, value_end) = lex_attr_value(&mut lexer)?;
                        end = value_end;
                        value
                    }
                    _ => "",
                };

                attrs.push(LexedAttr {
                    name: attr_name,
                    value,
                    start: open_len + start,
                    end: open_len + end,
                });
            }
            _ => return None,
        }
    }
}

/// Lexes the value after `=`, quoted or not.
fn lex_attr_value<'src>(
    lexer: &mut logos::Lexer<'src, AttrToken>,
) -> Option<(&'src str, usize)> {
    let remainder = lexer.remainder();
    let leading = remainder.len() - remainder.trim_start().len();
    let rest = &remainder[leading..];

    if rest.starts_with('"') || rest.starts_with('\'') {
        return match lexer.next()? {
            Ok(AttrToken::DoubleQuoted | AttrToken::SingleQuoted) => {
                let quoted = lexer.slice();
                Some((&quoted[1..quoted.len() - 1], lexer.span().end))
            }
            _ => None,
        };
    }

    let len = rest
        .find(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`'))
        .unwrap_or(rest.len());
    if len == 0 {
        return None;
    }
    lexer.bump(leading + len);
    Some((&rest[..len], lexer.span().end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_markup_tokens() {
        assert_eq!(lex_markup("<!-- x -->"), Some((MarkupToken::CommentOpen, 4)));
        assert_eq!(
            lex_markup("<![if IE]>"),
            Some((MarkupToken::ConditionalCommentOpen, 3))
        );
        assert_eq!(lex_markup("<!doctype html>"), Some((MarkupToken::Doctype, 15)));
        assert_eq!(lex_markup("</div >x"), Some((MarkupToken::EndTag, 7)));
        assert_eq!(lex_markup("<my-comp a>"), Some((MarkupToken::StartTagOpen, 8)));
        assert_eq!(lex_markup("< div>"), None);
        assert_eq!(lex_markup("<1>"), None);
    }

    #[test]
    fn test_end_tag_name() {
        assert_eq!(end_tag_name("</div>"), "div");
        assert_eq!(end_tag_name("</svg:path foo>"), "svg:path");
    }

    #[test]
    fn test_start_tag_attributes() {
        let tag = lex_start_tag(r#"<input :value="a" disabled @click.stop='go()' x=1 />rest"#).unwrap();
        assert_eq!(tag.name, "input");
        assert!(tag.self_closing);
        assert_eq!(tag.len, 52);
        let attrs: Vec<_> = tag.attrs.iter().map(|a| (a.name, a.value)).collect();
        assert_eq!(
            attrs,
            vec![
                (":value", "a"),
                ("disabled", ""),
                ("@click.stop", "go()"),
                ("x", "1"),
            ]
        );
        assert_eq!(tag.attrs[0].start, 7);
        assert_eq!(tag.attrs[0].end, 17);
    }

    #[test]
    fn test_dynamic_argument_with_spaces() {
        let tag = lex_start_tag(r#"<div :[a + b]="c">"#).unwrap();
        assert_eq!(tag.attrs[0].name, ":[a + b]");
        assert_eq!(tag.attrs[0].value, "c");
    }

    #[test]
    fn test_unterminated_tag() {
        assert_eq!(lex_start_tag(r#"<div id="x"#), None);
        assert_eq!(lex_start_tag("<div id="), None);
        assert_eq!(lex_start_tag("<div"), None);
    }
}
