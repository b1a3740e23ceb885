//! Interpolations in text nodes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::filter::parse_filters;
use crate::util::stringify;

static DEFAULT_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{\{(.+?)\}\}").unwrap());

/// Opening and closing interpolation markers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Delimiters {
    /// Opening marker, `{{` by default.
    pub open: String,
    /// Closing marker, `}}` by default.
    pub close: String,
}

impl Delimiters {
    /// Creates a custom delimiter pair.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    fn regex(&self) -> Option<Regex> {
        let pattern = format!(
            "(?s){}(.+?){}",
            regex::escape(&self.open),
            regex::escape(&self.close)
        );
        Regex::new(&pattern).ok()
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

/// One piece of an interpolated text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextToken {
    /// Literal text between interpolations.
    Literal(String),
    /// A filter-expanded binding expression.
    Binding(String),
}

/// A text node that contains at least one interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextExpression {
    /// Concatenation of every token: literals JSON-quoted, bindings wrapped in
    /// `_s(...)`, joined with `+`.
    pub expression: String,
    /// The pieces in source order.
    pub tokens: Vec<TextToken>,
}

/// Splits `text` into literal and binding pieces.
///
/// Returns `None` when `text` contains no interpolation.
pub fn parse_text(text: &str, delimiters: Option<&Delimiters>) -> Option<TextExpression> {
    let custom;
    let re: &Regex = match delimiters {
        Some(delimiters) => {
            custom = delimiters.regex()?;
            &custom
        }
        None => &*DEFAULT_TAG_RE,
    };

    let mut parts = Vec::new();
    let mut tokens = Vec::new();
    let mut last_index = 0;
    for captures in re.captures_iter(text) {
        let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if whole.start() > last_index {
            let literal = &text[last_index..whole.start()];
            parts.push(stringify(literal));
            tokens.push(TextToken::Literal(literal.to_string()));
        }
        let exp = parse_filters(inner.as_str().trim());
        parts.push(format!("_s({exp})"));
        tokens.push(TextToken::Binding(exp));
        last_index = whole.end();
    }

    if tokens.is_empty() {
        return None;
    }
    if last_index < text.len() {
        let literal = &text[last_index..];
        parts.push(stringify(literal));
        tokens.push(TextToken::Literal(literal.to_string()));
    }

    Some(TextExpression {
        expression: parts.join("+"),
        tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_has_no_expression() {
        assert_eq!(parse_text("hello world", None), None);
    }

    #[test]
    fn test_mixed_text() {
        let result = parse_text("Hi {{ name }}!", None).unwrap();
        assert_eq!(result.expression, r#""Hi "+_s(name)+"!""#);
        assert_eq!(
            result.tokens,
            vec![
                TextToken::Literal("Hi ".into()),
                TextToken::Binding("name".into()),
                TextToken::Literal("!".into()),
            ]
        );
    }

    #[test]
    fn test_binding_with_filter() {
        let result = parse_text("{{ price | currency }}", None).unwrap();
        assert_eq!(result.expression, r#"_s(_f("currency")(price))"#);
    }

    #[test]
    fn test_interpolation_across_lines() {
        let result = parse_text("{{ a +\n b }}", None).unwrap();
        assert_eq!(result.expression, "_s(a +\n b)");
    }

    #[test]
    fn test_custom_delimiters_are_escaped() {
        let delimiters = Delimiters::new("${", "}");
        let result = parse_text("x ${ y } {{ z }}", Some(&delimiters)).unwrap();
        assert_eq!(result.expression, r#""x "+_s(y)+" {{ z }}""#);
    }

    #[test]
    fn test_lazy_matching() {
        let result = parse_text("{{ a }}{{ b }}", None).unwrap();
        assert_eq!(result.expression, "_s(a)+_s(b)");
    }
}
