//! String helpers shared by the parser and the code generator.

/// Quotes `text` as a JSON string literal.
pub fn stringify(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

/// Converts `kebab-case` to `camelCase`.
pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if c == '-' && (next.is_ascii_alphanumeric() || next == '_') => {
                out.extend(next.to_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Converts `camelCase` to `kebab-case`.
pub fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_is_word = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_is_word {
            out.push('-');
        }
        out.extend(c.to_lowercase());
        prev_is_word = c.is_ascii_alphanumeric() || c == '_';
    }
    out
}

/// Escapes the JavaScript line terminators U+2028 and U+2029 that are legal in
/// JSON but not in string literals of older engines.
pub fn escape_line_terminators(code: &str) -> String {
    code.replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Returns true if `text` contains only whitespace.
pub(crate) fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
