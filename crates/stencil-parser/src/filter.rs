//! Filter chains in binding expressions.
//!
//! `msg | capitalize | truncate(10)` becomes
//! `_f("truncate")(_f("capitalize")(msg),10)`. The scan is a lightweight
//! lexical pass, not a JavaScript parser: it only knows enough about strings,
//! template literals, regex literals and bracket nesting to tell a filter pipe
//! apart from a `|` that belongs to the expression.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Code,
    SingleQuote,
    DoubleQuote,
    Template,
    Regex,
}

/// Whether a `/` following `c` is a division operator rather than the start
/// of a regex literal.
fn ends_operand(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ')' | '.' | '+' | '-' | '$' | ']')
}

/// Rewrites the filter chain in `exp` into nested `_f` calls.
///
/// Without any filter pipe the trimmed input is returned unchanged.
pub fn parse_filters(exp: &str) -> String {
    let chars: Vec<(usize, char)> = exp.char_indices().collect();

    let mut context = Context::Code;
    let (mut curly, mut square, mut paren) = (0i32, 0i32, 0i32);
    let mut expression: Option<String> = None;
    let mut filters: Vec<&str> = Vec::new();
    let mut last_filter = 0usize;
    let mut prev: Option<char> = None;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        let escaped = prev == Some('\\');
        let before = prev;
        prev = Some(c);

        match context {
            Context::SingleQuote => {
                if c == '\'' && !escaped {
                    context = Context::Code;
                }
            }
            Context::DoubleQuote => {
                if c == '"' && !escaped {
                    context = Context::Code;
                }
            }
            Context::Template => {
                if c == '`' && !escaped {
                    context = Context::Code;
                }
            }
            Context::Regex => {
                if c == '/' && !escaped {
                    context = Context::Code;
                }
            }
            Context::Code => {
                let next = chars.get(i + 1).map(|&(_, n)| n);
                if c == '|'
                    && next != Some('|')
                    && before != Some('|')
                    && curly == 0
                    && square == 0
                    && paren == 0
                {
                    match expression {
                        None => expression = Some(exp[..pos].trim().to_string()),
                        Some(_) => filters.push(exp[last_filter..pos].trim()),
                    }
                    last_filter = pos + 1;
                    continue;
                }

                match c {
                    '"' => context = Context::DoubleQuote,
                    '\'' => context = Context::SingleQuote,
                    '`' => context = Context::Template,
                    '(' => paren += 1,
                    ')' => paren -= 1,
                    '[' => square += 1,
                    ']' => square -= 1,
                    '{' => curly += 1,
                    '}' => curly -= 1,
                    '/' => {
                        let operand = chars[..i].iter().rev().map(|&(_, p)| p).find(|&p| p != ' ');
                        if !operand.is_some_and(ends_operand) {
                            context = Context::Regex;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    let mut expression = match expression {
        None => return exp.trim().to_string(),
        Some(expression) => expression,
    };
    if last_filter != 0 {
        filters.push(exp[last_filter..].trim());
    }
    for filter in filters {
        expression = wrap_filter(&expression, filter);
    }
    expression
}

fn wrap_filter(exp: &str, filter: &str) -> String {
    match filter.find('(') {
        None => format!("_f(\"{filter}\")({exp})"),
        Some(open) => {
            let name = &filter[..open];
            let args = &filter[open + 1..];
            if args == ")" {
                format!("_f(\"{name}\")({exp})")
            } else {
                format!("_f(\"{name}\")({exp},{args}")
            }
        }
    }
}
