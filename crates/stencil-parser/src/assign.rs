//! Assignment code for two-way bindings.

/// A model expression split into the object and the key being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPath<'a> {
    /// The object expression, or the whole expression without a key.
    pub exp: &'a str,
    /// The key expression; a quoted name for `.prop` access.
    pub key: Option<String>,
}

/// Splits `a.b`, `a[b]` and `a["b"][c]` into object and last key.
///
/// Expressions that do not end in member access come back whole with no
/// key.
pub fn parse_model(value: &str) -> ModelPath<'_> {
    let val = value.trim();
    let bytes = val.as_bytes();
    let len = bytes.len();

    let ends_with_bracket = val.rfind(']').is_some_and(|last| last + 1 >= len);
    if !val.contains('[') || !ends_with_bracket {
        return match val.rfind('.') {
            Some(dot) => ModelPath {
                exp: &val[..dot],
                key: Some(format!("\"{}\"", &val[dot + 1..])),
            },
            None => ModelPath { exp: val, key: None },
        };
    }

    let mut scanner = BracketScanner {
        bytes,
        index: 0,
        expression_pos: 0,
        expression_end_pos: 0,
    };
    scanner.run();
    let start = scanner.expression_pos;
    let end = scanner.expression_end_pos.max(start + 1);
    ModelPath {
        exp: &val[..start],
        key: val.get(start + 1..end).map(str::to_string),
    }
}

/// Scans for the outermost trailing `[...]`, skipping quoted strings.
///
/// Like the reference algorithm, the first byte is never inspected: `next`
/// advances before reading.
struct BracketScanner<'a> {
    bytes: &'a [u8],
    index: usize,
    expression_pos: usize,
    expression_end_pos: usize,
}

impl BracketScanner<'_> {
    fn eof(&self) -> bool {
        self.index >= self.bytes.len()
    }

    fn next(&mut self) -> Option<u8> {
        self.index += 1;
        self.bytes.get(self.index).copied()
    }

    fn run(&mut self) {
        while !self.eof() {
            match self.next() {
                Some(quote @ (b'"' | b'\'')) => self.skip_string(quote),
                Some(b'[') => self.bracket(),
                _ => {}
            }
        }
    }

    fn bracket(&mut self) {
        let mut depth = 1;
        self.expression_pos = self.index;
        while !self.eof() {
            match self.next() {
                Some(quote @ (b'"' | b'\'')) => {
                    self.skip_string(quote);
                    continue;
                }
                Some(b'[') => depth += 1,
                Some(b']') => depth -= 1,
                _ => {}
            }
            if depth == 0 {
                self.expression_end_pos = self.index;
                break;
            }
        }
    }

    fn skip_string(&mut self, quote: u8) {
        while !self.eof() {
            if self.next() == Some(quote) {
                break;
            }
        }
    }
}

/// Generates code that assigns `assignment` to the model expression `value`.
///
/// Member writes go through `$set` so new keys stay reactive.
pub fn gen_assignment_code(value: &str, assignment: &str) -> String {
    let path = parse_model(value);
    match path.key {
        None => format!("{value}={assignment}"),
        Some(key) => format!("$set({}, {key}, {assignment})", path.exp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_model() {
        assert_eq!(parse_model("msg"), ModelPath { exp: "msg", key: None });
        assert_eq!(
            parse_model("a.b.c"),
            ModelPath {
                exp: "a.b",
                key: Some("\"c\"".into())
            }
        );
        assert_eq!(
            parse_model("a[b]"),
            ModelPath {
                exp: "a",
                key: Some("b".into())
            }
        );
        assert_eq!(
            parse_model("a['x]'][i]"),
            ModelPath {
                exp: "a['x]']",
                key: Some("i".into())
            }
        );
        assert_eq!(
            parse_model("a[b].c"),
            ModelPath {
                exp: "a[b]",
                key: Some("\"c\"".into())
            }
        );
    }

    #[test]
    fn test_gen_assignment_code() {
        assert_eq!(gen_assignment_code("msg", "$event"), "msg=$event");
        assert_eq!(
            gen_assignment_code("form.name", "$event"),
            "$set(form, \"name\", $event)"
        );
        assert_eq!(
            gen_assignment_code("list[i]", "$$v"),
            "$set(list, i, $$v)"
        );
    }
}
