//! Offset to line/column lookup and code frames.

use text_size::TextSize;

use crate::{ByteOffset, Span};

/// Lines of context printed above and below the highlighted region.
const FRAME_CONTEXT: usize = 2;

/// A line and column position (0-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed column (byte offset within the line).
    pub col: u32,
}

impl LineCol {
    /// Creates a new line/column position.
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Start offsets of every line of a template.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<ByteOffset>,
    len: ByteOffset,
}

impl LineIndex {
    /// Builds the index for `text`.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        line_starts.extend(
            text.match_indices('\n')
                .map(|(offset, _)| TextSize::new((offset + 1) as u32)),
        );
        Self {
            line_starts,
            len: TextSize::new(text.len() as u32),
        }
    }

    /// Returns the number of lines in the source.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to a line/column position.
    ///
    /// Returns `None` if the offset lies past the end of the text.
    pub fn line_col(&self, offset: ByteOffset) -> Option<LineCol> {
        if offset > self.len {
            return None;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let col = u32::from(offset) - u32::from(self.line_starts[line]);
        Some(LineCol::new(line as u32, col))
    }

    /// Returns the text of `line` without its line terminator.
    pub fn line_text<'a>(&self, line: usize, text: &'a str) -> Option<&'a str> {
        let start = u32::from(*self.line_starts.get(line)?) as usize;
        let end = match self.line_starts.get(line + 1) {
            Some(next) => u32::from(*next) as usize - 1,
            None => text.len(),
        };
        text.get(start..end).map(|line| line.trim_end_matches('\r'))
    }

    /// Renders the lines around `span` with the covered columns underlined.
    ///
    /// ```text
    ///   1 | <div>
    ///   2 |   <p v-else>x</p>
    ///     |      ^^^^^^
    ///   3 | </div>
    /// ```
    pub fn code_frame(&self, text: &str, span: Span) -> String {
        let Some(start) = self.line_col(span.start) else {
            return String::new();
        };
        let last_offset = if span.is_empty() {
            span.start
        } else {
            span.end - TextSize::from(1)
        };
        let end = self.line_col(last_offset).unwrap_or(start);

        let first_line = start.line as usize;
        let last_line = end.line as usize;
        let from = first_line.saturating_sub(FRAME_CONTEXT);
        let to = (last_line + FRAME_CONTEXT).min(self.line_count() - 1);

        let mut out = Vec::new();
        for line in from..=to {
            let Some(content) = self.line_text(line, text) else {
                continue;
            };
            out.push(format!("{:>3} | {}", line + 1, content));
            if line < first_line || line > last_line {
                continue;
            }
            let col_from = if line == first_line { start.col as usize } else { 0 };
            let col_to = if line == last_line {
                end.col as usize + 1
            } else {
                content.len()
            };
            let pad = display_width(content, col_from);
            let carets = display_width(content, col_to.max(col_from + 1)) - pad;
            out.push(format!(
                "    | {}{}",
                " ".repeat(pad),
                "^".repeat(carets.max(1))
            ));
        }
        out.join("\n")
    }
}

/// Number of characters in `line[..byte_col]`, clamped to the line.
fn display_width(line: &str, byte_col: usize) -> usize {
    let byte_col = byte_col.min(line.len());
    line.char_indices()
        .take_while(|(index, _)| *index < byte_col)
        .count()
}
