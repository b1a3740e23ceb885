//! Byte spans into a template source.

use std::ops::Range;

use text_size::{TextRange, TextSize};

/// A byte offset into a template.
pub type ByteOffset = TextSize;

/// A half-open byte range `[start, end)` in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: ByteOffset,
    /// The end byte offset (exclusive).
    pub end: ByteOffset,
}

impl Span {
    /// Creates a span from `TextSize`-like offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from `usize` byte indices, as produced by string slicing.
    #[inline]
    pub fn at(start: usize, end: usize) -> Self {
        Self {
            start: offset(start),
            end: offset(end.max(start)),
        }
    }

    /// Creates an empty span at the given byte index.
    #[inline]
    pub fn empty(at: usize) -> Self {
        Self::at(at, at)
    }

    /// Returns the length of this span in bytes.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the span moved forward by `by` bytes.
    ///
    /// Used to map spans of a trimmed template back onto the untrimmed input.
    #[inline]
    pub fn shifted(self, by: usize) -> Span {
        let by = offset(by);
        Span {
            start: self.start + by,
            end: self.end + by,
        }
    }

    /// Returns a span covering both this span and another.
    #[inline]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: std::cmp::min(self.start, other.start),
            end: std::cmp::max(self.end, other.end),
        }
    }

    /// Returns the span as a `usize` range suitable for slicing.
    #[inline]
    pub fn range(self) -> Range<usize> {
        u32::from(self.start) as usize..u32::from(self.end) as usize
    }

    /// Returns the text this span covers, or `None` when it is out of bounds.
    pub fn slice(self, source: &str) -> Option<&str> {
        source.get(self.range())
    }
}

fn offset(index: usize) -> TextSize {
    TextSize::new(u32::try_from(index).unwrap_or(u32::MAX))
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Self {
            start: range.start(),
            end: range.end(),
        }
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(span.start, span.end)
    }
}
