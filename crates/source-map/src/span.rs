//! Byte spans over source text.

use std::ops::Range;

use text_size::TextSize;

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// A half-open byte range `[start, end)` into some source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: ByteOffset,
    /// The end byte offset (exclusive).
    pub end: ByteOffset,
}

impl Span {
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates an empty span at `offset`, the shape of an insertion point.
    #[inline]
    pub fn empty(offset: impl Into<ByteOffset>) -> Self {
        let offset = offset.into();
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Builds a span from `usize` byte positions as produced by string searches.
    ///
    /// Offsets are stored as `u32`; sources larger than 4 GiB are not supported.
    #[inline]
    pub fn from_range(range: Range<usize>) -> Self {
        Self::new(range.start as u32, range.end as u32)
    }

    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Moves the span right by `delta` bytes.
    #[inline]
    pub fn shift(self, delta: u32) -> Span {
        Span {
            start: self.start + TextSize::from(delta),
            end: self.end + TextSize::from(delta),
        }
    }

    #[inline]
    pub fn range(self) -> Range<usize> {
        u32::from(self.start) as usize..u32::from(self.end) as usize
    }

    /// Returns the text covered by this span, or `None` when it is out of
    /// bounds or splits a UTF-8 character.
    #[inline]
    pub fn slice(self, text: &str) -> Option<&str> {
        text.get(self.range())
    }
}
