//! Offset to line/column conversion for diagnostics.

use crate::ByteOffset;
use text_size::TextSize;

/// A 0-indexed line and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Start offsets of every line in a text, for binary-searched lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<ByteOffset>,
    len: ByteOffset,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(TextSize::from(0))
            .chain(
                text.match_indices('\n')
                    .map(|(offset, _)| TextSize::from((offset + 1) as u32)),
            )
            .collect();

        Self {
            line_starts,
            len: TextSize::from(text.len() as u32),
        }
    }

    /// Converts a byte offset to a line/column position.
    ///
    /// Returns `None` past the end of the text.
    pub fn line_col(&self, offset: ByteOffset) -> Option<LineCol> {
        if offset > self.len {
            return None;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let line_start = self.line_starts[line];

        Some(LineCol {
            line: line as u32,
            col: u32::from(offset) - u32::from(line_start),
        })
    }
}
