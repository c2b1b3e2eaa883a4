//! Edit-list model for rewriting text.
//!
//! Every edit is a `(span, text)` pair against the untouched original. An empty
//! span is an insertion. Edits are only applied together, by [`EditBuffer::apply`],
//! which sorts them, rejects overlaps and builds the result in a single pass.

use crate::{SourceMap, SourceMapBuilder, Span};
use text_size::TextSize;
use thiserror::Error;

/// A single pending change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub text: String,
    /// Registration order, used to order insertions at the same offset.
    seq: usize,
}

impl Edit {
    #[inline]
    pub fn is_insertion(&self) -> bool {
        self.span.is_empty()
    }
}

/// Errors raised while applying edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Two edits touch the same bytes, or an insertion falls inside a replaced range.
    #[error("overlapping edits at {first:?} and {second:?}")]
    Overlap {
        /// The earlier edit.
        first: Span,
        /// The edit that overlaps it.
        second: Span,
    },

    /// An edit refers to text past the end of the original or inside a UTF-8 character.
    #[error("edit {span:?} is outside of the {len} byte source")]
    OutOfBounds { span: Span, len: usize },
}

/// The text produced by [`EditBuffer::apply`].
#[derive(Debug, Clone)]
pub struct Materialized {
    pub text: String,
    /// Maps offsets in `text` back to the original.
    pub source_map: SourceMap,
}

/// An immutable original text plus the edits to apply to it.
#[derive(Debug, Clone)]
pub struct EditBuffer<'a> {
    original: &'a str,
    edits: Vec<Edit>,
}

impl<'a> EditBuffer<'a> {
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            edits: Vec::new(),
        }
    }

    /// Returns true if nothing has been recorded yet.
    pub fn is_unchanged(&self) -> bool {
        self.edits.is_empty()
    }

    /// Inserts `text` at `offset`. Insertions at one offset keep call order.
    pub fn insert(&mut self, offset: impl Into<TextSize>, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.push(Span::empty(offset), text);
    }

    /// Replaces the text covered by `span`.
    pub fn overwrite(&mut self, span: Span, text: impl Into<String>) {
        self.push(span, text.into());
    }

    /// Deletes the text covered by `span`.
    pub fn remove(&mut self, span: Span) {
        if !span.is_empty() {
            self.push(span, String::new());
        }
    }

    fn push(&mut self, span: Span, text: String) {
        let seq = self.edits.len();
        self.edits.push(Edit { span, text, seq });
    }

    /// Validates and applies every edit.
    pub fn apply(mut self) -> Result<Materialized, EditError> {
        let len = self.original.len();
        for edit in &self.edits {
            if edit.span.slice(self.original).is_none() {
                return Err(EditError::OutOfBounds {
                    span: edit.span,
                    len,
                });
            }
        }

        // Insertions sort before a replacement that starts at the same offset.
        self.edits
            .sort_by_key(|edit| (edit.span.start, !edit.is_insertion(), edit.seq));

        let mut covered: Option<Span> = None;
        for edit in &self.edits {
            if let Some(previous) = covered {
                if edit.span.start < previous.end {
                    return Err(EditError::Overlap {
                        first: previous,
                        second: edit.span,
                    });
                }
            }
            if !edit.is_insertion() {
                covered = Some(edit.span);
            }
        }

        let added: usize = self.edits.iter().map(|edit| edit.text.len()).sum();
        let mut text = String::with_capacity(len + added);
        let mut builder = SourceMapBuilder::new();
        let mut last = 0usize;

        for edit in &self.edits {
            let range = edit.span.range();
            let kept = &self.original[last..range.start];
            builder.add_source(TextSize::from(last as u32), kept);
            text.push_str(kept);

            if edit.is_insertion() {
                builder.add_generated(&edit.text);
            } else {
                builder.add_transformed(edit.span, &edit.text);
            }
            text.push_str(&edit.text);
            last = range.end;
        }

        let rest = &self.original[last..];
        builder.add_source(TextSize::from(last as u32), rest);
        text.push_str(rest);

        Ok(Materialized {
            text,
            source_map: builder.build(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_edits_returns_original() {
        let buffer = EditBuffer::new("export default {}");
        assert!(buffer.is_unchanged());
        let result = buffer.apply().unwrap();
        assert_eq!(result.text, "export default {}");
    }

    #[test]
    fn test_edits_apply_in_offset_order() {
        let source = "this.count++";
        let mut buffer = EditBuffer::new(source);
        buffer.insert(12u32, ";");
        buffer.overwrite(Span::new(0u32, 10u32), "count.value");
        buffer.insert(0u32, "// a\n");
        let result = buffer.apply().unwrap();
        assert_eq!(result.text, "// a\ncount.value++;");
    }

    #[test]
    fn test_insertions_at_same_offset_keep_call_order() {
        let mut buffer = EditBuffer::new("ab");
        buffer.insert(1u32, "1");
        buffer.insert(1u32, "2");
        buffer.remove(Span::new(1u32, 2u32));
        buffer.insert(1u32, "3");
        assert_eq!(buffer.apply().unwrap().text, "a123");
    }

    #[test]
    fn test_overlapping_replacements_are_rejected() {
        let mut buffer = EditBuffer::new("abcdef");
        buffer.overwrite(Span::new(0u32, 4u32), "x");
        buffer.overwrite(Span::new(2u32, 6u32), "y");
        assert_eq!(
            buffer.apply().unwrap_err(),
            EditError::Overlap {
                first: Span::new(0u32, 4u32),
                second: Span::new(2u32, 6u32),
            }
        );
    }

    #[test]
    fn test_insertion_inside_replacement_is_rejected() {
        let mut buffer = EditBuffer::new("abcdef");
        buffer.remove(Span::new(1u32, 5u32));
        buffer.insert(3u32, "!");
        assert!(matches!(buffer.apply(), Err(EditError::Overlap { .. })));
    }

    #[test]
    fn test_insertion_at_end_of_replacement_is_allowed() {
        let mut buffer = EditBuffer::new("abcdef");
        buffer.remove(Span::new(1u32, 5u32));
        buffer.insert(5u32, "!");
        assert_eq!(buffer.apply().unwrap().text, "a!f");
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buffer = EditBuffer::new("abc");
        buffer.insert(4u32, "x");
        assert_eq!(
            buffer.apply().unwrap_err(),
            EditError::OutOfBounds {
                span: Span::empty(4u32),
                len: 3,
            }
        );
    }

    #[test]
    fn test_source_map_tracks_untouched_text() {
        let mut buffer = EditBuffer::new("a = this.x");
        buffer.insert(0u32, "\n");
        buffer.overwrite(Span::new(4u32, 10u32), "x.value");
        let result = buffer.apply().unwrap();
        assert_eq!(result.text, "\na = x.value");
        assert_eq!(
            result.source_map.original_position(TextSize::from(1)),
            Some(TextSize::from(0))
        );
        assert_eq!(
            result.source_map.original_position(TextSize::from(7)),
            Some(TextSize::from(4))
        );
        assert_eq!(result.source_map.original_position(TextSize::from(0)), None);
    }
}
