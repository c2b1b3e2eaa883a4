//! Position mapping between rewritten text and the text it was produced from.

use crate::{ByteOffset, Span};
use text_size::TextSize;

/// One stretch of rewritten text and the original text it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    /// The span in the rewritten output.
    pub generated: Span,
    /// The span in the original input.
    pub original: Span,
}

/// Maps offsets in rewritten text back to the original.
///
/// Only text copied verbatim maps offset-for-offset. A replaced range maps as
/// a whole: every offset inside the replacement resolves to the start of the
/// range it replaced. Inserted text has no mapping at all.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    /// Sorted by generated position.
    mappings: Vec<Mapping>,
}

impl SourceMap {
    /// Finds the original offset for an offset in the rewritten text.
    pub fn original_position(&self, generated: ByteOffset) -> Option<ByteOffset> {
        let mapping = self.find_mapping_for_generated(generated)?;
        if mapping.generated.len() != mapping.original.len() {
            return Some(mapping.original.start);
        }
        let offset_in_span = u32::from(generated) - u32::from(mapping.generated.start);
        Some(mapping.original.start + TextSize::from(offset_in_span))
    }

    /// Maps a span of the rewritten text back to the original, if both ends map.
    pub fn original_span(&self, generated: Span) -> Option<Span> {
        let start = self.original_position(generated.start)?;
        let end = if generated.is_empty() {
            start
        } else {
            self.original_position(generated.end - TextSize::from(1))? + TextSize::from(1)
        };
        Some(Span::new(start, end.max(start)))
    }

    fn find_mapping_for_generated(&self, generated: ByteOffset) -> Option<&Mapping> {
        let idx = match self
            .mappings
            .binary_search_by(|m| m.generated.start.cmp(&generated))
        {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };

        self.mappings
            .get(idx)
            .filter(|m| m.generated.start <= generated && generated < m.generated.end)
    }
}

/// Records mappings while rewritten text is appended piece by piece.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    mappings: Vec<Mapping>,
    generated_offset: ByteOffset,
}

impl SourceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records text copied unchanged from `original_start` in the input.
    pub fn add_source(&mut self, original_start: ByteOffset, text: &str) {
        if text.is_empty() {
            return;
        }
        let len = TextSize::from(text.len() as u32);
        self.mappings.push(Mapping {
            generated: Span::new(self.generated_offset, self.generated_offset + len),
            original: Span::new(original_start, original_start + len),
        });
        self.generated_offset += len;
    }

    /// Records text with no counterpart in the input.
    pub fn add_generated(&mut self, text: &str) {
        self.generated_offset += TextSize::from(text.len() as u32);
    }

    /// Records `generated_text` standing in for the `original` range.
    pub fn add_transformed(&mut self, original: Span, generated_text: &str) {
        let len = TextSize::from(generated_text.len() as u32);
        if len == TextSize::from(0) {
            return;
        }
        self.mappings.push(Mapping {
            generated: Span::new(self.generated_offset, self.generated_offset + len),
            original,
        });
        self.generated_offset += len;
    }

    pub fn build(mut self) -> SourceMap {
        self.mappings.sort_by_key(|m| m.generated.start);
        SourceMap {
            mappings: self.mappings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbatim_and_inserted_text() {
        let mut builder = SourceMapBuilder::new();
        builder.add_source(TextSize::from(0), "const a");
        builder.add_generated(" /* new */");
        builder.add_source(TextSize::from(7), " = 1");
        let map = builder.build();

        assert_eq!(
            map.original_position(TextSize::from(3)),
            Some(TextSize::from(3))
        );
        assert_eq!(map.original_position(TextSize::from(9)), None);
        assert_eq!(
            map.original_position(TextSize::from(18)),
            Some(TextSize::from(8))
        );
    }

    #[test]
    fn test_replacement_maps_to_start_of_replaced_range() {
        let mut builder = SourceMapBuilder::new();
        builder.add_source(TextSize::from(0), "x = ");
        builder.add_transformed(Span::new(4u32, 14u32), "count.value");
        let map = builder.build();

        assert_eq!(
            map.original_position(TextSize::from(10)),
            Some(TextSize::from(4))
        );
        assert_eq!(
            map.original_position(TextSize::from(15)),
            None
        );
    }

    #[test]
    fn test_original_span() {
        let mut builder = SourceMapBuilder::new();
        builder.add_generated("\n");
        builder.add_source(TextSize::from(0), "return 1");
        let map = builder.build();

        assert_eq!(
            map.original_span(Span::new(1u32, 7u32)),
            Some(Span::new(0u32, 6u32))
        );
        assert_eq!(map.original_span(Span::new(0u32, 2u32)), None);
    }
}
