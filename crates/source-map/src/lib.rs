//! Spans, text edits and position mapping for vue-spinach.
//!
//! Rewrites never mutate source text in place. They are recorded as edits
//! against an immutable original in an [`EditBuffer`], validated for overlap,
//! and materialized in one pass. Materializing also produces a [`SourceMap`]
//! so positions in the rewritten text (for example the location of a syntax
//! error found when re-parsing it) can be traced back to the input.

mod builder;
mod edit;
mod line_index;
mod span;

pub use builder::{Mapping, SourceMap, SourceMapBuilder};
pub use edit::{Edit, EditBuffer, EditError, Materialized};
pub use line_index::{LineCol, LineIndex};
pub use span::{ByteOffset, Span};
