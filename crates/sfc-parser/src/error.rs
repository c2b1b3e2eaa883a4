//! Scan error types.

use source_map::Span;
use thiserror::Error;

/// An error found while splitting a component into blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct SfcError {
    pub kind: SfcErrorKind,
    /// The location in the component file.
    pub span: Span,
}

impl SfcError {
    pub fn new(kind: SfcErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of scan error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SfcErrorKind {
    /// A block has no matching closing tag.
    #[error("element <{tag}> is missing end tag")]
    UnclosedBlock { tag: String },

    /// A block that may appear once appears again.
    #[error("single file component can contain only one {block} element")]
    DuplicateBlock { block: String },

    /// An opening tag is never closed with `>`.
    #[error("unterminated opening tag <{tag}")]
    UnterminatedTag { tag: String },
}
