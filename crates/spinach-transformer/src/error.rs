//! Transformation errors.

use sfc_parser::SfcError;
use smol_str::SmolStr;
use source_map::{EditError, Span};
use thiserror::Error;

/// An error that stops a component from being transformed.
///
/// Spans are byte ranges. Errors returned by [`crate::transform_sfc`] point
/// into the component file; those from [`crate::transform_script`] point into
/// the script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error(transparent)]
    Sfc(#[from] SfcError),

    #[error("failed to parse script: {message}")]
    ScriptParse { message: String, span: Span },

    #[error("the default export must be an object literal, or a call with one object literal argument")]
    InvalidDefaultExport { span: Span },

    #[error("\"{option}\" function needs to contain a return statement at the top level")]
    MissingReturn { option: SmolStr, span: Span },

    #[error("\"{option}\" function needs to return an object literal")]
    ReturnNotObject { option: SmolStr, span: Span },

    #[error("cannot generate a setup() function while the component already has a <script setup> block")]
    ScriptSetupExists { span: Span },

    #[error("property \"{name}\" is defined more than once")]
    DuplicateProperty { name: SmolStr },

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("generated code failed to parse: {message}")]
    Reparse { message: String, span: Option<Span> },
}

impl TransformError {
    /// The location the error refers to, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            TransformError::Sfc(error) => Some(error.span),
            TransformError::ScriptParse { span, .. }
            | TransformError::InvalidDefaultExport { span }
            | TransformError::MissingReturn { span, .. }
            | TransformError::ReturnNotObject { span, .. }
            | TransformError::ScriptSetupExists { span } => Some(*span),
            TransformError::Reparse { span, .. } => *span,
            TransformError::DuplicateProperty { .. } | TransformError::Edit(_) => None,
        }
    }

    /// Moves a script-relative span into file coordinates.
    pub(crate) fn offset_by(self, delta: u32) -> Self {
        match self {
            TransformError::ScriptParse { message, span } => TransformError::ScriptParse {
                message,
                span: span.shift(delta),
            },
            TransformError::InvalidDefaultExport { span } => TransformError::InvalidDefaultExport {
                span: span.shift(delta),
            },
            TransformError::MissingReturn { option, span } => TransformError::MissingReturn {
                option,
                span: span.shift(delta),
            },
            TransformError::ReturnNotObject { option, span } => TransformError::ReturnNotObject {
                option,
                span: span.shift(delta),
            },
            TransformError::Reparse { message, span } => TransformError::Reparse {
                message,
                span: span.map(|span| span.shift(delta)),
            },
            other => other,
        }
    }
}
