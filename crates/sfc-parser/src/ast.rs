//! Descriptor types for a parsed component file.

use indexmap::IndexMap;
use smol_str::SmolStr;
use source_map::Span;

/// The value of a block attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// A bare attribute such as `setup` or `scoped`.
    Flag,
    /// `name="value"`, with quotes removed.
    Value(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Flag => None,
            AttrValue::Value(value) => Some(value),
        }
    }
}

/// A top-level block of a component file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfcBlock {
    /// Tag name, lowercased for the known block kinds.
    pub tag: SmolStr,
    /// Attributes in source order.
    pub attrs: IndexMap<SmolStr, AttrValue>,
    /// Raw text between the opening and closing tags.
    pub content: String,
    /// The whole block including its tags.
    pub span: Span,
    /// The location of `content` in the file.
    pub content_span: Span,
}

impl SfcBlock {
    /// Creates a block that does not come from a file.
    pub fn new(tag: impl Into<SmolStr>, content: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            content: content.into(),
            span: Span::default(),
            content_span: Span::default(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// The `lang` attribute, if present with a value.
    pub fn lang(&self) -> Option<&str> {
        self.attr("lang").and_then(AttrValue::as_str)
    }

    /// Whether the block has the `setup` attribute.
    pub fn is_setup(&self) -> bool {
        self.attrs.contains_key("setup")
    }

    /// Whether the script is TypeScript (`lang="ts"` or `lang="tsx"`).
    pub fn is_typescript(&self) -> bool {
        matches!(self.lang(), Some("ts" | "tsx"))
    }
}

/// Every block of a component file, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SfcDescriptor {
    pub template: Option<SfcBlock>,
    /// `<script>` without `setup`.
    pub script: Option<SfcBlock>,
    pub script_setup: Option<SfcBlock>,
    pub styles: Vec<SfcBlock>,
    /// Any other top-level element, such as `<i18n>` or `<docs>`.
    pub custom_blocks: Vec<SfcBlock>,
}

impl SfcDescriptor {
    pub fn is_empty(&self) -> bool {
        self.template.is_none()
            && self.script.is_none()
            && self.script_setup.is_none()
            && self.styles.is_empty()
            && self.custom_blocks.is_empty()
    }
}
