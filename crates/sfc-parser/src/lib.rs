//! Vue single-file component parser for vue-spinach.
//!
//! Splits a `.vue` file into its top-level blocks (`<template>`, `<script>`,
//! `<script setup>`, `<style>` and custom blocks) without looking inside them,
//! and prints a descriptor back into a file.
//!
//! # Example
//!
//! ```
//! use sfc_parser::{generate, parse};
//!
//! let source = r#"<template>
//!   <p>{{ msg }}</p>
//! </template>
//!
//! <script>
//! export default { props: ['msg'] }
//! </script>
//! "#;
//!
//! let result = parse(source);
//! assert!(result.errors.is_empty());
//! assert_eq!(result.descriptor.script.as_ref().unwrap().lang(), None);
//! assert_eq!(generate(&result.descriptor), source);
//! ```

mod ast;
mod error;
mod parser;
mod printer;

pub use ast::{AttrValue, SfcBlock, SfcDescriptor};
pub use error::{SfcError, SfcErrorKind};
pub use printer::generate;
pub use source_map::Span;

/// The result of parsing a component file.
#[derive(Debug)]
pub struct ParseResult {
    pub descriptor: SfcDescriptor,
    /// Problems found while scanning. Blocks that could be read are still in the descriptor.
    pub errors: Vec<SfcError>,
}

/// Parses a component file into its blocks.
pub fn parse(source: &str) -> ParseResult {
    parser::Parser::new(source).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let result = parse("");
        assert!(result.errors.is_empty());
        assert!(result.descriptor.is_empty());
    }

    #[test]
    fn test_parse_all_block_kinds() {
        let result = parse(
            "<template><div/></template>\n<script>a</script>\n<script setup>b</script>\n<style scoped>c</style>\n<i18n>d</i18n>",
        );
        assert!(result.errors.is_empty());
        let descriptor = result.descriptor;
        assert!(descriptor.template.is_some());
        assert_eq!(descriptor.script.unwrap().content, "a");
        assert_eq!(descriptor.script_setup.unwrap().content, "b");
        assert_eq!(descriptor.styles.len(), 1);
        assert_eq!(descriptor.custom_blocks[0].tag, "i18n");
    }
}
