//! Prints a descriptor back into a component file.

use crate::ast::{AttrValue, SfcBlock, SfcDescriptor};

/// Prints every block of `descriptor`.
///
/// Blocks are written in a fixed order: `<script setup>`, `<template>`,
/// `<script>`, styles, then custom blocks, separated by a blank line. The
/// result ends with exactly one newline.
pub fn generate(descriptor: &SfcDescriptor) -> String {
    let blocks = descriptor
        .script_setup
        .iter()
        .chain(descriptor.template.iter())
        .chain(descriptor.script.iter())
        .chain(descriptor.styles.iter())
        .chain(descriptor.custom_blocks.iter());

    let mut code = String::new();
    for block in blocks {
        write_block(&mut code, block);
        code.push_str("\n\n");
    }

    let mut code = code.trim().to_string();
    code.push('\n');
    code
}

fn write_block(out: &mut String, block: &SfcBlock) {
    out.push('<');
    out.push_str(&block.tag);
    for (name, value) in &block.attrs {
        out.push(' ');
        out.push_str(name);
        if let AttrValue::Value(value) = value {
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }
    }
    out.push('>');
    out.push_str(&block.content);
    out.push_str("</");
    out.push_str(&block.tag);
    out.push('>');
}
