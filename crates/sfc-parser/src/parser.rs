//! Byte-level scanner for top-level component blocks.
//!
//! Only the outermost elements are recognized. Text between blocks and HTML
//! comments are skipped. The contents of `<script>`, `<style>` and custom
//! blocks are raw text that ends at the first matching closing tag; the
//! contents of `<template>` may contain nested `<template>` elements.

use indexmap::IndexMap;
use smol_str::SmolStr;
use source_map::Span;

use crate::ast::{AttrValue, SfcBlock, SfcDescriptor};
use crate::error::{SfcError, SfcErrorKind};
use crate::ParseResult;

const COMMENT_OPEN: &[u8] = b"<!--";
const COMMENT_CLOSE: &[u8] = b"-->";
const TAG_TEMPLATE: &str = "template";
const TAG_SCRIPT: &str = "script";
const TAG_STYLE: &str = "style";

pub(crate) struct Parser<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    descriptor: SfcDescriptor,
    errors: Vec<SfcError>,
}

/// An opening tag that has been read up to and including its `>`.
struct OpenTag {
    name: SmolStr,
    attrs: IndexMap<SmolStr, AttrValue>,
    self_closing: bool,
    end: usize,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            descriptor: SfcDescriptor::default(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn parse(mut self) -> ParseResult {
        while let Some(lt) = self.find_byte(b'<', self.pos) {
            self.pos = lt;
            if self.bytes[lt..].starts_with(COMMENT_OPEN) {
                match find_bytes(self.bytes, COMMENT_CLOSE, lt + COMMENT_OPEN.len()) {
                    Some(close) => self.pos = close + COMMENT_CLOSE.len(),
                    None => break,
                }
                continue;
            }
            if !self.bytes.get(lt + 1).is_some_and(u8::is_ascii_alphabetic) {
                self.pos += 1;
                continue;
            }
            match self.read_block(lt) {
                Ok(block) => {
                    self.pos = u32::from(block.span.end) as usize;
                    self.add_block(block);
                }
                Err(error) => {
                    self.errors.push(error);
                    break;
                }
            }
        }

        ParseResult {
            descriptor: self.descriptor,
            errors: self.errors,
        }
    }

    fn add_block(&mut self, block: SfcBlock) {
        let slot = match block.tag.as_str() {
            TAG_TEMPLATE => &mut self.descriptor.template,
            TAG_SCRIPT if block.is_setup() => &mut self.descriptor.script_setup,
            TAG_SCRIPT => &mut self.descriptor.script,
            TAG_STYLE => {
                self.descriptor.styles.push(block);
                return;
            }
            _ => {
                self.descriptor.custom_blocks.push(block);
                return;
            }
        };

        if slot.is_none() {
            *slot = Some(block);
            return;
        }
        let setup = if block.is_setup() { " setup" } else { "" };
        self.errors.push(SfcError::new(
            SfcErrorKind::DuplicateBlock {
                block: format!("<{}{}>", block.tag, setup),
            },
            block.span,
        ));
    }

    fn read_block(&self, start: usize) -> Result<SfcBlock, SfcError> {
        let open = self.read_open_tag(start)?;
        let content_start = open.end;

        let (content_end, block_end) = if open.self_closing {
            (content_start, content_start)
        } else if open.name == TAG_TEMPLATE {
            self.find_template_end(content_start)
                .ok_or_else(|| unclosed(&open.name, start, self.source.len()))?
        } else {
            self.find_close_tag(&open.name, content_start)
                .ok_or_else(|| unclosed(&open.name, start, self.source.len()))?
        };

        Ok(SfcBlock {
            tag: open.name,
            attrs: open.attrs,
            content: self.source[content_start..content_end].to_string(),
            span: Span::from_range(start..block_end),
            content_span: Span::from_range(content_start..content_end),
        })
    }

    fn read_open_tag(&self, start: usize) -> Result<OpenTag, SfcError> {
        let bytes = self.bytes;
        let len = bytes.len();
        let mut pos = start + 1;
        while pos < len && is_tag_name_char(bytes[pos]) {
            pos += 1;
        }
        let raw_name = &self.source[start + 1..pos];
        let name = if [TAG_TEMPLATE, TAG_SCRIPT, TAG_STYLE]
            .iter()
            .any(|known| raw_name.eq_ignore_ascii_case(known))
        {
            SmolStr::new(raw_name.to_ascii_lowercase())
        } else {
            SmolStr::new(raw_name)
        };

        let unterminated = || {
            SfcError::new(
                SfcErrorKind::UnterminatedTag {
                    tag: name.to_string(),
                },
                Span::from_range(start..len),
            )
        };

        let mut attrs = IndexMap::new();
        loop {
            while pos < len && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            match bytes.get(pos) {
                None => return Err(unterminated()),
                Some(b'>') => {
                    return Ok(OpenTag {
                        name,
                        attrs,
                        self_closing: false,
                        end: pos + 1,
                    })
                }
                Some(b'/') if bytes.get(pos + 1) == Some(&b'>') => {
                    return Ok(OpenTag {
                        name,
                        attrs,
                        self_closing: true,
                        end: pos + 2,
                    })
                }
                Some(_) => {}
            }

            let attr_start = pos;
            while pos < len && !is_attr_name_end(bytes[pos]) {
                pos += 1;
            }
            if pos == attr_start {
                // A stray `/` or `=`.
                pos += 1;
                continue;
            }
            let attr_name = SmolStr::new(&self.source[attr_start..pos]);

            let mut after_name = pos;
            while after_name < len && matches!(bytes[after_name], b' ' | b'\t') {
                after_name += 1;
            }
            if bytes.get(after_name) != Some(&b'=') {
                attrs.insert(attr_name, AttrValue::Flag);
                continue;
            }

            pos = after_name + 1;
            while pos < len && matches!(bytes[pos], b' ' | b'\t') {
                pos += 1;
            }
            let value = match bytes.get(pos) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let value_start = pos + 1;
                    let value_end = self.find_byte(quote, value_start).ok_or_else(unterminated)?;
                    pos = value_end + 1;
                    &self.source[value_start..value_end]
                }
                _ => {
                    let value_start = pos;
                    while pos < len && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'>' {
                        pos += 1;
                    }
                    &self.source[value_start..pos]
                }
            };
            attrs.insert(attr_name, AttrValue::Value(value.to_string()));
        }
    }

    /// Finds `</tag>` for a raw-text block, returning the content end and block end.
    fn find_close_tag(&self, tag: &str, from: usize) -> Option<(usize, usize)> {
        let mut pos = from;
        loop {
            let lt = find_bytes(self.bytes, b"</", pos)?;
            if let Some(end) = self.match_close_tag(tag, lt) {
                return Some((lt, end));
            }
            pos = lt + 2;
        }
    }

    fn find_template_end(&self, from: usize) -> Option<(usize, usize)> {
        let mut depth = 1usize;
        let mut pos = from;
        loop {
            let lt = self.find_byte(b'<', pos)?;
            if let Some(end) = self.match_close_tag(TAG_TEMPLATE, lt) {
                depth -= 1;
                if depth == 0 {
                    return Some((lt, end));
                }
                pos = end;
                continue;
            }
            if self.match_tag_name(TAG_TEMPLATE, lt + 1) {
                let tag_end = self.find_byte(b'>', lt)?;
                if self.bytes[tag_end - 1] != b'/' {
                    depth += 1;
                }
                pos = tag_end + 1;
                continue;
            }
            pos = lt + 1;
        }
    }

    /// Matches `</tag  >` at `lt` and returns the offset after `>`.
    fn match_close_tag(&self, tag: &str, lt: usize) -> Option<usize> {
        if self.bytes.get(lt + 1) != Some(&b'/') || !self.match_tag_name(tag, lt + 2) {
            return None;
        }
        let mut pos = lt + 2 + tag.len();
        while pos < self.bytes.len() && self.bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        (self.bytes.get(pos) == Some(&b'>')).then_some(pos + 1)
    }

    /// Whether `tag` starts at `pos` and is not the prefix of a longer name.
    fn match_tag_name(&self, tag: &str, pos: usize) -> bool {
        let end = pos + tag.len();
        self.bytes
            .get(pos..end)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag.as_bytes()))
            && !self.bytes.get(end).copied().is_some_and(is_tag_name_char)
    }

    fn find_byte(&self, needle: u8, from: usize) -> Option<usize> {
        self.bytes
            .get(from..)?
            .iter()
            .position(|&b| b == needle)
            .map(|i| from + i)
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| from + i)
}

fn unclosed(tag: &str, start: usize, len: usize) -> SfcError {
    SfcError::new(
        SfcErrorKind::UnclosedBlock {
            tag: tag.to_string(),
        },
        Span::from_range(start..len),
    )
}

#[inline]
fn is_tag_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.' || b == b':'
}

#[inline]
fn is_attr_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'=' || b == b'>' || b == b'/'
}
