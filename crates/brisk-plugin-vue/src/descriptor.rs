//! Splitting a single-file component into its top-level blocks.

use memchr::{memchr, memmem};

use crate::{Result, VueError};

/// Maximum component size (10 MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// One top-level block of a component, such as `<template>...</template>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SfcBlock<'a> {
    /// Text between the opening and closing tag.
    pub content: &'a str,
    /// Byte offset of `content` in the component source.
    pub offset: usize,
    /// Raw attribute text of the opening tag.
    pub attrs: &'a str,
}

impl<'a> SfcBlock<'a> {
    /// Whether the opening tag carries attribute `name`, with or without a value.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs
            .split(|c: char| c.is_whitespace() || c == '/')
            .any(|token| token.split('=').next() == Some(name))
    }

    /// The `lang` attribute, if present.
    pub fn lang(&self) -> Option<&'a str> {
        let attrs = self.attrs;
        let lang_pos = attrs.find("lang=")?;
        let after_equals = attrs[lang_pos + 5..].trim_start();

        match after_equals.chars().next()? {
            quote @ ('"' | '\'') => {
                let value = &after_equals[1..];
                value.find(quote).map(|end| &value[..end])
            }
            _ => {
                let end = after_equals
                    .find(|c: char| c.is_whitespace() || c == '/')
                    .unwrap_or(after_equals.len());
                Some(&after_equals[..end])
            }
        }
    }
}

/// The blocks of a component the compiler needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SfcDescriptor<'a> {
    pub script: SfcBlock<'a>,
    pub template: SfcBlock<'a>,
}

impl<'a> SfcDescriptor<'a> {
    /// Parse a component into its `<script>` and `<template>` blocks.
    ///
    /// The first `<script>` without `setup` is used. `<template>` elements
    /// nested inside the top-level template are balanced so the block ends at
    /// its own closing tag. Other top-level blocks (`<style>`, custom blocks)
    /// are skipped.
    ///
    /// # Errors
    ///
    /// [`VueError::MalformedComponent`] when either block is missing, a block
    /// is not closed, or a block uses a language other than JavaScript/HTML.
    pub fn parse(source: &'a str) -> Result<Self> {
        if source.len() > MAX_FILE_SIZE {
            return Err(VueError::FileTooLarge {
                size: source.len(),
                max: MAX_FILE_SIZE,
            });
        }

        let mut script = None;
        let mut template = None;
        let mut pointer = 0;

        while let Some(found) = next_block(source, &mut pointer)? {
            let (name, block) = found;
            match name {
                "script" if script.is_none() && !block.has_attr("setup") => script = Some(block),
                "template" if template.is_none() => template = Some(block),
                _ => {}
            }
        }

        let script = script.ok_or_else(|| VueError::malformed("missing <script> block"))?;
        let template = template.ok_or_else(|| VueError::malformed("missing <template> block"))?;

        if let Some(lang) = script.lang().filter(|lang| !matches!(*lang, "js" | "javascript")) {
            return Err(VueError::malformed(format!(
                "unsupported <script lang=\"{lang}\">"
            )));
        }
        if let Some(lang) = template.lang().filter(|lang| *lang != "html") {
            return Err(VueError::malformed(format!(
                "unsupported <template lang=\"{lang}\">"
            )));
        }

        Ok(Self { script, template })
    }
}

/// Scan forward from `pointer` to the next complete top-level block.
fn next_block<'a>(source: &'a str, pointer: &mut usize) -> Result<Option<(&'a str, SfcBlock<'a>)>> {
    let bytes = source.as_bytes();

    loop {
        let open = match memchr(b'<', &bytes[*pointer..]) {
            Some(pos) => *pointer + pos,
            None => return Ok(None),
        };

        if bytes[open..].starts_with(b"<!--") {
            let end = memmem::find(&bytes[open + 4..], b"-->")
                .ok_or_else(|| VueError::malformed("unclosed comment"))?;
            *pointer = open + 4 + end + 3;
            continue;
        }

        let name_start = open + 1;
        let name_len = bytes[name_start..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-')
            .count();
        if name_len == 0 {
            *pointer = name_start;
            continue;
        }
        let name_end = name_start + name_len;
        let name = &source[name_start..name_end];

        let tag_end = find_closing_angle(bytes, name_end)
            .ok_or_else(|| VueError::malformed(format!("unclosed <{name}> tag")))?;
        let attrs = &source[name_end..tag_end];

        if attrs.ends_with('/') {
            *pointer = tag_end + 1;
            let block = SfcBlock {
                content: "",
                offset: tag_end + 1,
                attrs: attrs.trim_end_matches('/').trim(),
            };
            return Ok(Some((name, block)));
        }

        let content_start = tag_end + 1;
        let (content_end, after_close) = if name == "template" {
            find_template_end(bytes, content_start)
        } else {
            find_close_tag(bytes, content_start, name)
        }
        .ok_or_else(|| VueError::malformed(format!("missing </{name}>")))?;

        *pointer = after_close;
        let block = SfcBlock {
            content: &source[content_start..content_end],
            offset: content_start,
            attrs: attrs.trim(),
        };
        return Ok(Some((name, block)));
    }
}

/// Finds the closing `>` of a tag, handling quoted attributes.
fn find_closing_angle(bytes: &[u8], start: usize) -> Option<usize> {
    let mut in_quote = false;
    let mut quote_char = 0u8;

    for (i, &byte) in bytes[start..].iter().enumerate() {
        match byte {
            b'"' | b'\'' => {
                if !in_quote {
                    in_quote = true;
                    quote_char = byte;
                } else if byte == quote_char {
                    in_quote = false;
                }
            }
            b'>' if !in_quote => return Some(start + i),
            _ => {}
        }
    }

    None
}

/// Finds `</name>` and returns (start of closing tag, position after it).
fn find_close_tag(bytes: &[u8], start: usize, name: &str) -> Option<(usize, usize)> {
    let needle = format!("</{name}");
    let mut from = start;
    loop {
        let pos = from + memmem::find(&bytes[from..], needle.as_bytes())?;
        let after_name = pos + needle.len();
        if is_name_boundary(bytes.get(after_name)) {
            let close = find_closing_angle(bytes, after_name)?;
            return Some((pos, close + 1));
        }
        from = after_name;
    }
}

/// Like [`find_close_tag`] for `template`, skipping nested template pairs.
fn find_template_end(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    let open_finder = memmem::Finder::new(b"<template");
    let close_finder = memmem::Finder::new(b"</template");
    let mut depth = 0usize;
    let mut from = start;

    loop {
        let close = from + close_finder.find(&bytes[from..])?;
        let open = open_finder.find(&bytes[from..close]).map(|pos| from + pos);

        match open {
            Some(open) if is_name_boundary(bytes.get(open + 9)) => {
                let tag_end = find_closing_angle(bytes, open + 9)?;
                if bytes[tag_end - 1] != b'/' {
                    depth += 1;
                }
                from = tag_end + 1;
            }
            Some(open) => from = open + 9,
            None => {
                let after_name = close + 10;
                if !is_name_boundary(bytes.get(after_name)) {
                    from = after_name;
                    continue;
                }
                let tag_end = find_closing_angle(bytes, after_name)?;
                if depth == 0 {
                    return Some((close, tag_end + 1));
                }
                depth -= 1;
                from = tag_end + 1;
            }
        }
    }
}

fn is_name_boundary(next: Option<&u8>) -> bool {
    matches!(
        next,
        None | Some(b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/')
    )
}
