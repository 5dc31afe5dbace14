//! Single-pass string splicing over original-source offsets.

use std::ops::Range;

use crate::{Result, RewriteError};

/// A replacement of `range` in the original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit<'a> {
    pub range: Range<usize>,
    pub replacement: &'a str,
}

impl<'a> Edit<'a> {
    pub fn new(range: Range<usize>, replacement: &'a str) -> Self {
        Self { range, replacement }
    }
}

/// Apply `edits` to `source` in one pass.
///
/// All ranges refer to `source` as given; they are never adjusted for earlier
/// replacements. Edits may arrive in any order but must not overlap.
///
/// # Errors
///
/// Returns [`RewriteError::InvalidEdit`] for overlapping ranges, ranges past
/// the end of `source`, or ranges that split a UTF-8 character.
pub fn splice<'a>(source: &str, edits: impl IntoIterator<Item = Edit<'a>>) -> Result<String> {
    let mut edits: Vec<Edit<'a>> = edits.into_iter().collect();
    if edits.is_empty() {
        return Ok(source.to_string());
    }
    edits.sort_by_key(|edit| edit.range.start);

    let extra: usize = edits.iter().map(|edit| edit.replacement.len()).sum();
    let mut output = String::with_capacity(source.len() + extra);
    let mut cursor = 0;

    for edit in &edits {
        let Range { start, end } = edit.range;
        if start < cursor {
            return Err(invalid(start, end, "overlaps a previous edit"));
        }
        if start > end || end > source.len() {
            return Err(invalid(start, end, "out of bounds"));
        }
        if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return Err(invalid(start, end, "not on a character boundary"));
        }

        output.push_str(&source[cursor..start]);
        output.push_str(edit.replacement);
        cursor = end;
    }

    output.push_str(&source[cursor..]);
    Ok(output)
}

fn invalid(start: usize, end: usize, reason: &'static str) -> RewriteError {
    RewriteError::InvalidEdit { start, end, reason }
}
