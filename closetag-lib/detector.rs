//! Classification of a single tag against its surroundings.
//!
//! Everything here is a total function: a miss is `None` or `false`, never
//! an error.

use crate::{
  config::ExcludedTags,
  position::byte_offset,
  tag::{
    self,
    FENCE_MARKER,
    TRAILING_OPEN_TAG,
    TagToken,
  },
};

/// Finds the opening tag that ends exactly at `col`.
///
/// `col` is expected to sit right after a `>`. The match is anchored to the
/// cursor, it never looks further along the line.
pub fn extract_tag_at(line: &str, col: usize) -> Option<TagToken> {
  let before = &line[..byte_offset(line, col)];
  if before.ends_with("/>") || before.ends_with("</") {
    return None;
  }

  let caps = TRAILING_OPEN_TAG.captures(before)?;
  let raw = caps.get(0)?.as_str();
  let name = caps.get(1)?.as_str();
  Some(TagToken::new(name, raw))
}

/// True for `<x ... />` forms and for void elements.
pub fn is_self_closing(raw: &str) -> bool {
  if tag::ends_self_closed(raw) {
    return true;
  }
  tag::leading_name(raw).is_some_and(|name| tag::is_void_element(&name))
}

pub fn is_excluded(name: &str, excluded: &ExcludedTags) -> bool {
  excluded.contains(name)
}

/// Whether `line` sits inside a fenced code block.
///
/// Walks every line from the top of the document through `line` inclusive,
/// toggling on each fence marker. Missing lines count as plain text.
pub fn is_inside_fenced_code_block<F, S>(mut line_at: F, line: usize) -> bool
where
  F: FnMut(usize) -> Option<S>,
  S: AsRef<str>,
{
  (0..=line)
    .filter_map(&mut line_at)
    .filter(|text| is_fence(text.as_ref()))
    .count()
    % 2
    == 1
}

/// Whether `col` falls inside an inline code span.
///
/// Counts the backticks before `col` and reports an odd count as "inside".
/// This is an approximation: escaped backticks and spans delimited by runs
/// of several backticks are not recognised.
pub fn is_inside_inline_code_span(line: &str, col: usize) -> bool {
  backticks_before(line, byte_offset(line, col)) % 2 == 1
}

pub(crate) fn backticks_before(line: &str, byte_idx: usize) -> usize {
  line.as_bytes()[..byte_idx]
    .iter()
    .filter(|&&b| b == b'`')
    .count()
}

pub(crate) fn is_fence(line: &str) -> bool {
  line.trim().starts_with(FENCE_MARKER)
}
