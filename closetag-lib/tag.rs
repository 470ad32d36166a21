//! Tag tokens and the patterns used to find them.
//!
//! Matching is a line-oriented regex heuristic, not a markup tokenizer:
//! a `>` inside a quoted attribute value ends the tag early, and tag-like
//! text inside attribute values is matched like any other tag.

use once_cell::sync::Lazy;
use regex::{
  Regex,
  RegexBuilder,
};

/// Elements that never take a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
  "wbr",
];

/// Fenced code block marker, matched against the trimmed start of a line.
pub const FENCE_MARKER: &str = "```";

const NAME: &str = r"[a-zA-Z][a-zA-Z0-9_-]*";

/// An opening tag anchored to the end of the haystack.
pub(crate) static TRAILING_OPEN_TAG: Lazy<Regex> = Lazy::new(|| {
  Regex::new(&format!(r"<({NAME})\s*([^>]*)>$")).expect("trailing open tag regex should compile")
});

/// Any opening tag, including self-closing and void ones.
pub(crate) static OPEN_TAG: Lazy<Regex> = Lazy::new(|| {
  Regex::new(&format!(r"<({NAME})\s*([^>]*?)>")).expect("open tag regex should compile")
});

pub(crate) static CLOSE_TAG: Lazy<Regex> =
  Lazy::new(|| Regex::new(&format!(r"</({NAME})>")).expect("close tag regex should compile"));

static LEADING_NAME: Lazy<Regex> =
  Lazy::new(|| Regex::new(&format!(r"<({NAME})")).expect("tag name regex should compile"));

static SELF_CLOSED: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"/\s*>$").expect("self-closed regex should compile"));

/// An opening tag found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
  /// Lowercased tag name.
  pub name: String,
  /// Tag name exactly as written.
  pub written: String,
  /// Full matched text, e.g. `<div class="x">`.
  pub raw:  String,
}

impl TagToken {
  pub fn new(written: &str, raw: &str) -> Self {
    Self {
      name:    normalize(written),
      written: written.to_string(),
      raw:     raw.to_string(),
    }
  }

  /// Closing text for this tag, keeping the case it was written with.
  pub fn closing(&self) -> String {
    closing_tag(&self.written)
  }
}

pub fn normalize(name: &str) -> String {
  name.to_lowercase()
}

pub fn closing_tag(name: &str) -> String {
  format!("</{name}>")
}

pub fn is_void_element(name: &str) -> bool {
  VOID_ELEMENTS
    .iter()
    .any(|void| void.eq_ignore_ascii_case(name))
}

/// Name of the first tag opening in `raw`, lowercased.
pub fn leading_name(raw: &str) -> Option<String> {
  LEADING_NAME
    .captures(raw)
    .and_then(|caps| caps.get(1))
    .map(|name| normalize(name.as_str()))
}

pub(crate) fn ends_self_closed(raw: &str) -> bool {
  SELF_CLOSED.is_match(raw)
}

/// Opening form of one specific tag: `<name>` or `<name attrs>`.
pub(crate) fn open_pattern_for(name: &str) -> Regex {
  RegexBuilder::new(&format!(r"<{}(?:\s[^>]*)?>", regex::escape(name)))
    .case_insensitive(true)
    .build()
    .expect("escaped tag name always forms a valid regex")
}

pub(crate) fn close_pattern_for(name: &str) -> Regex {
  RegexBuilder::new(&format!(r"</{}>", regex::escape(name)))
    .case_insensitive(true)
    .build()
    .expect("escaped tag name always forms a valid regex")
}
