//! Whole-document balance tracking.
//!
//! Both scans are linear in document size and run from scratch on every call.

use crate::{
  config::Configuration,
  detector::{
    self,
    backticks_before,
    is_fence,
  },
  position::{
    Position,
    byte_offset,
  },
  tag::{
    self,
    CLOSE_TAG,
    OPEN_TAG,
  },
};

/// An opening tag with no matching close yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTagRecord {
  /// Lowercased tag name.
  pub name: String,
  pub line: usize,
}

/// Whether the tag opened just before `start` is closed later on.
///
/// Starts with one open instance of `name` and scans forward from `start`
/// (text before `start.col` on the first line is ignored). Per line, every
/// opening form adds one and every `</name>` removes one; the scan succeeds
/// once the tally drops to zero after a line.
pub fn count_unclosed_from<S: AsRef<str>>(lines: &[S], name: &str, start: Position) -> bool {
  let open = tag::open_pattern_for(name);
  let close = tag::close_pattern_for(name);
  let mut count: isize = 1;

  for (idx, line) in lines.iter().enumerate().skip(start.row) {
    let line = line.as_ref();
    let line = if idx == start.row {
      &line[byte_offset(line, start.col)..]
    } else {
      line
    };

    count += open.find_iter(line).count() as isize;
    count -= close.find_iter(line).count() as isize;
    if count <= 0 {
      return true;
    }
  }

  false
}

/// Every tag still open at the end of the document, oldest first.
///
/// Fence marker lines toggle the fence state and are not scanned. Opening
/// tags are dropped when excluded, self-closing, inside inline code (if
/// configured) or inside a fence (if configured). Closing tags are collected
/// from every other line, fenced or not. Once the whole document is read,
/// each close in turn removes the last open record with the same name,
/// wherever that record sits; a close with no such record is ignored.
pub fn find_unclosed_tags<S: AsRef<str>>(lines: &[S], config: &Configuration) -> Vec<OpenTagRecord> {
  let mut open: Vec<OpenTagRecord> = Vec::new();
  let mut closes: Vec<String> = Vec::new();
  let mut in_fence = false;

  for (idx, line) in lines.iter().enumerate() {
    let line = line.as_ref();
    if is_fence(line) {
      in_fence = !in_fence;
      continue;
    }

    let in_inline_code =
      |byte_idx: usize| config.skip_inline_code_spans && backticks_before(line, byte_idx) % 2 == 1;

    if !(config.skip_fenced_code_blocks && in_fence) {
      for caps in OPEN_TAG.captures_iter(line) {
        let (Some(raw), Some(name)) = (caps.get(0), caps.get(1)) else {
          continue;
        };
        let name = tag::normalize(name.as_str());
        if detector::is_excluded(&name, &config.excluded_tags)
          || detector::is_self_closing(raw.as_str())
          || in_inline_code(raw.start())
        {
          continue;
        }
        open.push(OpenTagRecord { name, line: idx });
      }
    }

    closes.extend(
      CLOSE_TAG
        .captures_iter(line)
        .filter_map(|caps| Some((caps.get(0)?, caps.get(1)?)))
        .filter(|(raw, _)| !in_inline_code(raw.start()))
        .map(|(_, name)| tag::normalize(name.as_str())),
    );
  }

  for name in &closes {
    if let Some(matched) = open.iter().rposition(|record| &record.name == name) {
      open.remove(matched);
    }
  }

  tracing::trace!("unclosed tags after scan: {:?}", open);
  open
}
