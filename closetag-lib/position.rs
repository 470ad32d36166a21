use std::{
  fmt,
  str::FromStr,
};

use ropey::RopeSlice;
use thiserror::Error;

/// A cursor location in a document of ordered lines.
/// 0-indexed, `col` counts `char`s from the start of the line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
  pub row: usize,
  pub col: usize,
}

impl Position {
  pub const fn new(row: usize, col: usize) -> Self {
    Self { row, col }
  }

  pub const fn zero() -> Self {
    Self { row: 0, col: 0 }
  }

  /// Position reached after inserting `text` at `self`.
  pub fn traverse(self, text: impl AsRef<str>) -> Self {
    let Self { mut row, mut col } = self;
    let mut chars = text.as_ref().chars().peekable();

    while let Some(ch) = chars.next() {
      match ch {
        '\n' => {
          row += 1;
          col = 0;
        },
        '\r' if chars.peek() == Some(&'\n') => {},
        _ => col += 1,
      }
    }

    Self { row, col }
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.row, self.col)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid position `{0}`, expected ROW:COL")]
pub struct ParsePositionError(String);

impl FromStr for Position {
  type Err = ParsePositionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let err = || ParsePositionError(s.to_string());
    let (row, col) = s.split_once(':').ok_or_else(err)?;
    let row = row.trim().parse().map_err(|_| err())?;
    let col = col.trim().parse().map_err(|_| err())?;
    Ok(Position::new(row, col))
  }
}

/// Splits a document into lines on `\n`, dropping a trailing `\r`.
///
/// A trailing newline yields a final empty line, which keeps indices in
/// agreement with [`ropey::Rope::len_lines`].
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
  text
    .split('\n')
    .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Byte offset of the `col`th char of `line`, clamped to the line length.
pub fn byte_offset(line: &str, col: usize) -> usize {
  line
    .char_indices()
    .nth(col)
    .map_or(line.len(), |(idx, _)| idx)
}

/// Text of `line` without its line ending.
pub fn line_without_ending(text: RopeSlice, line: usize) -> Option<String> {
  if line >= text.len_lines() {
    return None;
  }
  let mut content = String::from(text.line(line));
  if content.ends_with('\n') {
    content.pop();
    if content.ends_with('\r') {
      content.pop();
    }
  }
  Some(content)
}

/// Convert a position to a char index, or `None` when it lies outside the
/// document. The end of a line (just before its line ending) is valid.
pub fn char_idx_at_coords(text: RopeSlice, coords: Position) -> Option<usize> {
  let line = line_without_ending(text, coords.row)?;
  if coords.col > line.chars().count() {
    return None;
  }
  Some(text.line_to_char(coords.row) + coords.col)
}

/// Converts a char index into a [`Position`], clamping to the document end.
pub fn coords_at_pos(text: RopeSlice, pos: usize) -> Position {
  let pos = pos.min(text.len_chars());
  let line = text.char_to_line(pos);
  Position::new(line, pos - text.line_to_char(line))
}

#[cfg(test)]
mod test {
  use ropey::Rope;

  use super::*;

  #[test]
  fn traverse_counts_chars_and_lines() {
    assert_eq!(Position::zero().traverse("</div>"), Position::new(0, 6));
    assert_eq!(Position::new(2, 4).traverse("ab\r\ncd"), Position::new(3, 2));
    assert_eq!(Position::new(1, 1).traverse("\n"), Position::new(2, 0));
  }

  #[test]
  fn parse_and_display() {
    assert_eq!("3:14".parse::<Position>(), Ok(Position::new(3, 14)));
    assert!("3".parse::<Position>().is_err());
    assert!("a:1".parse::<Position>().is_err());
    assert_eq!(Position::new(7, 0).to_string(), "7:0");
  }

  #[test]
  fn split_lines_matches_rope_lines() {
    let text = "one\r\ntwo\n\nthree\n";
    let lines: Vec<_> = split_lines(text).collect();
    assert_eq!(lines, vec!["one", "two", "", "three", ""]);
    assert_eq!(lines.len(), Rope::from(text).len_lines());
  }

  #[test]
  fn coords_round_trip_through_rope() {
    let doc = Rope::from("héllo\nwörld");
    let text = doc.slice(..);
    assert_eq!(char_idx_at_coords(text, Position::new(1, 2)), Some(8));
    assert_eq!(coords_at_pos(text, 8), Position::new(1, 2));
    assert_eq!(char_idx_at_coords(text, Position::new(0, 5)), Some(5));
    assert_eq!(char_idx_at_coords(text, Position::new(0, 6)), None);
    assert_eq!(char_idx_at_coords(text, Position::new(2, 0)), None);
  }

  #[test]
  fn byte_offset_handles_multibyte() {
    assert_eq!(byte_offset("héllo", 2), 3);
    assert_eq!(byte_offset("abc", 10), 3);
  }
}
