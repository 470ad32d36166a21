//! The editor surface the engine drives.
//!
//! [`EditorHost`] is what an integration layer implements for its editor.
//! [`Document`] is a self-contained implementation over a [`Rope`], used by
//! the terminal client and by tests.

use ropey::Rope;
use thiserror::Error;

use crate::position::{
  Position,
  char_idx_at_coords,
  coords_at_pos,
  line_without_ending,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum HostError {
  #[error("position {0} is outside the document")]
  OutOfBounds(Position),
}

pub type Result<T> = std::result::Result<T, HostError>;

pub trait EditorHost {
  fn cursor(&self) -> Position;

  /// Text of `line` without its line ending, `None` past the last line.
  fn line_text(&self, line: usize) -> Option<String>;

  fn text(&self) -> String;

  /// Inserts `text` at `at`, shifting what follows. Nothing is overwritten.
  fn insert_text(&mut self, text: &str, at: Position) -> Result<()>;

  fn set_cursor(&mut self, pos: Position) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct Document {
  text:   Rope,
  cursor: Position,
}

impl Document {
  pub fn new(text: &str) -> Self {
    Self {
      text:   Rope::from_str(text),
      cursor: Position::zero(),
    }
  }

  /// A document with the cursor at the very end.
  pub fn with_cursor_at_end(text: &str) -> Self {
    let text = Rope::from_str(text);
    let cursor = coords_at_pos(text.slice(..), text.len_chars());
    Self { text, cursor }
  }

  pub fn rope(&self) -> &Rope {
    &self.text
  }

  /// Inserts `text` at the cursor and moves the cursor past it, the way a
  /// keystroke or a paste would.
  pub fn type_text(&mut self, text: &str) -> Result<()> {
    let at = self.cursor;
    self.insert_text(text, at)?;
    self.cursor = at.traverse(text);
    Ok(())
  }

  fn char_idx(&self, pos: Position) -> Result<usize> {
    char_idx_at_coords(self.text.slice(..), pos).ok_or(HostError::OutOfBounds(pos))
  }
}

impl EditorHost for Document {
  fn cursor(&self) -> Position {
    self.cursor
  }

  fn line_text(&self, line: usize) -> Option<String> {
    line_without_ending(self.text.slice(..), line)
  }

  fn text(&self) -> String {
    self.text.to_string()
  }

  fn insert_text(&mut self, text: &str, at: Position) -> Result<()> {
    let idx = self.char_idx(at)?;
    self.text.insert(idx, text);
    Ok(())
  }

  fn set_cursor(&mut self, pos: Position) -> Result<()> {
    self.char_idx(pos)?;
    self.cursor = pos;
    Ok(())
  }
}
