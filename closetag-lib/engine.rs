//! Auto-close orchestration.
//!
//! [`TagEngine`] has two entry points:
//!
//! - [`TagEngine::handle_editor_changed`] runs after a `>` keystroke or a
//!   paste and closes the tag that was just opened at the cursor.
//! - [`TagEngine::close_nearest_unclosed_tag`] runs on an explicit command and
//!   closes the most recently opened tag left unclosed anywhere in the
//!   document, at the cursor.
//!
//! Each successful run makes exactly one insertion and one cursor move on the
//! [`EditorHost`]. Every check that fails is reported as a [`SkipReason`].
//!
//! # Example
//!
//! ```
//! use closetag_lib::{
//!   Configuration,
//!   TagEngine,
//!   host::{
//!     Document,
//!     EditorHost,
//!   },
//! };
//!
//! let mut engine = TagEngine::new(Configuration::default());
//! let mut doc = Document::with_cursor_at_end("<section>");
//!
//! engine.arm();
//! let outcome = engine.handle_editor_changed(&mut doc).unwrap();
//! assert!(outcome.is_inserted());
//! assert_eq!(doc.text(), "<section></section>");
//! ```

use thiserror::Error;

use crate::{
  balancer::{
    count_unclosed_from,
    find_unclosed_tags,
  },
  config::{
    Configuration,
    CursorPlacement,
  },
  debounce::{
    DebounceGuard,
    GuardToken,
  },
  detector::{
    extract_tag_at,
    is_excluded,
    is_inside_fenced_code_block,
    is_inside_inline_code_span,
    is_self_closing,
  },
  host::{
    EditorHost,
    HostError,
  },
  position::{
    Position,
    split_lines,
  },
  tag::closing_tag,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
  #[error(transparent)]
  Host(#[from] HostError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// No `>` keystroke or paste preceded the change.
  NotArmed,
  /// The cursor is where the last closing tag was inserted.
  Debounced,
  /// The character before the cursor is not `>`.
  NoClosingBracket,
  NoOpenTag,
  SelfClosing,
  Excluded,
  FencedCode,
  InlineCode,
  /// The document has no unclosed tags.
  NothingUnclosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Inserted {
    closing: String,
    at:      Position,
    cursor:  Position,
    /// Set for auto-close insertions; pass it back to
    /// [`TagEngine::clear_debounce`] once the guard delay has passed.
    guard:   Option<GuardToken>,
  },
  Skipped(SkipReason),
}

impl Outcome {
  pub fn is_inserted(&self) -> bool {
    matches!(self, Self::Inserted { .. })
  }

  pub fn guard(&self) -> Option<GuardToken> {
    match self {
      Self::Inserted { guard, .. } => *guard,
      Self::Skipped(_) => None,
    }
  }

  pub fn skip_reason(&self) -> Option<SkipReason> {
    match self {
      Self::Skipped(reason) => Some(*reason),
      Self::Inserted { .. } => None,
    }
  }
}

#[derive(Debug, Default)]
pub struct TagEngine {
  config: Configuration,
  guard:  DebounceGuard,
  armed:  bool,
}

impl TagEngine {
  pub fn new(config: Configuration) -> Self {
    Self {
      config,
      guard: DebounceGuard::new(),
      armed: false,
    }
  }

  pub fn config(&self) -> &Configuration {
    &self.config
  }

  pub fn set_config(&mut self, config: Configuration) {
    tracing::debug!("tag engine config updated: {:?}", config);
    self.config = config;
  }

  /// Marks the next change notification as a candidate for auto-closing.
  /// Call on a `>` keystroke or a paste.
  pub fn arm(&mut self) {
    self.armed = true;
  }

  pub fn is_armed(&self) -> bool {
    self.armed
  }

  pub fn debounce_guard(&self) -> &DebounceGuard {
    &self.guard
  }

  /// Releases the guard set by an earlier insertion. Returns `false` when a
  /// newer insertion has replaced it.
  pub fn clear_debounce(&mut self, token: GuardToken) -> bool {
    let cleared = self.guard.clear(token);
    tracing::trace!(
      "debounce clear for generation {}: {}",
      token.generation(),
      cleared
    );
    cleared
  }

  /// Change notification from the host. Only acts when armed, and consumes
  /// the arming unless the cursor is still on the last handled position.
  pub fn handle_editor_changed<H: EditorHost + ?Sized>(&mut self, host: &mut H) -> Result<Outcome> {
    let cursor = host.cursor();
    if self.guard.matches(cursor) {
      return Ok(Outcome::Skipped(SkipReason::Debounced));
    }
    if !std::mem::take(&mut self.armed) {
      return Ok(Outcome::Skipped(SkipReason::NotArmed));
    }
    self.auto_close(host, cursor)
  }

  /// Closes the tag opened right before the cursor, if there is one.
  pub fn on_possible_tag_close<H: EditorHost + ?Sized>(&mut self, host: &mut H) -> Result<Outcome> {
    let cursor = host.cursor();
    if self.guard.matches(cursor) {
      return Ok(Outcome::Skipped(SkipReason::Debounced));
    }
    self.auto_close(host, cursor)
  }

  pub fn close_nearest_unclosed_tag<H: EditorHost + ?Sized>(
    &mut self,
    host: &mut H,
  ) -> Result<Outcome> {
    self.on_close_nearest_command(host)
  }

  /// Inserts the closing tag of the most recently opened unclosed tag at the
  /// cursor. The whole document is scanned; the cursor does not need to be
  /// near the open tag.
  pub fn on_close_nearest_command<H: EditorHost + ?Sized>(&mut self, host: &mut H) -> Result<Outcome> {
    let text = host.text();
    let lines: Vec<&str> = split_lines(&text).collect();
    let unclosed = find_unclosed_tags(&lines, &self.config);

    let Some(nearest) = unclosed.last() else {
      tracing::debug!("no unclosed tags found");
      return Ok(Outcome::Skipped(SkipReason::NothingUnclosed));
    };

    let closing = closing_tag(&nearest.name);
    let at = host.cursor();
    host.insert_text(&closing, at)?;
    let cursor = self.place_cursor(host, at, &closing)?;

    tracing::debug!(
      "closed <{}> opened on line {} at {}",
      nearest.name,
      nearest.line,
      at
    );
    Ok(Outcome::Inserted {
      closing,
      at,
      cursor,
      guard: None,
    })
  }

  /// Whether the tag `name`, opened just before `from`, is closed further on.
  pub fn has_matching_close<H: EditorHost + ?Sized>(&self, host: &H, name: &str, from: Position) -> bool {
    let text = host.text();
    let lines: Vec<&str> = split_lines(&text).collect();
    count_unclosed_from(&lines, name, from)
  }

  fn auto_close<H: EditorHost + ?Sized>(&mut self, host: &mut H, cursor: Position) -> Result<Outcome> {
    self.guard.reset();

    let Some(line) = host.line_text(cursor.row) else {
      return Ok(Outcome::Skipped(SkipReason::NoClosingBracket));
    };
    let before = cursor.col.checked_sub(1).and_then(|col| line.chars().nth(col));
    if before != Some('>') {
      return Ok(Outcome::Skipped(SkipReason::NoClosingBracket));
    }

    let Some(tag) = extract_tag_at(&line, cursor.col) else {
      return Ok(Outcome::Skipped(SkipReason::NoOpenTag));
    };
    if is_self_closing(&tag.raw) {
      return Ok(Outcome::Skipped(SkipReason::SelfClosing));
    }
    if is_excluded(&tag.name, &self.config.excluded_tags) {
      return Ok(Outcome::Skipped(SkipReason::Excluded));
    }
    if self.config.skip_fenced_code_blocks
      && is_inside_fenced_code_block(|idx| host.line_text(idx), cursor.row)
    {
      return Ok(Outcome::Skipped(SkipReason::FencedCode));
    }
    if self.config.skip_inline_code_spans && is_inside_inline_code_span(&line, cursor.col) {
      return Ok(Outcome::Skipped(SkipReason::InlineCode));
    }

    let closing = tag.closing();
    host.insert_text(&closing, cursor)?;
    let guard = self.guard.set(cursor);
    let new_cursor = self.place_cursor(host, cursor, &closing)?;

    tracing::debug!("auto-closed {} at {}", tag.raw, cursor);
    Ok(Outcome::Inserted {
      closing,
      at: cursor,
      cursor: new_cursor,
      guard: Some(guard),
    })
  }

  fn place_cursor<H: EditorHost + ?Sized>(
    &self,
    host: &mut H,
    at: Position,
    closing: &str,
  ) -> Result<Position> {
    let cursor = match self.config.cursor_placement {
      CursorPlacement::Between => at,
      CursorPlacement::After => at.traverse(closing),
    };
    host.set_cursor(cursor)?;
    Ok(cursor)
  }
}
