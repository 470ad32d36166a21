//! Suppression of repeated auto-close attempts at one cursor position.
//!
//! Each [`DebounceGuard::set`] hands out a [`GuardToken`]. A deferred clear
//! only takes effect while its token is still the latest one, so a clear
//! scheduled for an older insertion can never drop a newer guard.

use std::time::Duration;

use crate::position::Position;

/// Delay between a change notification and the auto-close check, letting the
/// host buffer settle.
pub const SETTLE_DELAY: Duration = Duration::from_millis(10);

/// How long a handled position stays suppressed.
pub const GUARD_CLEAR_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuardToken(u64);

impl GuardToken {
  pub const fn generation(self) -> u64 {
    self.0
  }
}

#[derive(Debug, Default, Clone)]
pub struct DebounceGuard {
  last:       Option<Position>,
  generation: u64,
}

impl DebounceGuard {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(&mut self, pos: Position) -> GuardToken {
    self.generation = self.generation.wrapping_add(1);
    self.last = Some(pos);
    GuardToken(self.generation)
  }

  /// Clears the guard if `token` came from the latest [`set`](Self::set).
  pub fn clear(&mut self, token: GuardToken) -> bool {
    if token.0 != self.generation || self.last.is_none() {
      return false;
    }
    self.last = None;
    true
  }

  pub fn reset(&mut self) {
    self.last = None;
  }

  pub fn matches(&self, pos: Position) -> bool {
    self.last == Some(pos)
  }

  pub fn last(&self) -> Option<Position> {
    self.last
  }
}
