//! Deferred callbacks around the tag engine.
//!
//! Two delays surround every auto-close:
//!
//! - a change notification waits [`SETTLE_DELAY`] so the host buffer holds the
//!   typed `>` before the engine looks at it, and
//! - a handled position stays guarded for [`GUARD_CLEAR_DELAY`].
//!
//! Both run as [`AsyncHook`]s. They never touch the engine: when a delay
//! expires they post a [`Dispatch`] to the loop that owns the engine, which
//! applies it with [`Hooks::handle_dispatch`].

pub mod debounce;

use closetag_lib::{
  Outcome,
  TagEngine,
  debounce::{
    GUARD_CLEAR_DELAY,
    GuardToken,
    SETTLE_DELAY,
  },
  engine::Result,
  host::EditorHost,
};
pub use debounce::{
  AsyncHook,
  send_blocking,
};
use tokio::{
  sync::mpsc::{
    Sender,
    UnboundedReceiver,
    UnboundedSender,
    unbounded_channel,
  },
  time::Instant,
};

/// Work for the engine owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
  AutoClose,
  ClearGuard(GuardToken),
}

/// The host reported a document change.
#[derive(Debug)]
pub struct EditorChanged;

pub struct SettleHook {
  pending:  bool,
  dispatch: UnboundedSender<Dispatch>,
}

impl SettleHook {
  pub fn new(dispatch: UnboundedSender<Dispatch>) -> Self {
    Self {
      pending: false,
      dispatch,
    }
  }
}

impl AsyncHook for SettleHook {
  type Event = EditorChanged;

  fn handle_event(&mut self, _event: EditorChanged, _deadline: Option<Instant>) -> Option<Instant> {
    self.pending = true;
    Some(Instant::now() + SETTLE_DELAY)
  }

  fn finish_debounce(&mut self) {
    if std::mem::take(&mut self.pending) {
      post(&self.dispatch, Dispatch::AutoClose);
    }
  }
}

pub struct GuardClearHook {
  token:    Option<GuardToken>,
  dispatch: UnboundedSender<Dispatch>,
}

impl GuardClearHook {
  pub fn new(dispatch: UnboundedSender<Dispatch>) -> Self {
    Self {
      token: None,
      dispatch,
    }
  }
}

impl AsyncHook for GuardClearHook {
  type Event = GuardToken;

  fn handle_event(&mut self, token: GuardToken, _deadline: Option<Instant>) -> Option<Instant> {
    // a newer guard supersedes the pending clear
    self.token = Some(token);
    Some(Instant::now() + GUARD_CLEAR_DELAY)
  }

  fn finish_debounce(&mut self) {
    if let Some(token) = self.token.take() {
      post(&self.dispatch, Dispatch::ClearGuard(token));
    }
  }
}

fn post(dispatch: &UnboundedSender<Dispatch>, event: Dispatch) {
  if dispatch.send(event).is_err() {
    log::warn!("dispatch receiver gone, dropping {event:?}");
  }
}

/// Senders for both hooks.
#[derive(Debug, Clone)]
pub struct Hooks {
  changed: Sender<EditorChanged>,
  guard:   Sender<GuardToken>,
}

impl Hooks {
  /// Spawns both hooks on the current runtime. Dispatches arrive on the
  /// returned receiver.
  pub fn spawn() -> (Self, UnboundedReceiver<Dispatch>) {
    let (tx, rx) = unbounded_channel();
    let hooks = Self {
      changed: SettleHook::new(tx.clone()).spawn(),
      guard:   GuardClearHook::new(tx).spawn(),
    };
    (hooks, rx)
  }

  /// Returns `false` when the notification was dropped.
  pub fn notify_changed(&self) -> bool {
    send_blocking(&self.changed, EditorChanged)
  }

  pub fn schedule_guard_clear(&self, token: GuardToken) -> bool {
    send_blocking(&self.guard, token)
  }

  /// Applies a dispatch on the engine owner's thread. An auto-close that
  /// inserts schedules its own guard clear.
  pub fn handle_dispatch<H: EditorHost + ?Sized>(
    &self,
    engine: &mut TagEngine,
    host: &mut H,
    dispatch: Dispatch,
  ) -> Result<Option<Outcome>> {
    match dispatch {
      Dispatch::AutoClose => {
        let outcome = engine.handle_editor_changed(host)?;
        if let Some(token) = outcome.guard() {
          if !self.schedule_guard_clear(token) {
            log::warn!("guard for generation {} will not clear", token.generation());
          }
        }
        log::trace!("auto-close dispatch: {outcome:?}");
        Ok(Some(outcome))
      },
      Dispatch::ClearGuard(token) => {
        engine.clear_debounce(token);
        Ok(None)
      },
    }
  }
}

#[cfg(test)]
mod test {
  use closetag_lib::{
    Configuration,
    Position,
    SkipReason,
    host::Document,
  };

  use super::*;

  #[tokio::test(start_paused = true)]
  async fn changes_settle_into_one_dispatch() {
    let (hooks, mut rx) = Hooks::spawn();
    let start = Instant::now();

    hooks.notify_changed();
    hooks.notify_changed();
    tokio::time::sleep(SETTLE_DELAY / 2).await;
    hooks.notify_changed();

    assert_eq!(rx.recv().await, Some(Dispatch::AutoClose));
    assert!(start.elapsed() >= SETTLE_DELAY + SETTLE_DELAY / 2);
    tokio::time::sleep(GUARD_CLEAR_DELAY).await;
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test(start_paused = true)]
  async fn auto_close_then_guard_clear() {
    let (hooks, mut rx) = Hooks::spawn();
    let mut engine = TagEngine::new(Configuration::default());
    let mut doc = Document::with_cursor_at_end("<div>");

    engine.arm();
    hooks.notify_changed();
    let dispatch = rx.recv().await.unwrap();
    let outcome = hooks
      .handle_dispatch(&mut engine, &mut doc, dispatch)
      .unwrap()
      .unwrap();
    assert!(outcome.is_inserted());
    assert!(engine.debounce_guard().matches(Position::new(0, 5)));

    // the insertion itself is reported as a change too
    hooks.notify_changed();
    let dispatch = rx.recv().await.unwrap();
    let outcome = hooks
      .handle_dispatch(&mut engine, &mut doc, dispatch)
      .unwrap()
      .unwrap();
    assert_eq!(outcome.skip_reason(), Some(SkipReason::Debounced));

    let dispatch = rx.recv().await.unwrap();
    assert!(matches!(dispatch, Dispatch::ClearGuard(_)));
    hooks
      .handle_dispatch(&mut engine, &mut doc, dispatch)
      .unwrap();
    assert_eq!(engine.debounce_guard().last(), None);
  }

  #[tokio::test(start_paused = true)]
  async fn newer_guard_replaces_pending_clear() {
    let (tx, mut rx) = unbounded_channel();
    let guard = GuardClearHook::new(tx).spawn();
    let mut engine = TagEngine::default();
    let mut doc = Document::with_cursor_at_end("<a>");

    engine.arm();
    let first = engine.on_possible_tag_close(&mut doc).unwrap().guard().unwrap();
    send_blocking(&guard, first);

    tokio::time::sleep(GUARD_CLEAR_DELAY / 2).await;
    doc.set_cursor(Position::new(0, 7)).unwrap();
    doc.type_text("<b>").unwrap();
    let second = engine.on_possible_tag_close(&mut doc).unwrap().guard().unwrap();
    send_blocking(&guard, second);

    assert_eq!(rx.recv().await, Some(Dispatch::ClearGuard(second)));
    assert!(!engine.clear_debounce(first));
    assert!(engine.clear_debounce(second));
  }

  #[test]
  fn hooks_are_inert_outside_a_runtime() {
    let (hooks, mut rx) = Hooks::spawn();
    assert!(!hooks.notify_changed());
    assert!(rx.try_recv().is_err());
  }
}
