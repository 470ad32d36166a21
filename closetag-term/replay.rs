//! Replays keystrokes through the async hooks, the way an editor would
//! deliver them.

use std::time::Duration;

use anyhow::Result;
use closetag_event::{
  Dispatch,
  Hooks,
};
use closetag_lib::{
  Outcome,
  TagEngine,
  debounce::{
    GUARD_CLEAR_DELAY,
    SETTLE_DELAY,
  },
  host::Document,
};
use tokio::{
  sync::mpsc::UnboundedReceiver,
  time::{
    Instant,
    sleep_until,
  },
};

#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
  pub text:     &'a str,
  pub paste:    bool,
  pub interval: Duration,
}

/// Types `input` at the document cursor and returns the insertions the
/// engine made. Must run inside a tokio runtime.
pub async fn replay(engine: &mut TagEngine, doc: &mut Document, input: Input<'_>) -> Result<Vec<Outcome>> {
  let (hooks, mut rx) = Hooks::spawn();
  let mut inserted = Vec::new();

  if input.paste {
    doc.type_text(input.text)?;
    engine.arm();
    hooks.notify_changed();
  } else {
    for ch in input.text.chars() {
      doc.type_text(ch.encode_utf8(&mut [0; 4]))?;
      if ch == '>' {
        engine.arm();
      }
      hooks.notify_changed();
      let deadline = Instant::now() + input.interval;
      pump(&hooks, &mut rx, engine, doc, &mut inserted, deadline).await?;
    }
  }

  let quiet = Instant::now() + SETTLE_DELAY * 2 + GUARD_CLEAR_DELAY;
  pump(&hooks, &mut rx, engine, doc, &mut inserted, quiet).await?;
  Ok(inserted)
}

async fn pump(
  hooks: &Hooks,
  rx: &mut UnboundedReceiver<Dispatch>,
  engine: &mut TagEngine,
  doc: &mut Document,
  inserted: &mut Vec<Outcome>,
  deadline: Instant,
) -> Result<()> {
  loop {
    tokio::select! {
      dispatch = rx.recv() => {
        let Some(dispatch) = dispatch else {
          return Ok(());
        };
        let Some(outcome) = hooks.handle_dispatch(engine, doc, dispatch)? else {
          continue;
        };
        log::debug!("{dispatch:?}: {outcome:?}");
        if outcome.is_inserted() {
          // the insertion is itself a document change
          hooks.notify_changed();
          inserted.push(outcome);
        }
      }
      _ = sleep_until(deadline) => return Ok(()),
    }
  }
}
