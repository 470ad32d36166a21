//! Deferred, debounced event handling on a tokio task.

use std::time::Duration;

use futures_executor::block_on;
use tokio::{
  sync::mpsc::{
    self,
    Receiver,
    Sender,
    error::TrySendError,
  },
  time::{
    Instant,
    sleep_until,
  },
};

/// Upper bound on how long a sync caller may wait for room in a full channel.
const SEND_TIMEOUT: Duration = Duration::from_millis(2);

const CHANNEL_CAPACITY: usize = 128;

/// A handler that runs on its own task and reacts to events after a delay.
///
/// Every event may move the deadline. When the deadline passes with no
/// further event, [`finish_debounce`](AsyncHook::finish_debounce) fires once.
pub trait AsyncHook: Send + 'static + Sized {
  type Event: Send + 'static;

  /// Returns the deadline to wait for: a fresh one, the current `deadline`
  /// unchanged, or `None` to cancel.
  fn handle_event(&mut self, event: Self::Event, deadline: Option<Instant>) -> Option<Instant>;

  fn finish_debounce(&mut self);

  /// Starts the hook and returns its event sender. Outside a tokio runtime
  /// nothing is spawned and the sender is already closed.
  fn spawn(self) -> Sender<Self::Event> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    match tokio::runtime::Handle::try_current() {
      Ok(handle) => {
        handle.spawn(drive(self, rx));
      },
      Err(_) => log::debug!("no tokio runtime, hook not started"),
    }
    tx
  }
}

async fn drive<H: AsyncHook>(mut hook: H, mut events: Receiver<H::Event>) {
  let mut deadline: Option<Instant> = None;
  loop {
    // the sleep is built even while disarmed, it is just never polled
    let wake = deadline.unwrap_or_else(Instant::now);
    tokio::select! {
      event = events.recv() => {
        let Some(event) = event else {
          return;
        };
        deadline = hook.handle_event(event, deadline);
      }
      _ = sleep_until(wake), if deadline.is_some() => {
        deadline = None;
        hook.finish_debounce();
      }
    }
  }
}

/// Sends from sync code and reports whether the hook received the event.
/// A full channel is waited on for at most [`SEND_TIMEOUT`].
pub fn send_blocking<T>(tx: &Sender<T>, event: T) -> bool {
  let event = match tx.try_send(event) {
    Ok(()) => return true,
    Err(TrySendError::Closed(_)) => {
      log::warn!("hook channel closed, event dropped");
      return false;
    },
    Err(TrySendError::Full(event)) => event,
  };

  let delivered = block_on(tx.send_timeout(event, SEND_TIMEOUT)).is_ok();
  if !delivered {
    log::warn!("hook channel full for {SEND_TIMEOUT:?}, event dropped");
  }
  delivered
}

#[cfg(test)]
mod test {
  use std::sync::{
    Arc,
    atomic::{
      AtomicUsize,
      Ordering,
    },
  };

  use super::*;

  /// Counts firings. `Some(ms)` events push the deadline, `None` cancels it.
  struct Counter {
    fired: Arc<AtomicUsize>,
  }

  impl AsyncHook for Counter {
    type Event = Option<u64>;

    fn handle_event(&mut self, delay: Option<u64>, _deadline: Option<Instant>) -> Option<Instant> {
      delay.map(|ms| Instant::now() + Duration::from_millis(ms))
    }

    fn finish_debounce(&mut self) {
      self.fired.fetch_add(1, Ordering::SeqCst);
    }
  }

  fn counter() -> (Sender<Option<u64>>, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let tx = Counter {
      fired: fired.clone(),
    }
    .spawn();
    (tx, fired)
  }

  #[tokio::test(start_paused = true)]
  async fn fires_once_after_the_last_event() {
    let (tx, fired) = counter();
    assert!(send_blocking(&tx, Some(10)));
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(send_blocking(&tx, Some(10)));
    tokio::time::sleep(Duration::from_millis(8)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn cancelled_deadline_never_fires() {
    let (tx, fired) = counter();
    send_blocking(&tx, Some(10));
    send_blocking(&tx, None);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn sends_fail_outside_a_runtime() {
    let (tx, fired) = counter();
    assert!(!send_blocking(&tx, Some(1)));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
  }
}
