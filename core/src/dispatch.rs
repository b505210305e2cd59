// park/src/dispatch.rs

//! The event dispatcher: a single task that delivers terminal-outcome events
//! to the registered listeners, decoupled from the lanes by a bounded queue.
//!
//! Stage executors hold an `EventEmitter`. Emitting never waits longer than the
//! configured send timeout; an event that cannot be queued in time is dropped
//! and counted as overflow. The dispatcher exits once every emitter is gone,
//! which happens when the last executor of the run has exited.

use crate::config::ParkConfig;
use crate::core::event::{Event, Listener};
use crate::core::progress::Counters;
use crate::error::{ParkError, ParkResult};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{event, instrument, Level};

/// Creates the emitter/dispatcher pair for one run.
pub(crate) fn channel<T: Send + Sync + 'static>(
  config: &ParkConfig<T>,
  counters: Arc<Counters>,
) -> (EventEmitter<T>, EventDispatcher<T>) {
  let (tx, rx) = mpsc::channel(config.event_capacity);
  let emitter = EventEmitter {
    tx,
    send_timeout: config.event_send_timeout,
    counters,
    listening: !config.listeners.is_empty(),
  };
  let dispatcher = EventDispatcher {
    rx,
    listeners: config.listeners.iter().cloned().collect(),
  };
  (emitter, dispatcher)
}

pub(crate) struct EventEmitter<T: Send + Sync + 'static> {
  tx: mpsc::Sender<Event<T>>,
  send_timeout: Duration,
  counters: Arc<Counters>,
  listening: bool,
}

impl<T: Send + Sync + 'static> Clone for EventEmitter<T> {
  fn clone(&self) -> Self {
    Self {
      tx: self.tx.clone(),
      send_timeout: self.send_timeout,
      counters: Arc::clone(&self.counters),
      listening: self.listening,
    }
  }
}

impl<T: Send + Sync + 'static> EventEmitter<T> {
  /// False when the run has no listeners; events are then not built at all.
  pub(crate) fn is_listening(&self) -> bool {
    self.listening
  }

  /// Queues `event` for delivery, waiting at most the send timeout for room.
  pub(crate) async fn emit(&self, event: Event<T>) -> ParkResult<()> {
    let event = match self.tx.try_send(event) {
      Ok(()) => return Ok(()),
      Err(TrySendError::Full(event)) => event,
      Err(TrySendError::Closed(_)) => return Err(self.overflow()),
    };
    match tokio::time::timeout(self.send_timeout, self.tx.send(event)).await {
      Ok(Ok(())) => Ok(()),
      Ok(Err(_)) | Err(_) => Err(self.overflow()),
    }
  }

  fn overflow(&self) -> ParkError {
    ParkError::Overflow {
      dropped: self.counters.record_overflow(),
    }
  }
}

pub(crate) struct EventDispatcher<T: Send + Sync + 'static> {
  rx: mpsc::Receiver<Event<T>>,
  listeners: Arc<[Listener<T>]>,
}

impl<T: Send + Sync + 'static> EventDispatcher<T> {
  pub(crate) fn spawn(self, runtime: &Handle) -> JoinHandle<u64> {
    runtime.spawn(self.run())
  }

  /// Delivers events in arrival order until the queue closes. Returns the number delivered.
  #[instrument(name = "EventDispatcher::run", skip_all, fields(listeners = self.listeners.len()))]
  async fn run(mut self) -> u64 {
    let mut delivered = 0u64;
    while let Some(ev) = self.rx.recv().await {
      self.deliver(&ev);
      delivered += 1;
    }
    event!(Level::DEBUG, delivered, "Event queue closed; dispatcher exiting.");
    delivered
  }

  fn deliver(&self, ev: &Event<T>) {
    for (index, listener) in self.listeners.iter().enumerate() {
      if catch_unwind(AssertUnwindSafe(|| listener(ev))).is_err() {
        event!(Level::ERROR, listener = index, item = %ev.id, "Listener panicked while handling an event.");
      }
    }
  }
}
