// park/src/lane/sinks.rs

//! Terminal routing. Every item ends here exactly once: the counters are bumped,
//! the item goes to the success or failure output and an event is queued for
//! the dispatcher.

use crate::core::event::Event;
use crate::core::item::WorkItem;
use crate::core::progress::Counters;
use crate::dispatch::EventEmitter;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{event, Level};

pub(crate) fn channel<T: Send + Sync + 'static>(
  counters: Arc<Counters>,
  events: EventEmitter<T>,
) -> (Sinks<T>, Outputs<T>) {
  let (succeeded_tx, succeeded_rx) = mpsc::unbounded_channel();
  let (failed_tx, failed_rx) = mpsc::unbounded_channel();
  let sinks = Sinks {
    succeeded: succeeded_tx,
    failed: failed_tx,
    counters,
    events,
  };
  let outputs = Outputs {
    succeeded: succeeded_rx,
    failed: failed_rx,
  };
  (sinks, outputs)
}

/// Producer side of the terminal outputs, cloned into every executor and lane.
///
/// Outputs are unbounded: a caller that never reads them (listener-only use)
/// must not be able to stall a lane.
pub(crate) struct Sinks<T: Send + Sync + 'static> {
  succeeded: UnboundedSender<WorkItem<T>>,
  failed: UnboundedSender<WorkItem<T>>,
  counters: Arc<Counters>,
  events: EventEmitter<T>,
}

impl<T: Send + Sync + 'static> Clone for Sinks<T> {
  fn clone(&self) -> Self {
    Self {
      succeeded: self.succeeded.clone(),
      failed: self.failed.clone(),
      counters: Arc::clone(&self.counters),
      events: self.events.clone(),
    }
  }
}

impl<T: Send + Sync + 'static> Sinks<T> {
  /// Gives `item` its terminal disposition: success if it carries no error, failure otherwise.
  pub(crate) async fn deliver(&self, item: WorkItem<T>) {
    let failed = item.is_failed();
    let progress = if failed {
      self.counters.record_failure()
    } else {
      self.counters.record_success()
    };
    let id = item.id();
    let ev = self.events.is_listening().then(|| Event::for_item(&item, progress));

    let output = if failed { &self.failed } else { &self.succeeded };
    if output.send(item).is_err() {
      event!(Level::TRACE, item = %id, "Output receiver dropped; item delivered to listeners only.");
    }
    let Some(ev) = ev else {
      return;
    };
    if let Err(err) = self.events.emit(ev).await {
      event!(Level::WARN, item = %id, error = %err, "Completion event dropped.");
    }
  }
}

/// The caller's pull-style view of the outcomes of a run.
///
/// Both channels close once every lane of the run has exited.
pub struct Outputs<T: Send + Sync + 'static> {
  succeeded: UnboundedReceiver<WorkItem<T>>,
  failed: UnboundedReceiver<WorkItem<T>>,
}

impl<T: Send + Sync + 'static> std::fmt::Debug for Outputs<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Outputs")
      .field("succeeded_pending", &self.succeeded.len())
      .field("failed_pending", &self.failed.len())
      .finish()
  }
}

impl<T: Send + Sync + 'static> Outputs<T> {
  pub async fn next_succeeded(&mut self) -> Option<WorkItem<T>> {
    self.succeeded.recv().await
  }

  pub async fn next_failed(&mut self) -> Option<WorkItem<T>> {
    self.failed.recv().await
  }

  /// Next item from either output, whichever is ready first.
  pub async fn next(&mut self) -> Option<WorkItem<T>> {
    tokio::select! {
      Some(item) = self.succeeded.recv() => Some(item),
      Some(item) = self.failed.recv() => Some(item),
      else => None,
    }
  }

  /// Waits for the run to finish and returns `(succeeded, failed)`.
  pub async fn collect(mut self) -> (Vec<WorkItem<T>>, Vec<WorkItem<T>>) {
    let mut succeeded = Vec::new();
    while let Some(item) = self.succeeded.recv().await {
      succeeded.push(item);
    }
    let mut failed = Vec::new();
    while let Some(item) = self.failed.recv().await {
      failed.push(item);
    }
    (succeeded, failed)
  }

  pub fn into_receivers(self) -> (UnboundedReceiver<WorkItem<T>>, UnboundedReceiver<WorkItem<T>>) {
    (self.succeeded, self.failed)
  }
}
