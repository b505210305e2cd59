// park/src/lane/executor.rs

//! `StageExecutor`: runs one stage function of one lane as its own task.

use crate::core::item::WorkItem;
use crate::core::stage::{StageContext, StageDef};
use crate::error::ParkError;
use crate::lane::sinks::Sinks;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::SendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{event, instrument, Level};

pub(crate) struct StageExecutor<T: Send + Sync + 'static> {
  lane: usize,
  index: usize,
  stage: StageDef<T>,
  inbound: mpsc::Receiver<WorkItem<T>>,
  /// Inbound queue of the next stage; `None` for the last stage of the chain.
  next: Option<mpsc::Sender<WorkItem<T>>>,
  sinks: Sinks<T>,
  abort: CancellationToken,
}

impl<T: Send + Sync + 'static> StageExecutor<T> {
  pub(crate) fn new(
    lane: usize,
    index: usize,
    stage: StageDef<T>,
    inbound: mpsc::Receiver<WorkItem<T>>,
    next: Option<mpsc::Sender<WorkItem<T>>>,
    sinks: Sinks<T>,
    abort: CancellationToken,
  ) -> Self {
    Self {
      lane,
      index,
      stage,
      inbound,
      next,
      sinks,
      abort,
    }
  }

  pub(crate) fn spawn(self, runtime: &Handle) -> JoinHandle<()> {
    runtime.spawn(self.run())
  }

  #[instrument(
    name = "StageExecutor::run",
    skip_all,
    fields(lane = self.lane, stage = self.index, stage_name = %self.stage.name)
  )]
  async fn run(mut self) {
    let mut processed = 0u64;
    loop {
      let received = tokio::select! {
        biased;
        _ = self.abort.cancelled() => None,
        item = self.inbound.recv() => Some(item),
      };
      match received {
        // Abort requested.
        None => {
          self.drain().await;
          break;
        }
        // Upstream finished and the queue is empty.
        Some(None) => break,
        Some(Some(item)) => {
          self.process(item).await;
          processed += 1;
        }
      }
    }
    event!(Level::DEBUG, processed, "Stage executor exiting.");
  }

  async fn process(&self, mut item: WorkItem<T>) {
    if item.is_failed() {
      // Failed items never reach another stage function.
      self.sinks.deliver(item).await;
      return;
    }

    let ctx = StageContext {
      lane: self.lane,
      stage: self.index,
      stage_name: self.stage.name.clone(),
      item: item.id(),
    };
    let invocation = AssertUnwindSafe((self.stage.handler)(ctx, item.payload().clone())).catch_unwind();
    let result = tokio::select! {
      biased;
      _ = self.abort.cancelled() => Err(self.aborted_here()),
      outcome = invocation => match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(self.item_error(source)),
        Err(_panic) => Err(self.item_error(anyhow::anyhow!("stage function panicked"))),
      },
    };

    match result {
      Ok(()) => {
        event!(Level::TRACE, item = %item.id(), "Stage succeeded.");
        self.forward(item).await;
      }
      Err(err) => {
        event!(Level::DEBUG, item = %item.id(), error = %err, "Stage failed; routing item to failure sink.");
        item.fail(err);
        self.sinks.deliver(item).await;
      }
    }
  }

  async fn forward(&self, item: WorkItem<T>) {
    let Some(next) = &self.next else {
      self.sinks.deliver(item).await;
      return;
    };
    // The next executor closes its queue when the run is aborted.
    if let Err(SendError(mut item)) = next.send(item).await {
      item.fail(ParkError::Aborted {
        lane: self.lane,
        stage: Some(self.index + 1),
      });
      self.sinks.deliver(item).await;
    }
  }

  /// Stops accepting items and routes everything still queued to the failure sink.
  async fn drain(&mut self) {
    self.inbound.close();
    let mut drained = 0u64;
    while let Some(mut item) = self.inbound.recv().await {
      item.fail(self.aborted_here());
      self.sinks.deliver(item).await;
      drained += 1;
    }
    if drained > 0 {
      event!(Level::DEBUG, drained, "Drained queued items after abort.");
    }
  }

  fn aborted_here(&self) -> ParkError {
    ParkError::Aborted {
      lane: self.lane,
      stage: Some(self.index),
    }
  }

  fn item_error(&self, source: anyhow::Error) -> ParkError {
    ParkError::ItemProcessing {
      lane: self.lane,
      stage: self.index,
      stage_name: self.stage.name.to_string(),
      source,
    }
  }
}
