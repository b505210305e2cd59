// park/src/lane/wiring.rs

//! `Lane`: one replica of the whole stage chain plus the loop that feeds it
//! from the shared intake.

use crate::core::item::WorkItem;
use crate::core::stage::StageDef;
use crate::error::ParkError;
use crate::lane::executor::StageExecutor;
use crate::lane::intake::Intake;
use crate::lane::sinks::Sinks;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::SendError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{event, instrument, Level};

/// Signals shared by every lane of a run.
#[derive(Clone)]
pub(crate) struct LaneSignals {
  /// `true` while intake is paused.
  pub gate: watch::Receiver<bool>,
  /// Stop taking new items; what was taken still completes.
  pub stop_intake: CancellationToken,
  /// Stop everything; queued and in-flight items are routed to the failure sink.
  pub abort: CancellationToken,
}

pub(crate) struct Lane<T: Send + Sync + 'static> {
  id: usize,
  intake: Arc<Intake<T>>,
  /// Inbound queue of the first stage; `None` when the chain is empty.
  head: Option<mpsc::Sender<WorkItem<T>>>,
  executors: Vec<JoinHandle<()>>,
  sinks: Sinks<T>,
  signals: LaneSignals,
}

impl<T: Send + Sync + 'static> Lane<T> {
  /// Spawns the lane's executors, wiring the chain tail-first so every
  /// executor's next queue exists before it starts.
  pub(crate) fn build(
    id: usize,
    stages: &[StageDef<T>],
    queue_capacity: usize,
    intake: Arc<Intake<T>>,
    sinks: Sinks<T>,
    signals: LaneSignals,
    runtime: &Handle,
  ) -> Self {
    let mut next: Option<mpsc::Sender<WorkItem<T>>> = None;
    let mut executors = Vec::with_capacity(stages.len());
    for (index, stage) in stages.iter().enumerate().rev() {
      let (tx, rx) = mpsc::channel(queue_capacity);
      let executor = StageExecutor::new(
        id,
        index,
        stage.clone(),
        rx,
        next.take(),
        sinks.clone(),
        signals.abort.clone(),
      );
      executors.push(executor.spawn(runtime));
      next = Some(tx);
    }
    executors.reverse();

    Self {
      id,
      intake,
      head: next,
      executors,
      sinks,
      signals,
    }
  }

  pub(crate) fn spawn(self, runtime: &Handle) -> JoinHandle<()> {
    runtime.spawn(self.run())
  }

  #[instrument(name = "Lane::run", skip_all, fields(lane = self.id, stages = self.executors.len()))]
  async fn run(mut self) {
    let mut admitted = 0u64;
    loop {
      let open = tokio::select! {
        biased;
        _ = self.signals.stop_intake.cancelled() => false,
        open = wait_until_open(&mut self.signals.gate) => open,
      };
      if !open {
        break;
      }
      // A lane parked on the intake gives up its turn as soon as the gate closes,
      // so nothing is admitted once `pause` has returned.
      let item = tokio::select! {
        biased;
        _ = self.signals.stop_intake.cancelled() => break,
        _ = self.signals.gate.wait_for(|paused| *paused) => continue,
        item = self.intake.admit(self.id) => item,
      };
      let Some(item) = item else {
        break;
      };
      admitted += 1;
      self.feed(item).await;
    }

    // Closing the head queue lets each executor finish its backlog and exit in turn.
    drop(self.head.take());
    for (index, handle) in self.executors.drain(..).enumerate() {
      if let Err(err) = handle.await {
        event!(Level::ERROR, stage = index, error = %err, "Stage executor task failed.");
      }
    }
    event!(Level::DEBUG, admitted, "Lane drained.");
  }

  async fn feed(&self, item: WorkItem<T>) {
    let Some(head) = &self.head else {
      // No stages: every admitted item succeeds as is.
      self.sinks.deliver(item).await;
      return;
    };
    if let Err(SendError(mut item)) = head.send(item).await {
      item.fail(ParkError::Aborted {
        lane: self.id,
        stage: Some(0),
      });
      self.sinks.deliver(item).await;
    }
  }
}

/// Waits while intake is paused. Returns `false` if the gate is gone.
async fn wait_until_open(gate: &mut watch::Receiver<bool>) -> bool {
  gate.wait_for(|paused| !*paused).await.is_ok()
}
