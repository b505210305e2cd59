// park/src/pipeline/execution.rs

//! Contains `Park::start()`, which spawns the lanes, their stage executors, the
//! event dispatcher and the run monitor.

use crate::core::ingress::Ingress;
use crate::core::status::Status;
use crate::dispatch;
use crate::error::{ParkError, ParkResult};
use crate::lane::intake::Intake;
use crate::lane::sinks::{self, Outputs};
use crate::lane::wiring::{Lane, LaneSignals};
use crate::pipeline::definition::{Park, RunControl};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{event, instrument, Level};

impl<T> Park<T>
where
  T: Send + Sync + 'static,
{
  /// Starts consuming `ingress` and returns the pull-style outputs of the run.
  ///
  /// Must be called from within a tokio runtime. The status is `Open` before
  /// any task is spawned, so no item is consumed by a park that still reports
  /// `Initial`. The outputs may be dropped when listeners are the only
  /// consumers; outcomes are then delivered to listeners alone.
  #[instrument(
    name = "Park::start",
    skip_all,
    fields(item_type = %std::any::type_name::<T>()),
    err(Display)
  )]
  pub fn start<I>(&self, ingress: I) -> ParkResult<Outputs<T>>
  where
    I: Ingress<T>,
  {
    let runtime = Handle::try_current().map_err(|_| ParkError::NoRuntime)?;

    let mut status = self.status.lock();
    if *status != Status::Initial {
      return Err(ParkError::invalid_state("start", *status));
    }
    let mut run = self.run.lock();
    let config = self.config.read().clone();

    if self.counters.total().is_none() {
      if let Some(size) = ingress.size_hint() {
        self.counters.set_total(Some(size as u64));
      }
    }
    *status = Status::Open;

    let abort = CancellationToken::new();
    let stop_intake = abort.child_token();
    let (gate_tx, gate_rx) = watch::channel(false);
    let (done_tx, done_rx) = watch::channel(false);

    let (emitter, dispatcher) = dispatch::channel(&config, Arc::clone(&self.counters));
    let (sinks, outputs) = sinks::channel(Arc::clone(&self.counters), emitter);
    let intake = Intake::new(Box::new(ingress), Arc::clone(&self.counters));
    let signals = LaneSignals {
      gate: gate_rx,
      stop_intake: stop_intake.clone(),
      abort: abort.clone(),
    };

    let dispatcher_handle = dispatcher.spawn(&runtime);
    let lane_handles: Vec<JoinHandle<()>> = (0..config.lanes)
      .map(|id| {
        Lane::build(
          id,
          &config.stages,
          config.queue_capacity,
          Arc::clone(&intake),
          sinks.clone(),
          signals.clone(),
          &runtime,
        )
        .spawn(&runtime)
      })
      .collect();
    // Lanes and executors own the only remaining sink handles; once they exit,
    // the outputs and the event queue close.
    drop(sinks);

    runtime.spawn(monitor(lane_handles, dispatcher_handle, Arc::clone(&self.status), done_tx));

    *run = Some(RunControl {
      abort,
      stop_intake,
      gate: gate_tx,
      done: done_rx,
      shutting_down: false,
    });
    event!(
      Level::INFO,
      lanes = config.lanes,
      stages = config.stages.len(),
      total = ?self.counters.total(),
      "Park opened."
    );
    Ok(outputs)
  }
}

/// Joins every task of a run, then records the terminal status and publishes completion.
async fn monitor(
  lanes: Vec<JoinHandle<()>>,
  dispatcher: JoinHandle<u64>,
  status: Arc<Mutex<Status>>,
  done: watch::Sender<bool>,
) {
  for (lane, handle) in lanes.into_iter().enumerate() {
    if let Err(err) = handle.await {
      event!(Level::ERROR, lane, error = %err, "Lane task failed.");
    }
  }
  let delivered = match dispatcher.await {
    Ok(delivered) => delivered,
    Err(err) => {
      event!(Level::ERROR, error = %err, "Event dispatcher task failed.");
      0
    }
  };

  let final_status = {
    let mut status = status.lock();
    if status.is_running() {
      *status = Status::Closed;
    }
    *status
  };
  event!(Level::INFO, status = %final_status, delivered, "Park drained.");
  done.send_replace(true);
}
