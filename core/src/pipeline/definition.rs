// park/src/pipeline/definition.rs

//! Contains the `Park<T>` struct definition, its construction, configuration and
//! read-only snapshots.

use crate::config::ParkConfig;
use crate::core::progress::{Counters, Progress};
use crate::core::status::Status;
use crate::error::{ParkError, ParkResult};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{event, Level};

/// A multi-lane, multi-stage processing pipeline.
///
/// Every instance is independent: there is no process-wide default park. A
/// `Park` is `Send + Sync`, so control operations may be called from any task
/// or thread, typically through an `Arc<Park<T>>`.
///
/// Lock order, where more than one is taken: `status`, then `run`, then `config`.
pub struct Park<T>
where
  T: Send + Sync + 'static,
{
  pub(crate) config: RwLock<ParkConfig<T>>,
  pub(crate) status: Arc<Mutex<Status>>,
  pub(crate) counters: Arc<Counters>,
  pub(crate) run: Mutex<Option<RunControl>>,
}

/// Handles to the tasks of the current run, kept for the control surface.
pub(crate) struct RunControl {
  pub abort: CancellationToken,
  pub stop_intake: CancellationToken,
  pub gate: watch::Sender<bool>,
  pub done: watch::Receiver<bool>,
  pub shutting_down: bool,
}

impl<T> Park<T>
where
  T: Send + Sync + 'static,
{
  /// Creates a park with the default configuration: one lane, no stages.
  pub fn new() -> Self {
    Self::with_config(ParkConfig::default())
  }

  pub fn with_config(config: ParkConfig<T>) -> Self {
    Self {
      config: RwLock::new(config),
      status: Arc::new(Mutex::new(Status::Initial)),
      counters: Arc::new(Counters::default()),
      run: Mutex::new(None),
    }
  }

  /// Replaces the configuration. Only allowed while `Initial`.
  pub fn configure(&self, config: ParkConfig<T>) -> ParkResult<()> {
    let status = self.status.lock();
    if *status != Status::Initial {
      event!(Level::WARN, status = %*status, "Rejected configuration change on a running park.");
      return Err(ParkError::invalid_state("configure", *status));
    }
    event!(Level::DEBUG, ?config, "Park configured.");
    *self.config.write() = config;
    Ok(())
  }

  /// A copy of the current configuration.
  pub fn config(&self) -> ParkConfig<T> {
    self.config.read().clone()
  }

  pub fn status(&self) -> Status {
    *self.status.lock()
  }

  /// `succeeded + failed` so far.
  pub fn finished(&self) -> u64 {
    self.counters.snapshot().finished()
  }

  /// Expected number of items, if known.
  pub fn total(&self) -> Option<u64> {
    self.counters.total()
  }

  pub fn succeeded(&self) -> u64 {
    self.counters.snapshot().succeeded
  }

  pub fn failed(&self) -> u64 {
    self.counters.snapshot().failed
  }

  /// Items admitted from the ingress in the current run.
  pub fn submitted(&self) -> u64 {
    self.counters.submitted()
  }

  /// Events dropped because the event queue stayed full.
  pub fn overflow(&self) -> u64 {
    self.counters.overflow()
  }

  pub fn progress(&self) -> Progress {
    self.counters.snapshot()
  }
}

impl<T> Default for Park<T>
where
  T: Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<T> std::fmt::Debug for Park<T>
where
  T: Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Park")
      .field("status", &self.status())
      .field("progress", &self.progress())
      .field("config", &*self.config.read())
      .finish()
  }
}
