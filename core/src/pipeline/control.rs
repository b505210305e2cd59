// park/src/pipeline/control.rs

//! Lifecycle operations on a started park: pause/resume, cancel, shutdown,
//! wait and reset.

use crate::core::status::Status;
use crate::error::{ParkError, ParkResult};
use crate::pipeline::definition::Park;
use std::time::Duration;
use tracing::{event, instrument, Level};

impl<T> Park<T>
where
  T: Send + Sync + 'static,
{
  /// Gates intake. Items already taken by a lane keep flowing.
  pub fn pause(&self) -> ParkResult<()> {
    let mut status = self.status.lock();
    if *status != Status::Open {
      return Err(ParkError::invalid_state("pause", *status));
    }
    if let Some(run) = self.run.lock().as_ref() {
      run.gate.send_replace(true);
    }
    *status = Status::Paused;
    event!(Level::INFO, "Park paused.");
    Ok(())
  }

  pub fn resume(&self) -> ParkResult<()> {
    let mut status = self.status.lock();
    if *status != Status::Paused {
      return Err(ParkError::invalid_state("resume", *status));
    }
    if let Some(run) = self.run.lock().as_ref() {
      run.gate.send_replace(false);
    }
    *status = Status::Open;
    event!(Level::INFO, "Park resumed.");
    Ok(())
  }

  /// Requests cancellation and returns immediately.
  ///
  /// Every executor stops taking items and routes what it still holds to the
  /// failure sink with `ParkError::Aborted`. Use `wait` to block until that is done.
  pub fn cancel(&self) -> ParkResult<()> {
    let mut status = self.status.lock();
    if !status.is_running() {
      return Err(ParkError::invalid_state("cancel", *status));
    }
    if let Some(run) = self.run.lock().as_ref() {
      run.abort.cancel();
    }
    *status = Status::Aborted;
    event!(Level::INFO, "Park cancelled.");
    Ok(())
  }

  /// Stops intake and lets every item already taken run to completion. The
  /// status becomes `Closed` once every lane has drained. Calling it again
  /// while the drain is in progress is a no-op.
  pub fn shutdown(&self) -> ParkResult<()> {
    let status = self.status.lock();
    if !status.is_running() {
      return Err(ParkError::invalid_state("shutdown", *status));
    }
    if let Some(run) = self.run.lock().as_mut() {
      if !run.shutting_down {
        run.shutting_down = true;
        run.stop_intake.cancel();
        event!(Level::INFO, "Park shutting down.");
      }
    }
    Ok(())
  }

  /// Waits until every task of the current run has exited.
  ///
  /// With a deadline, fails with `DrainTimeout` when it expires; the run keeps
  /// draining in the background. Returns at once if nothing was started.
  #[instrument(name = "Park::wait", skip(self), err(Display))]
  pub async fn wait(&self, deadline: Option<Duration>) -> ParkResult<()> {
    let done = match self.run.lock().as_ref() {
      Some(run) => run.done.clone(),
      None => return Ok(()),
    };
    let drained = async move {
      let mut done = done;
      // A closed channel means the monitor is gone, which only happens after it finished.
      let _ = done.wait_for(|drained| *drained).await;
    };
    match deadline {
      None => drained.await,
      Some(limit) => tokio::time::timeout(limit, drained)
        .await
        .map_err(|_| ParkError::DrainTimeout { waited: limit })?,
    }
    Ok(())
  }

  /// Returns the park to `Initial`, keeping its configuration.
  ///
  /// A running park is cancelled first; the call then waits (up to the
  /// configured drain timeout) for every task to exit before clearing the
  /// counters. Fails with `InvalidState` while a graceful shutdown is still
  /// draining: wait for `Closed` first.
  #[instrument(name = "Park::reset", skip(self), err(Display))]
  pub async fn reset(&self) -> ParkResult<()> {
    {
      let mut status = self.status.lock();
      let run = self.run.lock();
      if status.is_running() {
        if run.as_ref().is_some_and(|r| r.shutting_down) {
          return Err(ParkError::invalid_state("reset", *status));
        }
        if let Some(run) = run.as_ref() {
          run.abort.cancel();
        }
        *status = Status::Aborted;
        event!(Level::INFO, "Park cancelled by reset.");
      }
    }

    let limit = self.config.read().drain_timeout;
    self.wait(Some(limit)).await?;

    let mut status = self.status.lock();
    *self.run.lock() = None;
    self.counters.clear();
    *status = Status::Initial;
    event!(Level::INFO, "Park reset.");
    Ok(())
  }
}
