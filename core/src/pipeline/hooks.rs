// park/src/pipeline/hooks.rs

//! Registration that is only valid before a park starts: listeners and the
//! expected item total.

use crate::core::event::Event;
use crate::core::status::Status;
use crate::error::{ParkError, ParkResult};
use crate::pipeline::definition::Park;
use std::sync::Arc;
use tracing::{event, Level};

impl<T> Park<T>
where
  T: Send + Sync + 'static,
{
  /// Registers a listener, invoked on the dispatcher task for every terminal
  /// outcome. The listener list is frozen once the park starts.
  pub fn add_listener(&self, listener: impl Fn(&Event<T>) + Send + Sync + 'static) -> ParkResult<()> {
    let status = self.status.lock();
    if *status != Status::Initial {
      return Err(ParkError::invalid_state("add_listener", *status));
    }
    let mut config = self.config.write();
    config.push_listener(Arc::new(listener))?;
    event!(Level::DEBUG, listeners = config.listener_count(), "Listener registered.");
    Ok(())
  }

  /// Removes every registered listener.
  pub fn clear_listeners(&self) -> ParkResult<()> {
    let status = self.status.lock();
    if *status != Status::Initial {
      return Err(ParkError::invalid_state("clear_listeners", *status));
    }
    self.config.write().listeners.clear();
    Ok(())
  }

  /// Declares how many items the ingress will yield. Intake stops after that
  /// many items, even if the ingress has more.
  pub fn set_total(&self, total: u64) -> ParkResult<()> {
    let status = self.status.lock();
    if *status != Status::Initial {
      return Err(ParkError::invalid_state("set_total", *status));
    }
    self.counters.set_total(Some(total));
    Ok(())
  }
}
