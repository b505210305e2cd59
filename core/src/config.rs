// park/src/config.rs

//! Park configuration: lane count, the ordered stage chain, listeners and
//! queue sizing. Built and validated once; a `Park` only accepts a new
//! configuration while it is `Initial`.

use crate::core::event::{Event, Listener};
use crate::core::payload::Payload;
use crate::core::stage::{StageContext, StageDef};
use crate::error::{ParkError, ParkResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const MAX_LANES: usize = 64;
pub const MAX_STAGES: usize = 32;
pub const MAX_LISTENERS: usize = 16;

pub const DEFAULT_LANES: usize = 1;
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;
pub const DEFAULT_EVENT_CAPACITY: usize = 256;
pub const DEFAULT_EVENT_SEND_TIMEOUT: Duration = Duration::from_millis(10);
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// A validated configuration. Cheap to clone: stages and listeners are shared.
pub struct ParkConfig<T: Send + Sync + 'static> {
  pub(crate) lanes: usize,
  pub(crate) stages: Vec<StageDef<T>>,
  pub(crate) listeners: Vec<Listener<T>>,
  pub(crate) queue_capacity: usize,
  pub(crate) event_capacity: usize,
  pub(crate) event_send_timeout: Duration,
  pub(crate) drain_timeout: Duration,
}

impl<T: Send + Sync + 'static> ParkConfig<T> {
  pub fn builder() -> ParkConfigBuilder<T> {
    ParkConfigBuilder::new()
  }

  pub fn lanes(&self) -> usize {
    self.lanes
  }

  pub fn stages(&self) -> &[StageDef<T>] {
    &self.stages
  }

  pub fn stage_names(&self) -> Vec<&str> {
    self.stages.iter().map(|s| &*s.name).collect()
  }

  pub fn listener_count(&self) -> usize {
    self.listeners.len()
  }

  pub fn queue_capacity(&self) -> usize {
    self.queue_capacity
  }

  pub fn event_capacity(&self) -> usize {
    self.event_capacity
  }

  pub fn event_send_timeout(&self) -> Duration {
    self.event_send_timeout
  }

  pub fn drain_timeout(&self) -> Duration {
    self.drain_timeout
  }

  pub(crate) fn push_listener(&mut self, listener: Listener<T>) -> ParkResult<()> {
    check_ceiling("listeners", self.listeners.len() + 1, MAX_LISTENERS)?;
    self.listeners.push(listener);
    Ok(())
  }
}

impl<T: Send + Sync + 'static> Default for ParkConfig<T> {
  fn default() -> Self {
    Self {
      lanes: DEFAULT_LANES,
      stages: Vec::new(),
      listeners: Vec::new(),
      queue_capacity: DEFAULT_QUEUE_CAPACITY,
      event_capacity: DEFAULT_EVENT_CAPACITY,
      event_send_timeout: DEFAULT_EVENT_SEND_TIMEOUT,
      drain_timeout: DEFAULT_DRAIN_TIMEOUT,
    }
  }
}

impl<T: Send + Sync + 'static> Clone for ParkConfig<T> {
  fn clone(&self) -> Self {
    Self {
      lanes: self.lanes,
      stages: self.stages.clone(),
      listeners: self.listeners.clone(),
      queue_capacity: self.queue_capacity,
      event_capacity: self.event_capacity,
      event_send_timeout: self.event_send_timeout,
      drain_timeout: self.drain_timeout,
    }
  }
}

impl<T: Send + Sync + 'static> std::fmt::Debug for ParkConfig<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ParkConfig")
      .field("lanes", &self.lanes)
      .field("stages", &self.stage_names())
      .field("listeners", &self.listeners.len())
      .field("queue_capacity", &self.queue_capacity)
      .field("event_capacity", &self.event_capacity)
      .field("event_send_timeout", &self.event_send_timeout)
      .field("drain_timeout", &self.drain_timeout)
      .finish()
  }
}

/// Fluent builder for `ParkConfig`. Nothing is checked until `build`.
pub struct ParkConfigBuilder<T: Send + Sync + 'static> {
  inner: ParkConfig<T>,
}

impl<T: Send + Sync + 'static> ParkConfigBuilder<T> {
  pub fn new() -> Self {
    Self {
      inner: ParkConfig::default(),
    }
  }

  pub fn lanes(mut self, lanes: usize) -> Self {
    self.inner.lanes = lanes;
    self
  }

  /// Appends a stage to the chain. Stages run in the order they are added.
  pub fn stage<F, Fut, E>(mut self, name: impl Into<String>, handler: F) -> Self
  where
    F: Fn(StageContext, Payload<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<anyhow::Error> + 'static,
  {
    self.inner.stages.push(StageDef::new(name, handler));
    self
  }

  pub fn stage_def(mut self, stage: StageDef<T>) -> Self {
    self.inner.stages.push(stage);
    self
  }

  pub fn listener(mut self, listener: impl Fn(&Event<T>) + Send + Sync + 'static) -> Self {
    self.inner.listeners.push(Arc::new(listener));
    self
  }

  pub fn queue_capacity(mut self, capacity: usize) -> Self {
    self.inner.queue_capacity = capacity;
    self
  }

  pub fn event_capacity(mut self, capacity: usize) -> Self {
    self.inner.event_capacity = capacity;
    self
  }

  pub fn event_send_timeout(mut self, timeout: Duration) -> Self {
    self.inner.event_send_timeout = timeout;
    self
  }

  pub fn drain_timeout(mut self, timeout: Duration) -> Self {
    self.inner.drain_timeout = timeout;
    self
  }

  pub fn build(self) -> ParkResult<ParkConfig<T>> {
    let cfg = self.inner;
    if cfg.lanes == 0 {
      return Err(ParkError::InvalidArgument {
        field: "lanes",
        message: "at least one lane is required".to_string(),
      });
    }
    check_ceiling("lanes", cfg.lanes, MAX_LANES)?;
    check_ceiling("stages", cfg.stages.len(), MAX_STAGES)?;
    check_ceiling("listeners", cfg.listeners.len(), MAX_LISTENERS)?;
    if cfg.queue_capacity == 0 {
      return Err(ParkError::InvalidArgument {
        field: "queue_capacity",
        message: "queue capacity must be non-zero".to_string(),
      });
    }
    if cfg.event_capacity == 0 {
      return Err(ParkError::InvalidArgument {
        field: "event_capacity",
        message: "event queue capacity must be non-zero".to_string(),
      });
    }
    Ok(cfg)
  }
}

impl<T: Send + Sync + 'static> Default for ParkConfigBuilder<T> {
  fn default() -> Self {
    Self::new()
  }
}

fn check_ceiling(field: &'static str, requested: usize, limit: usize) -> ParkResult<()> {
  if requested > limit {
    return Err(ParkError::CapacityExceeded { field, limit, requested });
  }
  Ok(())
}
