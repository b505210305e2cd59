// park/src/core/item.rs

//! The unit of data flowing through the lanes.

use crate::core::payload::Payload;
use crate::error::ParkError;
use std::fmt;
use std::sync::Arc;

/// Identifier assigned to an item when it is admitted from the ingress.
/// Ids start at 1 and increase monotonically within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub(crate) u64);

impl ItemId {
  pub fn get(self) -> u64 {
    self.0
  }
}

impl fmt::Display for ItemId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// One payload travelling through a lane together with its error state.
///
/// An item is owned by exactly one task at a time: the lane loop, then each
/// stage executor in turn, then the caller once it reaches a terminal output.
pub struct WorkItem<T: Send + Sync + 'static> {
  id: ItemId,
  lane: usize,
  payload: Payload<T>,
  error: Option<Arc<ParkError>>,
}

impl<T: Send + Sync + 'static> WorkItem<T> {
  pub(crate) fn new(id: ItemId, lane: usize, value: T) -> Self {
    Self {
      id,
      lane,
      payload: Payload::new(value),
      error: None,
    }
  }

  pub fn id(&self) -> ItemId {
    self.id
  }

  /// Index of the lane that processed this item.
  pub fn lane(&self) -> usize {
    self.lane
  }

  pub fn payload(&self) -> &Payload<T> {
    &self.payload
  }

  pub fn error(&self) -> Option<&Arc<ParkError>> {
    self.error.as_ref()
  }

  pub fn is_failed(&self) -> bool {
    self.error.is_some()
  }

  /// Takes the payload out of the item. Fails (returning the shared handle) while
  /// an event for this item is still waiting for delivery, which is the usual
  /// case when listeners are registered: use `payload().snapshot()` there.
  /// Without listeners the park itself keeps no other handle to it.
  pub fn into_payload(self) -> Result<T, Payload<T>> {
    self.payload.try_into_inner()
  }

  pub(crate) fn fail(&mut self, error: ParkError) {
    // The first failure wins; later stages never see this item.
    if self.error.is_none() {
      self.error = Some(Arc::new(error));
    }
  }
}

impl<T: Send + Sync + 'static + fmt::Debug> fmt::Debug for WorkItem<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WorkItem")
      .field("id", &self.id)
      .field("lane", &self.lane)
      .field("payload", &self.payload)
      .field("error", &self.error.as_ref().map(|e| e.to_string()))
      .finish()
  }
}
