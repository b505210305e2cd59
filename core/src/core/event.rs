// park/src/core/event.rs

//! Terminal-outcome notifications delivered to listeners.

use crate::core::item::{ItemId, WorkItem};
use crate::core::payload::Payload;
use crate::core::progress::Progress;
use crate::error::ParkError;
use std::sync::Arc;

/// Final disposition of one item.
pub enum Outcome<T: Send + Sync + 'static> {
  Succeeded(Payload<T>),
  Failed { payload: Payload<T>, error: Arc<ParkError> },
}

impl<T: Send + Sync + 'static> Clone for Outcome<T> {
  fn clone(&self) -> Self {
    match self {
      Outcome::Succeeded(payload) => Outcome::Succeeded(payload.clone()),
      Outcome::Failed { payload, error } => Outcome::Failed {
        payload: payload.clone(),
        error: Arc::clone(error),
      },
    }
  }
}

/// Emitted once per item when it reaches a terminal sink.
///
/// The event shares the payload with the item but does not borrow the item,
/// so it stays usable after the item has been consumed or dropped.
pub struct Event<T: Send + Sync + 'static> {
  pub id: ItemId,
  pub lane: usize,
  pub outcome: Outcome<T>,
  pub progress: Progress,
}

impl<T: Send + Sync + 'static> Event<T> {
  pub(crate) fn for_item(item: &WorkItem<T>, progress: Progress) -> Self {
    let payload = item.payload().clone();
    let outcome = match item.error() {
      None => Outcome::Succeeded(payload),
      Some(error) => Outcome::Failed {
        payload,
        error: Arc::clone(error),
      },
    };
    Self {
      id: item.id(),
      lane: item.lane(),
      outcome,
      progress,
    }
  }

  pub fn payload(&self) -> &Payload<T> {
    match &self.outcome {
      Outcome::Succeeded(payload) => payload,
      Outcome::Failed { payload, .. } => payload,
    }
  }

  pub fn error(&self) -> Option<&ParkError> {
    match &self.outcome {
      Outcome::Succeeded(_) => None,
      Outcome::Failed { error, .. } => Some(error),
    }
  }

  pub fn is_success(&self) -> bool {
    matches!(self.outcome, Outcome::Succeeded(_))
  }
}

impl<T: Send + Sync + 'static> Clone for Event<T> {
  fn clone(&self) -> Self {
    Self {
      id: self.id,
      lane: self.lane,
      outcome: self.outcome.clone(),
      progress: self.progress,
    }
  }
}

impl<T: Send + Sync + 'static> std::fmt::Debug for Event<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Event")
      .field("id", &self.id)
      .field("lane", &self.lane)
      .field("success", &self.is_success())
      .field("progress", &self.progress)
      .finish()
  }
}

/// A listener callback. Listeners run on the dispatcher task, one event at a
/// time, and should return quickly.
pub type Listener<T> = Arc<dyn Fn(&Event<T>) + Send + Sync>;
