// park/src/error.rs
use crate::core::status::Status;
use anyhow::Error as AnyhowError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParkError {
  #[error("Operation '{operation}' is not allowed while the park is {status}")]
  InvalidState { operation: &'static str, status: Status },

  #[error("Invalid value for '{field}': {message}")]
  InvalidArgument { field: &'static str, message: String },

  #[error("Capacity exceeded for '{field}': requested {requested}, limit is {limit}")]
  CapacityExceeded {
    field: &'static str,
    limit: usize,
    requested: usize,
  },

  #[error("Stage '{stage_name}' (index {stage}) failed on lane {lane}. Source: {source}")]
  ItemProcessing {
    lane: usize,
    stage: usize,
    stage_name: String,
    #[source]
    source: AnyhowError,
  },

  /// The item was still queued or in flight on `lane` when the run was cancelled.
  /// `stage` is `None` when the item had not yet entered the stage chain.
  #[error("Item discarded by cancellation on lane {lane} (stage: {stage:?})")]
  Aborted { lane: usize, stage: Option<usize> },

  #[error("Drain did not complete within {waited:?}")]
  DrainTimeout { waited: Duration },

  #[error("Event queue overflow: {dropped} event(s) dropped")]
  Overflow { dropped: u64 },

  #[error("Park::start must be called from within a tokio runtime")]
  NoRuntime,
}

impl ParkError {
  pub(crate) fn invalid_state(operation: &'static str, status: Status) -> Self {
    ParkError::InvalidState { operation, status }
  }

  /// True for errors that travel with an item rather than being returned by the control surface.
  pub fn is_item_error(&self) -> bool {
    matches!(self, ParkError::ItemProcessing { .. } | ParkError::Aborted { .. })
  }
}

pub type ParkResult<T, E = ParkError> = std::result::Result<T, E>;
