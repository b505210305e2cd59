// park/src/lane/intake.rs

//! The shared input point every lane pulls from.

use crate::core::ingress::Ingress;
use crate::core::item::{ItemId, WorkItem};
use crate::core::progress::Counters;
use std::sync::Arc;
use tokio::sync::Mutex;

struct IntakeState<T: Send + 'static> {
  source: Box<dyn Ingress<T>>,
  last_id: u64,
  exhausted: bool,
}

/// Single-producer, multi-consumer front of the park.
///
/// Lanes take turns on the lock, so an idle lane gets the next payload and a
/// busy one simply asks less often. Ids are assigned under the same lock,
/// which keeps them unique and increasing in admission order.
pub(crate) struct Intake<T: Send + 'static> {
  state: Mutex<IntakeState<T>>,
  counters: Arc<Counters>,
}

impl<T: Send + Sync + 'static> Intake<T> {
  pub(crate) fn new(source: Box<dyn Ingress<T>>, counters: Arc<Counters>) -> Arc<Self> {
    Arc::new(Self {
      state: Mutex::new(IntakeState {
        source,
        last_id: 0,
        exhausted: false,
      }),
      counters,
    })
  }

  /// Admits the next payload on behalf of `lane`. Returns `None` once the source
  /// is exhausted or, when a total is known, once that many items were admitted.
  ///
  /// Cancel-safe as long as the source's `next_payload` is.
  pub(crate) async fn admit(&self, lane: usize) -> Option<WorkItem<T>> {
    let mut state = self.state.lock().await;
    if state.exhausted {
      return None;
    }
    if self.counters.total().is_some_and(|total| state.last_id >= total) {
      state.exhausted = true;
      return None;
    }
    match state.source.next_payload().await {
      Some(value) => {
        state.last_id += 1;
        self.counters.record_submitted();
        Some(WorkItem::new(ItemId(state.last_id), lane, value))
      }
      None => {
        state.exhausted = true;
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::ingress::from_iter;

  #[tokio::test]
  async fn ids_increase_and_exhaustion_sticks() {
    let counters = Arc::new(Counters::default());
    let intake = Intake::new(Box::new(from_iter(vec!["a", "b"])), Arc::clone(&counters));

    let first = intake.admit(0).await.unwrap();
    let second = intake.admit(1).await.unwrap();
    assert_eq!(first.id().get(), 1);
    assert_eq!(second.id().get(), 2);
    assert_eq!(second.lane(), 1);
    assert!(intake.admit(0).await.is_none());
    assert!(intake.admit(1).await.is_none());
    assert_eq!(counters.submitted(), 2);
  }

  #[tokio::test]
  async fn known_total_caps_admission() {
    let counters = Arc::new(Counters::default());
    counters.set_total(Some(2));
    let intake = Intake::new(Box::new(from_iter(0..10)), Arc::clone(&counters));

    assert!(intake.admit(0).await.is_some());
    assert!(intake.admit(0).await.is_some());
    assert!(intake.admit(0).await.is_none());
    assert_eq!(counters.submitted(), 2);
  }
}
