// park/src/core/progress.rs

//! Aggregate counters shared by every lane.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

const UNKNOWN_TOTAL: i64 = -1;

/// Point-in-time view of the counters, attached to every event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
  pub succeeded: u64,
  pub failed: u64,
  pub total: Option<u64>,
}

impl Progress {
  pub fn finished(&self) -> u64 {
    self.succeeded + self.failed
  }
}

/// Lock-free run counters. Only ever incremented during a run; `clear` is
/// reserved for `reset`, when no task is left to touch them.
#[derive(Debug)]
pub(crate) struct Counters {
  total: AtomicI64,
  submitted: AtomicU64,
  succeeded: AtomicU64,
  failed: AtomicU64,
  overflow: AtomicU64,
}

impl Default for Counters {
  fn default() -> Self {
    Self {
      total: AtomicI64::new(UNKNOWN_TOTAL),
      submitted: AtomicU64::new(0),
      succeeded: AtomicU64::new(0),
      failed: AtomicU64::new(0),
      overflow: AtomicU64::new(0),
    }
  }
}

impl Counters {
  pub fn total(&self) -> Option<u64> {
    u64::try_from(self.total.load(Ordering::SeqCst)).ok()
  }

  pub fn set_total(&self, total: Option<u64>) {
    let raw = total.and_then(|t| i64::try_from(t).ok()).unwrap_or(UNKNOWN_TOTAL);
    self.total.store(raw, Ordering::SeqCst);
  }

  pub fn record_submitted(&self) {
    self.submitted.fetch_add(1, Ordering::SeqCst);
  }

  pub fn record_success(&self) -> Progress {
    let succeeded = self.succeeded.fetch_add(1, Ordering::SeqCst) + 1;
    Progress {
      succeeded,
      failed: self.failed.load(Ordering::SeqCst),
      total: self.total(),
    }
  }

  pub fn record_failure(&self) -> Progress {
    let failed = self.failed.fetch_add(1, Ordering::SeqCst) + 1;
    Progress {
      succeeded: self.succeeded.load(Ordering::SeqCst),
      failed,
      total: self.total(),
    }
  }

  pub fn record_overflow(&self) -> u64 {
    self.overflow.fetch_add(1, Ordering::SeqCst) + 1
  }

  pub fn submitted(&self) -> u64 {
    self.submitted.load(Ordering::SeqCst)
  }

  pub fn overflow(&self) -> u64 {
    self.overflow.load(Ordering::SeqCst)
  }

  pub fn snapshot(&self) -> Progress {
    Progress {
      succeeded: self.succeeded.load(Ordering::SeqCst),
      failed: self.failed.load(Ordering::SeqCst),
      total: self.total(),
    }
  }

  pub fn clear(&self) {
    self.total.store(UNKNOWN_TOTAL, Ordering::SeqCst);
    self.submitted.store(0, Ordering::SeqCst);
    self.succeeded.store(0, Ordering::SeqCst);
    self.failed.store(0, Ordering::SeqCst);
    self.overflow.store(0, Ordering::SeqCst);
  }
}
