// park/src/core/status.rs

//! Lifecycle states of a `Park` and the transitions allowed between them.

use std::fmt;

/// Status of a park.
///
/// ```text
/// Initial --start--> Open <--pause/resume--> Paused
/// Open|Paused --cancel--> Aborted
/// Open|Paused --drained--> Closed
/// Paused|Closed|Aborted --reset--> Initial
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
  /// Created or reset; configuration is mutable.
  Initial,
  /// Lanes are running and configuration is frozen.
  Open,
  /// Intake is gated; items already taken keep flowing.
  Paused,
  /// Every lane drained after the input ended or a graceful shutdown.
  Closed,
  /// Cancellation was requested.
  Aborted,
}

impl Status {
  /// Lanes exist and may still be consuming input.
  pub fn is_running(self) -> bool {
    matches!(self, Status::Open | Status::Paused)
  }

  /// A state that only `reset` can leave.
  pub fn is_terminal(self) -> bool {
    matches!(self, Status::Closed | Status::Aborted)
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Status::Initial => "initial",
      Status::Open => "open",
      Status::Paused => "paused",
      Status::Closed => "closed",
      Status::Aborted => "aborted",
    };
    f.write_str(name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn running_and_terminal_are_disjoint() {
    for status in [Status::Initial, Status::Open, Status::Paused, Status::Closed, Status::Aborted] {
      assert!(!(status.is_running() && status.is_terminal()), "{status}");
    }
    assert!(!Status::Initial.is_running());
    assert!(!Status::Initial.is_terminal());
  }

  #[test]
  fn display_is_lowercase() {
    assert_eq!(Status::Paused.to_string(), "paused");
    assert_eq!(Status::Aborted.to_string(), "aborted");
  }
}
