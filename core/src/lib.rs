// src/lib.rs

//! Park: a bounded-concurrency, multi-lane, multi-stage item processing
//! pipeline for Rust.
//!
//! A `Park<T>` takes a stream of payloads and routes each one through an
//! ordered chain of stage functions. The chain is replicated across a
//! configurable number of lanes that pull from one shared intake, so load
//! balances itself across lanes. Features:
//!  - Named async stages that mutate the payload in place.
//!  - Short-circuit on failure: a failed item skips every later stage and
//!    lands in the failure output with its error attached.
//!  - Bounded per-stage queues (backpressure) and FIFO order within a lane.
//!  - Pull-style outputs and push-style listeners, usable together.
//!  - A single status machine with pause/resume, graceful shutdown,
//!    cancellation, bounded waits and reset.

pub mod config;
pub mod core;
pub(crate) mod dispatch;
pub mod error;
pub mod lane;
pub mod pipeline;

// --- Re-exports for the Public API ---

pub use crate::config::{ParkConfig, ParkConfigBuilder, MAX_LANES, MAX_LISTENERS, MAX_STAGES};
pub use crate::core::event::{Event, Listener, Outcome};
pub use crate::core::ingress::{from_iter, Ingress, IterIngress};
pub use crate::core::item::{ItemId, WorkItem};
pub use crate::core::payload::Payload;
pub use crate::core::progress::Progress;
pub use crate::core::stage::{stage_fn, StageContext, StageDef, StageFn};
pub use crate::core::status::Status;
pub use crate::error::{ParkError, ParkResult};
pub use crate::lane::Outputs;
pub use crate::pipeline::Park;

/*
    Typical use:
    1. Build a `ParkConfig<T>` with `ParkConfig::builder()`: lanes, stages
       (`.stage("name", |ctx, payload| async move { ... })`), listeners.
    2. Create a `Park::with_config(config)` (or `Park::new()` + `configure`).
    3. Inside a tokio runtime, call `park.start(ingress)` with any `Ingress<T>`:
       an `mpsc::Receiver<T>`, or `park::from_iter(vec)`.
    4. Read the returned `Outputs<T>`, or rely on listeners.
    5. When the ingress ends the park closes by itself; call `shutdown()` to
       stop early and gracefully, `cancel()` to abort, and `wait()` to block
       until the run has drained.
*/
