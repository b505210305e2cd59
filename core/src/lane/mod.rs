// park/src/lane/mod.rs

//! Lanes and their stage executors, the shared intake and the terminal sinks.

pub(crate) mod executor;
pub(crate) mod intake;
pub mod sinks;
pub(crate) mod wiring;

pub use sinks::Outputs;
