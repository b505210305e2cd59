// park/src/pipeline/mod.rs

//! Defines the `Park<T>` controller: configuration, start, lifecycle control and snapshots.

pub mod control;
pub mod definition;
pub mod execution;
pub mod hooks;

// Re-export the main Park struct
pub use definition::Park;
