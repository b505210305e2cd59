pub mod event;
pub mod ingress;
pub mod item;
pub mod payload;
pub mod progress;
pub mod stage;
pub mod status;

// Re-export key types for easier access from other park modules (and lib.rs)
pub use event::{Event, Listener, Outcome};
pub use ingress::{Ingress, IterIngress};
pub use item::{ItemId, WorkItem};
pub use payload::Payload;
pub use progress::Progress;
pub use stage::{StageContext, StageDef, StageFn};
pub use status::Status;
