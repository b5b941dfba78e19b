pub mod lifecycle;
pub mod types;

pub use lifecycle::{LifecycleOrchestrator, RunContext};
pub use types::{HarnessError, HarnessResult};
