//! Staging of merge decisions for a storage layer.
//!
//! The merge engine never writes to storage. It reports each decision to a
//! [`StagingSink`]: the state of every instance it touched, and the property,
//! collection and reference values it wrote on persisted instances. A storage
//! layer implements the sink to feed its own change tracker, or uses the
//! in-memory [`ChangeSet`] and replays its [`StagedChange`] log at commit.

mod change_set;
mod outcome;
mod sink;

pub use change_set::{ChangeSet, StagedChange, TrackedEntry};
pub use outcome::MergeOutcome;
pub use sink::StagingSink;
