//! Detached graph merging.
//!
//! A client edits a copy of an aggregate, disconnected from storage, and
//! submits the whole graph back. [`GraphMerger`] walks the submitted graph
//! against the persisted one and stages the minimal set of changes:
//!
//! - scalar properties that differ are copied onto the persisted instance
//! - owned children are merged, added or deleted with their owner
//! - associated targets are linked or unlinked, never modified or deleted
//!
//! Collection items are matched by primary key through [`reconcile`].
//! Decisions are reported to a [`StagingSink`](detached_staging::StagingSink).
//!
//! ```
//! use detached_merge::GraphMerger;
//! use detached_model::{Entity, EntityType, SchemaCatalog};
//! use detached_staging::{ChangeSet, MergeOutcome};
//!
//! let catalog = SchemaCatalog::from_types([
//!     EntityType::builder("Order").key("id").property("status").owns_many("lines", "Line").build()?,
//!     EntityType::builder("Line").key("id").property("qty").build()?,
//! ])?;
//!
//! let persisted = Entity::new("Order")
//!     .with("id", 1)
//!     .with("status", "open")
//!     .with_collection("lines", vec![Entity::new("Line").with("id", 10).with("qty", 2)]);
//! let mut submitted = persisted.clone();
//! submitted.set("status", "shipped");
//!
//! let mut changes = ChangeSet::new();
//! changes.track(&persisted);
//! let merged = GraphMerger::new(&catalog).update(&mut changes, submitted, Some(persisted))?;
//!
//! assert_eq!(changes.outcome(merged.entry_id()), Some(MergeOutcome::Modified));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod audit;
mod config;
mod engine;
mod error;
mod key;
mod reconcile;

pub use audit::{SessionInfoProvider, StaticSessionInfo, SystemSessionInfo};
pub use config::{DEFAULT_MAX_DEPTH, MergeConfig};
pub use engine::GraphMerger;
pub use error::{MergeError, MergeResult};
pub use key::{KeyToken, equal_by_key, key_of};
pub use reconcile::{ReconciledItem, Reconciliation, reconcile};
