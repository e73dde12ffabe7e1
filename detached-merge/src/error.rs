//! Error types for the merge engine.
//!
//! Every variant is a contract violation by the caller or the catalog.
//! The engine performs no recovery; errors propagate unmodified.

use detached_model::ModelError;
use thiserror::Error;

use crate::key::KeyToken;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

#[derive(Debug, Error)]
pub enum MergeError {
    /// The catalog has no descriptor for the type.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    /// An instance was passed where another type was declared.
    #[error("expected a {expected} instance, got {actual}")]
    EntityTypeMismatch { expected: String, actual: String },

    /// A key property was never set on the instance.
    #[error("{entity_type} instance has no value for key property {property}")]
    MissingKeyProperty { entity_type: String, property: String },

    /// The persisted instance handed to a merge is not the submitted one's counterpart.
    #[error("cannot merge {entity_type} {submitted} into persisted {persisted}")]
    KeyMismatch {
        entity_type: String,
        submitted: KeyToken,
        persisted: KeyToken,
    },

    #[error("graph is deeper than the configured maximum of {0}")]
    MaxDepthExceeded(usize),

    /// Navigation values of the wrong cardinality and other shape errors.
    #[error(transparent)]
    Model(#[from] ModelError),
}
