//! Error types for the model layer.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Schema and graph-shape violations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No descriptor registered for the type.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    /// A navigation points at a type missing from the catalog.
    #[error("navigation {entity_type}.{navigation} targets unregistered type {target}")]
    UnknownTarget {
        entity_type: String,
        navigation: String,
        target: String,
    },

    #[error("entity type {0} declares no primary key")]
    EmptyPrimaryKey(String),

    #[error("primary key of {entity_type} names undeclared property {property}")]
    UndeclaredKeyProperty { entity_type: String, property: String },

    /// Property and navigation names share one namespace per type.
    #[error("duplicate member {member} on {entity_type}")]
    DuplicateMember { entity_type: String, member: String },

    #[error("entity type {0} is already registered")]
    DuplicateEntityType(String),

    /// A navigation value does not match the declared cardinality.
    #[error("navigation {entity_type}.{navigation} expected a {expected}")]
    CardinalityMismatch {
        entity_type: String,
        navigation: String,
        expected: &'static str,
    },

    /// A JSON member not declared by the schema.
    #[error("unknown member {member} on {entity_type}")]
    UnknownMember { entity_type: String, member: String },

    #[error("invalid JSON graph: {0}")]
    InvalidJson(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Value(#[from] detached_types::Error),
}
