//! Core type definitions for detached graph merging.
//!
//! This crate defines the fundamental, schema-agnostic types shared by the
//! model, staging and merge crates:
//! - Entry identifiers (UUID v7) addressing entity instances
//! - Scalar property values with hashable equality and their declared kinds
//! - Change-tracking states
//!
//! Entity shapes (properties, relationships, keys) belong in the schema
//! catalog of `detached-model`, not here.

mod ids;
mod state;
mod value;

pub use ids::EntryId;
pub use state::EntityState;
pub use value::{Value, ValueKind};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}
