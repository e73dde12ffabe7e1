//! Entity graph model for detached merging.
//!
//! Defines the types the merge engine reads and reshapes:
//! - [`Entity`]: a dynamic entity instance (scalar properties + navigations)
//! - [`EntityType`]: per-type schema descriptor: keys, properties, relationships
//! - [`Catalog`] / [`SchemaCatalog`]: lookup of schema descriptors by type name
//!
//! Descriptors are resolved once when the catalog is built. The merge path
//! only walks the in-memory schema tree; nothing is inspected at run time.

mod catalog;
mod entity;
mod error;
mod json;
mod schema;

pub use catalog::{Catalog, SchemaCatalog};
pub use entity::{Entity, NavigationValue};
pub use error::{ModelError, ModelResult};
pub use schema::{
    AuditProperties, Cardinality, EntityType, EntityTypeBuilder, NavigationDef, PrimaryKey,
    PropertyDef, RelationshipKind,
};
