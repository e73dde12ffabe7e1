use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ModelError, ModelResult};
use crate::schema::EntityType;

/// Lookup of schema descriptors by type name.
///
/// Implemented by [`SchemaCatalog`]; hosts that already keep their own
/// metadata can implement it directly.
pub trait Catalog {
    fn entity_type(&self, name: &str) -> Option<&EntityType>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn entity_type(&self, name: &str) -> Option<&EntityType> {
        (**self).entity_type(name)
    }
}

/// In-memory catalog of entity types, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaCatalog {
    types: BTreeMap<String, EntityType>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from descriptors and checks every navigation target.
    pub fn from_types(types: impl IntoIterator<Item = EntityType>) -> ModelResult<Self> {
        let mut catalog = Self::new();
        for ty in types {
            catalog.register(ty)?;
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parses a JSON array of descriptors.
    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        let types: Vec<EntityType> = serde_json::from_str(json)?;
        Self::from_types(types)
    }

    /// Adds a descriptor after checking it is self-consistent.
    pub fn register(&mut self, ty: EntityType) -> ModelResult<()> {
        ty.validate()?;
        if self.types.contains_key(&ty.name) {
            return Err(ModelError::DuplicateEntityType(ty.name));
        }
        self.types.insert(ty.name.clone(), ty);
        Ok(())
    }

    pub fn with(mut self, ty: EntityType) -> ModelResult<Self> {
        self.register(ty)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> ModelResult<&EntityType> {
        self.types
            .get(name)
            .ok_or_else(|| ModelError::UnknownEntityType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityType> {
        self.types.values()
    }

    /// Checks that every navigation targets a registered type.
    pub fn validate(&self) -> ModelResult<()> {
        for ty in self.types.values() {
            for nav in &ty.navigations {
                if !self.types.contains_key(&nav.target_type) {
                    return Err(ModelError::UnknownTarget {
                        entity_type: ty.name.clone(),
                        navigation: nav.name.clone(),
                        target: nav.target_type.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Catalog for SchemaCatalog {
    fn entity_type(&self, name: &str) -> Option<&EntityType> {
        self.types.get(name)
    }
}
