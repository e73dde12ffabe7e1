//! Schema-guided conversion between JSON documents and entity graphs.
//!
//! A submitted graph arrives as plain JSON: declared properties are scalar
//! members, collection navigations are arrays, references are objects or
//! `null`. Nested objects take their type from the navigation's target.
//! Strings are decoded as UUIDs or timestamps where the property declares
//! that kind, so typed keys survive the round trip.

use detached_types::Value;
use serde_json::Map;

use crate::catalog::SchemaCatalog;
use crate::entity::{Entity, NavigationValue};
use crate::error::{ModelError, ModelResult};

impl SchemaCatalog {
    /// Builds a detached entity graph of `entity_type` from a JSON object.
    pub fn entity_from_json(
        &self,
        entity_type: &str,
        json: &serde_json::Value,
    ) -> ModelResult<Entity> {
        let ty = self.get(entity_type)?;
        let object = json.as_object().ok_or_else(|| {
            ModelError::InvalidJson(format!("{entity_type} must be a JSON object"))
        })?;

        let mut entity = Entity::new(entity_type);
        for (member, value) in object {
            if let Some(property) = ty.property(member) {
                entity.set(member, Value::from_json_as(value, property.kind)?);
                continue;
            }
            let nav = ty.navigation(member).ok_or_else(|| ModelError::UnknownMember {
                entity_type: entity_type.to_string(),
                member: member.clone(),
            })?;
            let mismatch = |expected| ModelError::CardinalityMismatch {
                entity_type: entity_type.to_string(),
                navigation: member.clone(),
                expected,
            };

            if nav.is_collection() {
                let items = match value {
                    serde_json::Value::Null => Vec::new(),
                    serde_json::Value::Array(items) => items
                        .iter()
                        .map(|item| self.entity_from_json(&nav.target_type, item))
                        .collect::<ModelResult<Vec<_>>>()?,
                    _ => return Err(mismatch("collection")),
                };
                entity.set_collection(member, items);
            } else {
                let target = match value {
                    serde_json::Value::Null => None,
                    serde_json::Value::Object(_) => {
                        Some(self.entity_from_json(&nav.target_type, value)?)
                    }
                    _ => return Err(mismatch("reference")),
                };
                entity.set_reference(member, target);
            }
        }
        Ok(entity)
    }

    /// Renders an entity graph back to JSON. Unset navigations are omitted.
    pub fn entity_to_json(&self, entity: &Entity) -> ModelResult<serde_json::Value> {
        let ty = self.get(entity.entity_type())?;
        let mut object = Map::new();
        for (name, value) in entity.properties() {
            if ty.property(name).is_none() {
                return Err(ModelError::UnknownMember {
                    entity_type: ty.name.clone(),
                    member: name.to_string(),
                });
            }
            object.insert(name.to_string(), value.to_json());
        }
        for (name, value) in entity.navigations() {
            let rendered = match value {
                NavigationValue::Collection(items) => serde_json::Value::Array(
                    items
                        .iter()
                        .map(|item| self.entity_to_json(item))
                        .collect::<ModelResult<Vec<_>>>()?,
                ),
                NavigationValue::Reference(None) => serde_json::Value::Null,
                NavigationValue::Reference(Some(target)) => self.entity_to_json(target)?,
            };
            object.insert(name.to_string(), rendered);
        }
        Ok(serde_json::Value::Object(object))
    }
}
