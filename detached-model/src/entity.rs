use detached_types::{EntryId, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ModelError, ModelResult};

static NULL: Value = Value::Null;

/// A dynamic entity instance.
///
/// Holds scalar properties by name and navigation values by name. The graph
/// is a tree of owned values: an associated target that is referenced from
/// two places appears as two instances with equal keys.
///
/// A property absent from the map reads as [`Value::Null`]; an absent
/// navigation reads as a null reference or an empty collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    entry_id: EntryId,
    entity_type: String,
    #[serde(default)]
    properties: BTreeMap<String, Value>,
    #[serde(default)]
    navigations: BTreeMap<String, NavigationValue>,
}

/// Value of one navigation on an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavigationValue {
    Collection(Vec<Entity>),
    Reference(Option<Box<Entity>>),
}

impl Entity {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entry_id: EntryId::new(),
            entity_type: entity_type.into(),
            properties: BTreeMap::new(),
            navigations: BTreeMap::new(),
        }
    }

    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    // ── Scalar properties ────────────────────────────────────────

    /// Returns the property value, `Null` when unset.
    pub fn get(&self, property: &str) -> &Value {
        self.properties.get(property).unwrap_or(&NULL)
    }

    /// Whether the property was explicitly set (possibly to `Null`).
    pub fn has(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    /// Sets a property and returns the previous value.
    pub fn set(&mut self, property: &str, value: impl Into<Value>) -> Value {
        self.properties
            .insert(property.to_string(), value.into())
            .unwrap_or_default()
    }

    pub fn with(mut self, property: &str, value: impl Into<Value>) -> Self {
        self.set(property, value);
        self
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ── Navigations ──────────────────────────────────────────────

    pub fn navigation(&self, name: &str) -> Option<&NavigationValue> {
        self.navigations.get(name)
    }

    pub fn navigations(&self) -> impl Iterator<Item = (&str, &NavigationValue)> {
        self.navigations.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn reference(&self, name: &str) -> ModelResult<Option<&Entity>> {
        match self.navigations.get(name) {
            None => Ok(None),
            Some(NavigationValue::Reference(r)) => Ok(r.as_deref()),
            Some(NavigationValue::Collection(_)) => Err(self.mismatch(name, "reference")),
        }
    }

    pub fn reference_mut(&mut self, name: &str) -> ModelResult<Option<&mut Entity>> {
        if let Some(NavigationValue::Collection(_)) = self.navigations.get(name) {
            return Err(self.mismatch(name, "reference"));
        }
        match self.navigations.get_mut(name) {
            Some(NavigationValue::Reference(r)) => Ok(r.as_deref_mut()),
            _ => Ok(None),
        }
    }

    pub fn collection(&self, name: &str) -> ModelResult<&[Entity]> {
        match self.navigations.get(name) {
            None => Ok(&[]),
            Some(NavigationValue::Collection(items)) => Ok(items),
            Some(NavigationValue::Reference(_)) => Err(self.mismatch(name, "collection")),
        }
    }

    pub fn collection_mut(&mut self, name: &str) -> ModelResult<&mut [Entity]> {
        if let Some(NavigationValue::Reference(_)) = self.navigations.get(name) {
            return Err(self.mismatch(name, "collection"));
        }
        match self.navigations.get_mut(name) {
            Some(NavigationValue::Collection(items)) => Ok(items),
            _ => Ok(&mut []),
        }
    }

    pub fn set_reference(&mut self, name: &str, target: Option<Entity>) {
        self.navigations.insert(
            name.to_string(),
            NavigationValue::Reference(target.map(Box::new)),
        );
    }

    pub fn set_collection(&mut self, name: &str, items: Vec<Entity>) {
        self.navigations
            .insert(name.to_string(), NavigationValue::Collection(items));
    }

    /// Moves the reference out, leaving the navigation unset.
    pub fn take_reference(&mut self, name: &str) -> ModelResult<Option<Entity>> {
        match self.navigations.remove(name) {
            None => Ok(None),
            Some(NavigationValue::Reference(r)) => Ok(r.map(|b| *b)),
            Some(other) => {
                self.navigations.insert(name.to_string(), other);
                Err(self.mismatch(name, "reference"))
            }
        }
    }

    /// Moves the collection out, leaving the navigation unset.
    pub fn take_collection(&mut self, name: &str) -> ModelResult<Vec<Entity>> {
        match self.navigations.remove(name) {
            None => Ok(Vec::new()),
            Some(NavigationValue::Collection(items)) => Ok(items),
            Some(other) => {
                self.navigations.insert(name.to_string(), other);
                Err(self.mismatch(name, "collection"))
            }
        }
    }

    pub fn with_reference(mut self, name: &str, target: Option<Entity>) -> Self {
        self.set_reference(name, target);
        self
    }

    pub fn with_collection(mut self, name: &str, items: Vec<Entity>) -> Self {
        self.set_collection(name, items);
        self
    }

    fn mismatch(&self, navigation: &str, expected: &'static str) -> ModelError {
        ModelError::CardinalityMismatch {
            entity_type: self.entity_type.clone(),
            navigation: navigation.to_string(),
            expected,
        }
    }
}
