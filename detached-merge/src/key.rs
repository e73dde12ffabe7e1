//! Key-based identity of entity instances.
//!
//! Reference matching and collection matching both go through this module,
//! so compound and partially-set keys behave the same everywhere.

use detached_model::{Entity, PrimaryKey};
use detached_types::Value;
use std::fmt;

use crate::error::{MergeError, MergeResult};

/// Key property values of one instance, in key order. Usable as a hash key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyToken(Vec<Value>);

impl KeyToken {
    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

fn key_value<'e>(entity: &'e Entity, property: &str) -> MergeResult<&'e Value> {
    if !entity.has(property) {
        return Err(MergeError::MissingKeyProperty {
            entity_type: entity.entity_type().to_string(),
            property: property.to_string(),
        });
    }
    Ok(entity.get(property))
}

/// Encodes the instance's key. Instances that are [`equal_by_key`] produce
/// equal tokens.
pub fn key_of(key: &PrimaryKey, entity: &Entity) -> MergeResult<KeyToken> {
    key.properties()
        .iter()
        .map(|p| key_value(entity, p).cloned())
        .collect::<MergeResult<Vec<_>>>()
        .map(KeyToken)
}

/// True iff both instances exist and every key value is equal.
///
/// A missing side never matches: a null cannot be compared to an existing row.
pub fn equal_by_key(key: &PrimaryKey, a: Option<&Entity>, b: Option<&Entity>) -> MergeResult<bool> {
    let (Some(a), Some(b)) = (a, b) else {
        return Ok(false);
    };
    for property in key.properties() {
        if key_value(a, property)? != key_value(b, property)? {
            return Ok(false);
        }
    }
    Ok(true)
}
