use detached_types::ValueKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ModelError, ModelResult};

/// A persistable scalar property of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    /// Scalar type used to decode the property from JSON.
    #[serde(default)]
    pub kind: ValueKind,
    /// Part of the primary key.
    #[serde(default)]
    pub is_key: bool,
    /// Holds the key of a related row; managed through the navigation instead.
    #[serde(default)]
    pub is_foreign_key: bool,
    /// Exists in storage but not on the submitted instance.
    #[serde(default)]
    pub is_shadow: bool,
    /// Never copied from a submitted graph (ignored or stamped columns).
    #[serde(default)]
    pub overwrite_exempt: bool,
}

impl PropertyDef {
    fn simple(name: &str) -> Self {
        Self {
            name: name.into(),
            kind: ValueKind::Any,
            is_key: false,
            is_foreign_key: false,
            is_shadow: false,
            overwrite_exempt: false,
        }
    }

    /// Shorthand for a plain value column.
    pub fn scalar(name: &str) -> Self {
        Self::simple(name)
    }

    /// Shorthand for a primary-key column.
    pub fn key(name: &str) -> Self {
        Self { is_key: true, ..Self::simple(name) }
    }

    /// Shorthand for a foreign-key column.
    pub fn foreign_key(name: &str) -> Self {
        Self { is_foreign_key: true, ..Self::simple(name) }
    }

    /// Shorthand for a shadow column.
    pub fn shadow(name: &str) -> Self {
        Self { is_shadow: true, ..Self::simple(name) }
    }

    /// Shorthand for a column excluded from overwrite.
    pub fn exempt(name: &str) -> Self {
        Self { overwrite_exempt: true, ..Self::simple(name) }
    }

    /// Declares the scalar type.
    pub fn of_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether a submitted value may replace the persisted one.
    pub fn is_overwritable(&self) -> bool {
        !(self.is_key || self.is_foreign_key || self.is_shadow || self.overwrite_exempt)
    }
}

/// Lifetime coupling between an owner and a navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Target lifetime bound to the owner; adds and deletes cascade.
    Owned,
    /// Independently-lived target; only the link is managed.
    Associated,
    /// Computed or ignored navigation. Skipped by merges.
    Other,
}

impl RelationshipKind {
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned)
    }

    pub fn is_associated(&self) -> bool {
        matches!(self, Self::Associated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    Single,
    Collection,
}

/// A relationship from one entity type to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationDef {
    pub name: String,
    pub kind: RelationshipKind,
    pub cardinality: Cardinality,
    pub target_type: String,
}

impl NavigationDef {
    pub fn new(name: &str, kind: RelationshipKind, cardinality: Cardinality, target: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            cardinality,
            target_type: target.into(),
        }
    }

    pub fn owned_reference(name: &str, target: &str) -> Self {
        Self::new(name, RelationshipKind::Owned, Cardinality::Single, target)
    }

    pub fn owned_collection(name: &str, target: &str) -> Self {
        Self::new(name, RelationshipKind::Owned, Cardinality::Collection, target)
    }

    pub fn associated_reference(name: &str, target: &str) -> Self {
        Self::new(name, RelationshipKind::Associated, Cardinality::Single, target)
    }

    pub fn associated_collection(name: &str, target: &str) -> Self {
        Self::new(name, RelationshipKind::Associated, Cardinality::Collection, target)
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.cardinality, Cardinality::Collection)
    }
}

/// Ordered primary-key property names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimaryKey(Vec<String>);

impl PrimaryKey {
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(properties.into_iter().map(Into::into).collect())
    }

    pub fn properties(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, property: &str) -> bool {
        self.0.iter().any(|p| p == property)
    }
}

/// Columns stamped with the acting user and time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

impl AuditProperties {
    pub fn is_empty(&self) -> bool {
        self.names().next().is_none()
    }

    pub fn contains(&self, property: &str) -> bool {
        self.names().any(|n| n == property)
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        [&self.created_by, &self.created_at, &self.modified_by, &self.modified_at]
            .into_iter()
            .filter_map(|n| n.as_deref())
    }
}

/// Schema descriptor of one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
    #[serde(default)]
    pub navigations: Vec<NavigationDef>,
    pub primary_key: PrimaryKey,
    #[serde(default)]
    pub audit: AuditProperties,
}

impl EntityType {
    pub fn builder(name: &str) -> EntityTypeBuilder {
        EntityTypeBuilder::new(name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn navigation(&self, name: &str) -> Option<&NavigationDef> {
        self.navigations.iter().find(|n| n.name == name)
    }

    /// Whether the merge may copy this property from a submitted entity.
    /// Audit columns are stamped, never copied.
    pub fn is_overwritable(&self, property: &PropertyDef) -> bool {
        property.is_overwritable()
            && !self.primary_key.contains(&property.name)
            && !self.audit.contains(&property.name)
    }

    /// Properties the merge diffs, in declaration order.
    pub fn overwritable_properties(&self) -> impl Iterator<Item = &PropertyDef> {
        self.properties.iter().filter(|p| self.is_overwritable(p))
    }

    /// Checks the descriptor is self-consistent. Navigation targets are
    /// checked by the catalog.
    pub fn validate(&self) -> ModelResult<()> {
        if self.primary_key.is_empty() {
            return Err(ModelError::EmptyPrimaryKey(self.name.clone()));
        }

        let mut seen = HashSet::new();
        let members = self
            .properties
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.navigations.iter().map(|n| n.name.as_str()));
        for member in members {
            if !seen.insert(member) {
                return Err(ModelError::DuplicateMember {
                    entity_type: self.name.clone(),
                    member: member.to_string(),
                });
            }
        }

        for property in self.primary_key.properties() {
            if self.property(property).is_none() {
                return Err(ModelError::UndeclaredKeyProperty {
                    entity_type: self.name.clone(),
                    property: property.clone(),
                });
            }
        }
        if let Some(property) = self.audit.names().find(|n| self.property(n).is_none()) {
            return Err(ModelError::UnknownMember {
                entity_type: self.name.clone(),
                member: property.to_string(),
            });
        }
        Ok(())
    }
}

/// Fluent construction of an [`EntityType`].
///
/// ```
/// use detached_model::EntityType;
///
/// let order = EntityType::builder("Order")
///     .key("id")
///     .property("note")
///     .owns_many("lines", "OrderLine")
///     .references_one("category", "Category")
///     .modified_at("updated_at")
///     .build()
///     .unwrap();
/// assert_eq!(order.primary_key.properties(), ["id"]);
/// ```
#[derive(Debug, Clone)]
pub struct EntityTypeBuilder {
    ty: EntityType,
}

impl EntityTypeBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            ty: EntityType {
                name: name.into(),
                properties: Vec::new(),
                navigations: Vec::new(),
                primary_key: PrimaryKey::default(),
                audit: AuditProperties::default(),
            },
        }
    }

    /// Declares a key property; call repeatedly for a compound key.
    pub fn key(mut self, name: &str) -> Self {
        self.ty.properties.push(PropertyDef::key(name));
        self.ty.primary_key.0.push(name.into());
        self
    }

    pub fn property(mut self, name: &str) -> Self {
        self.ty.properties.push(PropertyDef::scalar(name));
        self
    }

    /// Declares the scalar type of the most recently added property.
    pub fn of_kind(mut self, kind: ValueKind) -> Self {
        if let Some(property) = self.ty.properties.last_mut() {
            property.kind = kind;
        }
        self
    }

    pub fn foreign_key(mut self, name: &str) -> Self {
        self.ty.properties.push(PropertyDef::foreign_key(name));
        self
    }

    pub fn shadow(mut self, name: &str) -> Self {
        self.ty.properties.push(PropertyDef::shadow(name));
        self
    }

    pub fn exempt(mut self, name: &str) -> Self {
        self.ty.properties.push(PropertyDef::exempt(name));
        self
    }

    pub fn navigation(mut self, navigation: NavigationDef) -> Self {
        self.ty.navigations.push(navigation);
        self
    }

    pub fn owns_one(self, name: &str, target: &str) -> Self {
        self.navigation(NavigationDef::owned_reference(name, target))
    }

    pub fn owns_many(self, name: &str, target: &str) -> Self {
        self.navigation(NavigationDef::owned_collection(name, target))
    }

    pub fn references_one(self, name: &str, target: &str) -> Self {
        self.navigation(NavigationDef::associated_reference(name, target))
    }

    pub fn references_many(self, name: &str, target: &str) -> Self {
        self.navigation(NavigationDef::associated_collection(name, target))
    }

    pub fn created_by(mut self, name: &str) -> Self {
        self.ty.audit.created_by = Some(name.into());
        self.exempt(name).of_kind(ValueKind::Text)
    }

    pub fn created_at(mut self, name: &str) -> Self {
        self.ty.audit.created_at = Some(name.into());
        self.exempt(name).of_kind(ValueKind::Timestamp)
    }

    pub fn modified_by(mut self, name: &str) -> Self {
        self.ty.audit.modified_by = Some(name.into());
        self.exempt(name).of_kind(ValueKind::Text)
    }

    pub fn modified_at(mut self, name: &str) -> Self {
        self.ty.audit.modified_at = Some(name.into());
        self.exempt(name).of_kind(ValueKind::Timestamp)
    }

    pub fn build(self) -> ModelResult<EntityType> {
        self.ty.validate()?;
        Ok(self.ty)
    }
}
