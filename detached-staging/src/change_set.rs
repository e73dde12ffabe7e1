//! In-memory staging sink.
//!
//! Keeps the latest state of every instance plus an ordered log of the
//! decisions that produced it. The log is what a storage layer replays when
//! it commits; the entry table answers "what happens to this instance".

use detached_model::{Entity, NavigationValue};
use detached_types::{EntityState, EntryId, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

use crate::outcome::MergeOutcome;
use crate::sink::StagingSink;

/// One recorded decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StagedChange {
    State {
        entry: EntryId,
        entity_type: String,
        state: EntityState,
    },
    Property {
        entry: EntryId,
        property: String,
        value: Value,
    },
    Collection {
        entry: EntryId,
        navigation: String,
        items: Vec<EntryId>,
    },
    Reference {
        entry: EntryId,
        navigation: String,
        target: Option<EntryId>,
    },
}

impl StagedChange {
    pub fn entry(&self) -> EntryId {
        match self {
            Self::State { entry, .. }
            | Self::Property { entry, .. }
            | Self::Collection { entry, .. }
            | Self::Reference { entry, .. } => *entry,
        }
    }

    /// True for value writes, false for state transitions.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::State { .. })
    }
}

/// Latest known facts about one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEntry {
    pub entity_type: String,
    pub state: EntityState,
    /// Reached `Unchanged` through an attach rather than a load or merge.
    pub attached: bool,
    /// Scalar values as of the last decision, so deleted or attached rows can
    /// still be addressed by key after the instance is dropped from the graph.
    pub properties: BTreeMap<String, Value>,
}

impl TrackedEntry {
    fn from_entity(entity: &Entity) -> Self {
        Self {
            entity_type: entity.entity_type().to_string(),
            state: EntityState::Detached,
            attached: false,
            properties: snapshot(entity),
        }
    }

    pub fn outcome(&self) -> Option<MergeOutcome> {
        MergeOutcome::from_state(self.state, self.attached)
    }
}

fn snapshot(entity: &Entity) -> BTreeMap<String, Value> {
    entity
        .properties()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Records staged decisions in memory.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    entries: HashMap<EntryId, TrackedEntry>,
    log: Vec<StagedChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a graph loaded from storage as `Unchanged`, recursively.
    ///
    /// Loading is not a decision, so nothing is logged. Instances that are
    /// already tracked keep their state.
    pub fn track(&mut self, entity: &Entity) {
        self.entries.entry(entity.entry_id()).or_insert_with(|| TrackedEntry {
            state: EntityState::Unchanged,
            ..TrackedEntry::from_entity(entity)
        });
        for (_, nav) in entity.navigations() {
            match nav {
                NavigationValue::Collection(items) => items.iter().for_each(|i| self.track(i)),
                NavigationValue::Reference(Some(target)) => self.track(target),
                NavigationValue::Reference(None) => {}
            }
        }
    }

    pub fn entry(&self, entry: EntryId) -> Option<&TrackedEntry> {
        self.entries.get(&entry)
    }

    pub fn outcome(&self, entry: EntryId) -> Option<MergeOutcome> {
        self.entries.get(&entry).and_then(TrackedEntry::outcome)
    }

    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &TrackedEntry)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    /// Entries currently in `state`, sorted by entry id.
    pub fn entries_in(&self, state: EntityState) -> Vec<EntryId> {
        let mut ids: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, e)| e.state == state)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// The decision log in the order decisions were made.
    pub fn changes(&self) -> &[StagedChange] {
        &self.log
    }

    pub fn into_changes(self) -> Vec<StagedChange> {
        self.log
    }

    /// Whether any property, collection or reference write was staged.
    pub fn has_writes(&self) -> bool {
        self.log.iter().any(StagedChange::is_write)
    }

    /// Number of tracked instances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.log.clear();
    }

    fn tracked(&mut self, entity: &Entity) -> &mut TrackedEntry {
        self.entries
            .entry(entity.entry_id())
            .or_insert_with(|| TrackedEntry::from_entity(entity))
    }
}

impl StagingSink for ChangeSet {
    fn state(&self, entry: EntryId) -> EntityState {
        self.entries
            .get(&entry)
            .map(|e| e.state)
            .unwrap_or(EntityState::Detached)
    }

    fn set_state(&mut self, entity: &Entity, state: EntityState) {
        let tracked = self.tracked(entity);
        let previous = tracked.state;
        tracked.state = state;
        tracked.attached = false;
        tracked.properties = snapshot(entity);
        if previous == state {
            return;
        }
        trace!("{} {}: {} -> {}", entity.entity_type(), entity.entry_id(), previous, state);
        self.log.push(StagedChange::State {
            entry: entity.entry_id(),
            entity_type: entity.entity_type().to_string(),
            state,
        });
    }

    fn attach(&mut self, entity: &Entity) {
        self.set_state(entity, EntityState::Unchanged);
        self.tracked(entity).attached = true;
    }

    fn set_property(&mut self, entity: &Entity, property: &str, value: &Value) {
        self.tracked(entity)
            .properties
            .insert(property.to_string(), value.clone());
        self.log.push(StagedChange::Property {
            entry: entity.entry_id(),
            property: property.to_string(),
            value: value.clone(),
        });
    }

    fn set_collection(&mut self, entity: &Entity, navigation: &str, items: &[Entity]) {
        self.tracked(entity);
        self.log.push(StagedChange::Collection {
            entry: entity.entry_id(),
            navigation: navigation.to_string(),
            items: items.iter().map(Entity::entry_id).collect(),
        });
    }

    fn set_reference(&mut self, entity: &Entity, navigation: &str, target: Option<&Entity>) {
        self.tracked(entity);
        self.log.push(StagedChange::Reference {
            entry: entity.entry_id(),
            navigation: navigation.to_string(),
            target: target.map(Entity::entry_id),
        });
    }
}
