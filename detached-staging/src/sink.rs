use detached_model::Entity;
use detached_types::{EntityState, EntryId, Value};

/// Receives the engine's per-instance decisions.
///
/// Instances are addressed by [`Entity::entry_id`]. The engine has already
/// applied each write to the persisted instance when it reports it; the sink
/// records intent and never has to mutate the graph itself.
pub trait StagingSink {
    /// Current tracking state, `Detached` for instances never seen.
    fn state(&self, entry: EntryId) -> EntityState;

    fn set_state(&mut self, entity: &Entity, state: EntityState);

    /// Marks an instance as an existing row, linked without insert or update.
    fn attach(&mut self, entity: &Entity) {
        self.set_state(entity, EntityState::Unchanged);
    }

    fn set_property(&mut self, entity: &Entity, property: &str, value: &Value);

    /// The full, ordered contents a collection navigation must have after commit.
    fn set_collection(&mut self, entity: &Entity, navigation: &str, items: &[Entity]);

    fn set_reference(&mut self, entity: &Entity, navigation: &str, target: Option<&Entity>);
}

impl<S: StagingSink + ?Sized> StagingSink for &mut S {
    fn state(&self, entry: EntryId) -> EntityState {
        (**self).state(entry)
    }

    fn set_state(&mut self, entity: &Entity, state: EntityState) {
        (**self).set_state(entity, state)
    }

    fn attach(&mut self, entity: &Entity) {
        (**self).attach(entity)
    }

    fn set_property(&mut self, entity: &Entity, property: &str, value: &Value) {
        (**self).set_property(entity, property, value)
    }

    fn set_collection(&mut self, entity: &Entity, navigation: &str, items: &[Entity]) {
        (**self).set_collection(entity, navigation, items)
    }

    fn set_reference(&mut self, entity: &Entity, navigation: &str, target: Option<&Entity>) {
        (**self).set_reference(entity, navigation, target)
    }
}
