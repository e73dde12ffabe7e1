//! Graph merge engine.
//!
//! Walks a submitted graph and its persisted counterpart together, driven by
//! the catalog's descriptors, and decides per instance whether it is
//! unchanged, modified, added, attached or deleted. Decisions are applied to
//! the persisted graph in place and reported to a [`StagingSink`].
//!
//! The walk is synchronous and depth-first. The merger holds no mutable
//! state, so independent aggregates may be merged in parallel; a single
//! persisted graph and its sink must not be shared between concurrent merges.

use std::sync::Arc;

use detached_model::{Catalog, Entity, EntityType, NavigationDef, RelationshipKind};
use detached_staging::StagingSink;
use detached_types::{EntityState, EntryId};
use tracing::{debug, trace};

use crate::audit::{self, SessionInfoProvider, Stamp};
use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::key::{equal_by_key, key_of};
use crate::reconcile::{ReconciledItem, reconcile};

/// Reconciles detached graphs against persisted graphs.
pub struct GraphMerger<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    config: MergeConfig,
    session: Option<Arc<dyn SessionInfoProvider>>,
}

impl<'a, C: Catalog + ?Sized> GraphMerger<'a, C> {
    /// Creates a merger with the default configuration and no audit stamping.
    pub fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            config: MergeConfig::default(),
            session: None,
        }
    }

    pub fn with_config(mut self, config: MergeConfig) -> Self {
        self.config = config;
        self
    }

    /// Enables created/modified stamping.
    pub fn with_session(mut self, session: Arc<dyn SessionInfoProvider>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    // ── Root entry points ────────────────────────────────────────

    /// Merges `new` into `persisted` when a counterpart was loaded, adds it
    /// otherwise. Returns the graph to hand to storage.
    pub fn update<S: StagingSink + ?Sized>(
        &self,
        sink: &mut S,
        mut new: Entity,
        persisted: Option<Entity>,
    ) -> MergeResult<Entity> {
        let ty = self.resolve(new.entity_type())?;
        match persisted {
            Some(mut db) => {
                self.merge_root(sink, ty, new, &mut db)?;
                Ok(db)
            }
            None => {
                self.add_node(sink, ty, &mut new, 0)?;
                Ok(new)
            }
        }
    }

    /// Deletes a persisted root and its owned descendants.
    pub fn remove<S: StagingSink + ?Sized>(&self, sink: &mut S, persisted: &Entity) -> MergeResult<()> {
        let ty = self.resolve(persisted.entity_type())?;
        self.delete_node(sink, ty, persisted, 0)
    }

    // ── Operations ───────────────────────────────────────────────

    /// Merges `new` into its persisted counterpart `db`.
    ///
    /// Both must be instances of `entity_type` with equal keys.
    pub fn merge<S: StagingSink + ?Sized>(
        &self,
        sink: &mut S,
        entity_type: &str,
        new: Entity,
        db: &mut Entity,
    ) -> MergeResult<()> {
        let ty = self.resolve(entity_type)?;
        self.merge_root(sink, ty, new, db)
    }

    /// Stages `entity` and its owned descendants as fresh inserts and
    /// attaches every associated target.
    pub fn add<S: StagingSink + ?Sized>(
        &self,
        sink: &mut S,
        entity_type: &str,
        entity: &mut Entity,
    ) -> MergeResult<()> {
        let ty = self.resolve(entity_type)?;
        self.add_node(sink, ty, entity, 0)
    }

    /// Stages `entity` and its owned descendants for deletion. `None` is a no-op.
    pub fn delete<S: StagingSink + ?Sized>(
        &self,
        sink: &mut S,
        entity_type: &str,
        entity: Option<&Entity>,
    ) -> MergeResult<()> {
        let ty = self.resolve(entity_type)?;
        match entity {
            Some(entity) => self.delete_node(sink, ty, entity, 0),
            None => Ok(()),
        }
    }

    /// Marks an existing row as linked without inserting or merging it.
    pub fn attach<S: StagingSink + ?Sized>(
        &self,
        sink: &mut S,
        entity_type: &str,
        entity: &Entity,
    ) -> MergeResult<()> {
        let ty = self.resolve(entity_type)?;
        self.attach_node(sink, ty, entity)
    }

    // ── Walk ─────────────────────────────────────────────────────

    fn merge_root<S: StagingSink + ?Sized>(
        &self,
        sink: &mut S,
        ty: &EntityType,
        new: Entity,
        db: &mut Entity,
    ) -> MergeResult<()> {
        check_type(ty, &new)?;
        check_type(ty, db)?;
        if !equal_by_key(&ty.primary_key, Some(&new), Some(&*db))? {
            return Err(MergeError::KeyMismatch {
                entity_type: ty.name.clone(),
                submitted: key_of(&ty.primary_key, &new)?,
                persisted: key_of(&ty.primary_key, db)?,
            });
        }
        self.merge_node(sink, ty, new, db, 0)
    }

    fn merge_node<S: StagingSink + ?Sized>(
        &self,
        sink: &mut S,
        ty: &EntityType,
        mut new: Entity,
        db: &mut Entity,
        depth: usize,
    ) -> MergeResult<()> {
        check_type(ty, &new)?;
        check_type(ty, db)?;
        debug!("Merging {} {}", ty.name, db.entry_id());

        if !sink.state(db.entry_id()).is_tracked() {
            sink.set_state(db, EntityState::Unchanged);
        }

        let mut modified = false;
        for property in ty.overwritable_properties() {
            let value = new.get(&property.name);
            if db.get(&property.name) != value {
                trace!(
                    "{}.{} changed: {} -> {}",
                    ty.name,
                    property.name,
                    db.get(&property.name),
                    value
                );
                db.set(&property.name, value.clone());
                sink.set_property(db, &property.name, value);
                modified = true;
            }
        }

        for nav in &ty.navigations {
            if nav.kind == RelationshipKind::Other {
                continue;
            }
            let target = self.resolve(&nav.target_type)?;
            let changed = if nav.is_collection() {
                self.merge_collection(sink, nav, target, &mut new, db, depth)?
            } else {
                self.merge_reference(sink, nav, target, &mut new, db, depth)?
            };
            modified |= changed;
        }

        if modified {
            sink.set_state(db, EntityState::Modified);
            if let Some(session) = &self.session {
                audit::stamp(session.as_ref(), ty, db, sink, Stamp::Modified);
            }
        }
        Ok(())
    }

    /// Returns whether membership of the collection changed. A pure reorder
    /// is staged but does not count as a change of the owner.
    fn merge_collection<S: StagingSink + ?Sized>(
        &self,
        sink: &mut S,
        nav: &NavigationDef,
        target: &EntityType,
        new: &mut Entity,
        db: &mut Entity,
        depth: usize,
    ) -> MergeResult<bool> {
        let owned = nav.kind.is_owned();
        let submitted = new.take_collection(&nav.name)?;
        let present = db.navigation(&nav.name).is_some();
        let old = db.take_collection(&nav.name)?;
        let persisted_order: Vec<EntryId> = old.iter().map(Entity::entry_id).collect();
        let reconciled = reconcile(old, submitted, |item| key_of(&target.primary_key, item))?;
        let mut changed = !reconciled.removed.is_empty();

        let mut merged = Vec::with_capacity(reconciled.items.len());
        for item in reconciled.items {
            match item {
                ReconciledItem::Matched { new, mut old } => {
                    // associated targets keep their persisted values
                    if owned {
                        self.merge_node(sink, target, new, &mut old, self.deeper(depth)?)?;
                    }
                    merged.push(old);
                }
                ReconciledItem::Added(mut new) => {
                    if owned {
                        self.add_node(sink, target, &mut new, self.deeper(depth)?)?;
                    } else {
                        self.attach_node(sink, target, &new)?;
                    }
                    merged.push(new);
                    changed = true;
                }
            }
        }

        // Removed associated targets are only unlinked.
        if owned {
            for old in &reconciled.removed {
                self.delete_node(sink, target, old, self.deeper(depth)?)?;
            }
        }

        // an unset navigation stays unset when nothing was merged into it
        if present || !merged.is_empty() {
            db.set_collection(&nav.name, merged);
        }
        let items = db.collection(&nav.name)?;
        let reordered = !changed && !items.iter().map(Entity::entry_id).eq(persisted_order);
        if changed || reordered {
            debug!(
                "Collection {}.{} of {} {}",
                db.entity_type(),
                nav.name,
                db.entry_id(),
                if changed { "changed" } else { "reordered" }
            );
            sink.set_collection(db, &nav.name, items);
        }
        Ok(changed)
    }

    /// Returns whether the reference now points at a different instance.
    fn merge_reference<S: StagingSink + ?Sized>(
        &self,
        sink: &mut S,
        nav: &NavigationDef,
        target: &EntityType,
        new: &mut Entity,
        db: &mut Entity,
        depth: usize,
    ) -> MergeResult<bool> {
        let owned = nav.kind.is_owned();
        let submitted = new.take_reference(&nav.name)?;
        let present = db.navigation(&nav.name).is_some();
        let old = db.take_reference(&nav.name)?;

        match (submitted, old) {
            (None, None) => {
                if present {
                    db.set_reference(&nav.name, None);
                }
                Ok(false)
            }
            (Some(submitted), Some(mut old))
                if equal_by_key(&target.primary_key, Some(&submitted), Some(&old))? =>
            {
                if owned {
                    self.merge_node(sink, target, submitted, &mut old, self.deeper(depth)?)?;
                }
                db.set_reference(&nav.name, Some(old));
                Ok(false)
            }
            (submitted, old) => {
                // An owned target that is no longer referenced goes with the link.
                if let (true, Some(old)) = (owned, &old) {
                    self.delete_node(sink, target, old, self.deeper(depth)?)?;
                }
                let replacement = match submitted {
                    Some(mut submitted) => {
                        if owned {
                            self.add_node(sink, target, &mut submitted, self.deeper(depth)?)?;
                        } else {
                            self.attach_node(sink, target, &submitted)?;
                        }
                        Some(submitted)
                    }
                    None => None,
                };
                db.set_reference(&nav.name, replacement);
                let current = db.reference(&nav.name)?;
                sink.set_reference(db, &nav.name, current);
                Ok(true)
            }
        }
    }

    fn add_node<S: StagingSink + ?Sized>(
        &self,
        sink: &mut S,
        ty: &EntityType,
        entity: &mut Entity,
        depth: usize,
    ) -> MergeResult<()> {
        check_type(ty, entity)?;
        debug!("Adding {} {}", ty.name, entity.entry_id());

        if sink.state(entity.entry_id()) != EntityState::Added {
            sink.set_state(entity, EntityState::Added);
        }

        for nav in &ty.navigations {
            let (owned, associated) = (nav.kind.is_owned(), nav.kind.is_associated());
            if !(owned || associated) {
                continue;
            }
            let target = self.resolve(&nav.target_type)?;
            if nav.is_collection() {
                for item in entity.collection_mut(&nav.name)? {
                    if associated {
                        self.attach_node(sink, target, item)?;
                    } else {
                        self.add_node(sink, target, item, self.deeper(depth)?)?;
                    }
                }
            } else if let Some(item) = entity.reference_mut(&nav.name)? {
                if associated {
                    self.attach_node(sink, target, item)?;
                } else {
                    self.add_node(sink, target, item, self.deeper(depth)?)?;
                }
            }
        }

        if let Some(session) = &self.session {
            audit::stamp(session.as_ref(), ty, entity, sink, Stamp::Created);
        }
        Ok(())
    }

    fn delete_node<S: StagingSink + ?Sized>(
        &self,
        sink: &mut S,
        ty: &EntityType,
        entity: &Entity,
        depth: usize,
    ) -> MergeResult<()> {
        check_type(ty, entity)?;
        debug!("Deleting {} {}", ty.name, entity.entry_id());
        sink.set_state(entity, EntityState::Deleted);

        // Associated targets outlive their owner and are never cascaded.
        for nav in ty.navigations.iter().filter(|n| n.kind.is_owned()) {
            let target = self.resolve(&nav.target_type)?;
            if nav.is_collection() {
                for item in entity.collection(&nav.name)? {
                    self.delete_node(sink, target, item, self.deeper(depth)?)?;
                }
            } else if let Some(item) = entity.reference(&nav.name)? {
                self.delete_node(sink, target, item, self.deeper(depth)?)?;
            }
        }
        Ok(())
    }

    fn attach_node<S: StagingSink + ?Sized>(
        &self,
        sink: &mut S,
        ty: &EntityType,
        entity: &Entity,
    ) -> MergeResult<()> {
        check_type(ty, entity)?;
        trace!("Attaching {} {}", ty.name, entity.entry_id());
        sink.attach(entity);
        Ok(())
    }

    fn resolve(&self, name: &str) -> MergeResult<&'a EntityType> {
        let catalog: &'a C = self.catalog;
        catalog
            .entity_type(name)
            .ok_or_else(|| MergeError::UnknownEntityType(name.to_string()))
    }

    fn deeper(&self, depth: usize) -> MergeResult<usize> {
        let next = depth + 1;
        if next > self.config.max_depth {
            return Err(MergeError::MaxDepthExceeded(self.config.max_depth));
        }
        Ok(next)
    }
}

fn check_type(ty: &EntityType, entity: &Entity) -> MergeResult<()> {
    if entity.entity_type() != ty.name {
        return Err(MergeError::EntityTypeMismatch {
            expected: ty.name.clone(),
            actual: entity.entity_type().to_string(),
        });
    }
    Ok(())
}
