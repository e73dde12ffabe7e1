//! Key-based reconciliation of a persisted collection against a submitted one.
//!
//! Persisted items are hashed by key once, then the submitted collection is
//! scanned in order. Each lookup hit consumes one persisted item, so the cost
//! is O(n + m) on average.
//!
//! Duplicate keys are not deduplicated. Persisted duplicates queue up under
//! their key and are consumed first-come; a submitted item whose key has no
//! persisted item left is added, and persisted items never consumed are
//! removed.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use tracing::warn;

/// Classification of one submitted item.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciledItem<T> {
    /// A persisted item with the same key exists.
    Matched { new: T, old: T },
    /// No persisted counterpart.
    Added(T),
}

/// Partition of two collections by key.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation<T> {
    /// Submitted items in submitted order.
    pub items: Vec<ReconciledItem<T>>,
    /// Persisted items with no submitted counterpart, in persisted order.
    pub removed: Vec<T>,
}

impl<T> Reconciliation<T> {
    pub fn matched(&self) -> impl Iterator<Item = (&T, &T)> {
        self.items.iter().filter_map(|item| match item {
            ReconciledItem::Matched { new, old } => Some((new, old)),
            ReconciledItem::Added(_) => None,
        })
    }

    pub fn added(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter_map(|item| match item {
            ReconciledItem::Added(new) => Some(new),
            ReconciledItem::Matched { .. } => None,
        })
    }

    /// True when membership did not change (order may have).
    pub fn is_unchanged(&self) -> bool {
        self.removed.is_empty() && self.added().next().is_none()
    }

    /// Submitted order, persisted instance for matches, submitted instance
    /// for additions.
    pub fn into_merged_list(self) -> Vec<T> {
        self.items
            .into_iter()
            .map(|item| match item {
                ReconciledItem::Matched { old, .. } => old,
                ReconciledItem::Added(new) => new,
            })
            .collect()
    }
}

/// Partitions `new` against `old` using `key_of` for identity.
///
/// Fails with the first error `key_of` returns.
pub fn reconcile<T, K, E, F>(old: Vec<T>, new: Vec<T>, mut key_of: F) -> Result<Reconciliation<T>, E>
where
    K: Hash + Eq + Debug,
    F: FnMut(&T) -> Result<K, E>,
{
    let mut table: HashMap<K, VecDeque<(usize, T)>> = HashMap::with_capacity(old.len());
    for (position, item) in old.into_iter().enumerate() {
        let key = key_of(&item)?;
        table.entry(key).or_default().push_back((position, item));
    }

    let mut items = Vec::with_capacity(new.len());
    for item in new {
        let key = key_of(&item)?;
        match table.entry(key) {
            Entry::Occupied(mut slot) => match slot.get_mut().pop_front() {
                Some((_, old)) => items.push(ReconciledItem::Matched { new: item, old }),
                None => {
                    warn!("Duplicate key {:?} in submitted collection, treating as added", slot.key());
                    items.push(ReconciledItem::Added(item));
                }
            },
            // Leave an empty slot so a repeat of this key is recognised.
            Entry::Vacant(slot) => {
                slot.insert(VecDeque::new());
                items.push(ReconciledItem::Added(item));
            }
        }
    }

    let mut removed: Vec<(usize, T)> = table.into_values().flatten().collect();
    removed.sort_by_key(|(position, _)| *position);

    Ok(Reconciliation {
        items,
        removed: removed.into_iter().map(|(_, item)| item).collect(),
    })
}
