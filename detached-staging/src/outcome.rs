use detached_types::EntityState;
use serde::{Deserialize, Serialize};

/// What a merge decided for one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    Unchanged,
    Modified,
    Added,
    /// Linked as an existing row; its own values were not merged.
    AttachedUnchanged,
    Deleted,
}

impl MergeOutcome {
    /// Derives the outcome from a final tracking state.
    /// `None` for instances that are not tracked.
    pub fn from_state(state: EntityState, attached: bool) -> Option<Self> {
        match state {
            EntityState::Detached => None,
            EntityState::Unchanged if attached => Some(Self::AttachedUnchanged),
            EntityState::Unchanged => Some(Self::Unchanged),
            EntityState::Added => Some(Self::Added),
            EntityState::Modified => Some(Self::Modified),
            EntityState::Deleted => Some(Self::Deleted),
        }
    }
}
