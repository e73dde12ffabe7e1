use serde::{Deserialize, Serialize};
use std::fmt;

/// Change-tracking state of an entity instance.
///
/// `Detached` means the instance is not known to the tracking context at all;
/// the other variants are the states a storage layer acts on when committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    #[default]
    Detached,
    /// Tracked, exists in storage, nothing to write.
    Unchanged,
    /// Fresh insert.
    Added,
    /// Exists in storage, has pending property or relationship writes.
    Modified,
    /// Exists in storage, to be removed.
    Deleted,
}

impl EntityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detached => "detached",
            Self::Unchanged => "unchanged",
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }

    /// True for every state except `Detached`.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        !matches!(self, Self::Detached)
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
