use serde::{Deserialize, Serialize};

/// Default recursion limit for a single merge walk.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration for the graph merger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Deepest navigation level a merge, add or delete may reach below the root.
    pub max_depth: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
