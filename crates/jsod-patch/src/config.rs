use serde::{Deserialize, Serialize};

/// How patching treats merge conflicts left in a delta tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Fail before touching the target if any node carries conflicts.
    #[default]
    Reject,
    /// Ignore conflicts and apply the remaining records and subtrees.
    Skip,
}

/// Configuration for applying a delta tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchConfig {
    /// What to do with conflict-bearing nodes.
    pub conflict_policy: ConflictPolicy,
}

impl PatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that skips conflicts instead of rejecting them.
    pub fn skipping_conflicts() -> Self {
        Self::default().with_conflict_policy(ConflictPolicy::Skip)
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }
}
