use std::fmt;
use std::sync::Arc;

use jsod_types::{Conflict, ConflictNode, DeltaRecord, DeltaTree, PathSegment, PropertyPath};

use crate::node::merge_tree_nodes;
use crate::record::{merge_all_node_records, merge_record_pair};

// ---------------------------------------------------------------------------
// MergeStrategy
// ---------------------------------------------------------------------------

/// Result of merging one matched pair of records.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordMerge {
    /// The pair agrees and contributes this record.
    Merged(DeltaRecord),
    /// The pair disagrees and contributes no record.
    Conflicted(Conflict),
}

/// The three hook points of a merge.
///
/// Each method defaults to the standard behaviour; implementors override
/// the levels they want to change. Recursion goes back through the strategy,
/// so an override applies at every depth.
pub trait MergeStrategy: Send + Sync {
    /// Merge two nodes at `path`, appending every node that receives a
    /// conflict to `conflict_nodes`.
    fn merge_nodes(
        &self,
        a: Option<&DeltaTree>,
        b: Option<&DeltaTree>,
        path: &mut PropertyPath,
        conflict_nodes: &mut Vec<ConflictNode>,
    ) -> DeltaTree {
        merge_tree_nodes(self, a, b, path, conflict_nodes)
    }

    /// Merge the canonically sorted records of two nodes.
    fn merge_node_records(
        &self,
        a: &[DeltaRecord],
        b: &[DeltaRecord],
        path: &[PathSegment],
        conflicts: &mut Vec<Conflict>,
    ) -> Vec<DeltaRecord> {
        merge_all_node_records(self, a, b, path, conflicts)
    }

    /// Merge one matched pair of records.
    fn merge_records(&self, a: &DeltaRecord, b: &DeltaRecord, _path: &[PathSegment]) -> RecordMerge {
        merge_record_pair(a, b)
    }
}

/// The default merge strategy.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardMerge;

impl MergeStrategy for StandardMerge {}

// ---------------------------------------------------------------------------
// MergeConfig
// ---------------------------------------------------------------------------

/// Configuration for merging deltas.
#[derive(Clone)]
pub struct MergeConfig {
    strategy: Arc<dyn MergeStrategy>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            strategy: Arc::new(StandardMerge),
        }
    }
}

impl MergeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the merge strategy.
    pub fn with_strategy(mut self, strategy: impl MergeStrategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }

    pub fn strategy(&self) -> &dyn MergeStrategy {
        self.strategy.as_ref()
    }
}

impl fmt::Debug for MergeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeConfig").finish_non_exhaustive()
    }
}
