//! Merge engine for jsod.
//!
//! Combines two delta trees computed from a common origin into one. Changes
//! that do not overlap are both kept; changes that disagree at the same
//! node become [`Conflict`](jsod_types::Conflict) entries on that node
//! instead of records. Conflicts are data, so merging always succeeds.
//!
//! # Key Types
//!
//! - [`MergeOutcome`] -- The merged tree plus a lookup list of conflict-bearing nodes
//! - [`MergeConfig`] / [`MergeStrategy`] -- Node, record-set and record-pair hook points
//! - [`RecordMerge`] -- Result of merging one matched pair of records

pub mod node;
pub mod record;
pub mod strategy;

pub use node::merge_tree_nodes;
pub use record::{find_matching_record, merge_all_node_records, merge_record_pair};
pub use strategy::{MergeConfig, MergeStrategy, RecordMerge, StandardMerge};

use jsod_diff::{diff_with_config, DiffConfig};
use jsod_types::{ConflictNode, DeltaTree, PathSegment, Value};
use tracing::debug;

/// The result of merging two deltas.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeOutcome {
    /// The combined delta.
    pub merged: DeltaTree,
    /// Every node that received a conflict during the merge, with its path.
    pub conflict_nodes: Vec<ConflictNode>,
}

impl MergeOutcome {
    /// Returns `true` if the merge produced any conflict.
    pub fn has_conflicts(&self) -> bool {
        !self.conflict_nodes.is_empty()
    }

    /// Number of conflicts produced by the merge.
    pub fn conflict_count(&self) -> usize {
        self.conflict_nodes.iter().map(|n| n.node.conflicts.len()).sum()
    }
}

/// Merge two deltas with the default strategy.
pub fn merge(a: Option<&DeltaTree>, b: Option<&DeltaTree>) -> MergeOutcome {
    merge_deltas(a, b, &MergeConfig::default())
}

/// Merge two deltas computed from the same origin.
pub fn merge_deltas(a: Option<&DeltaTree>, b: Option<&DeltaTree>, config: &MergeConfig) -> MergeOutcome {
    merge_deltas_at(a, b, config, &[])
}

/// Merge two deltas whose roots sit at `parent_path` of a larger tree.
///
/// The path only prefixes the paths reported in
/// [`MergeOutcome::conflict_nodes`].
pub fn merge_deltas_at(
    a: Option<&DeltaTree>,
    b: Option<&DeltaTree>,
    config: &MergeConfig,
    parent_path: &[PathSegment],
) -> MergeOutcome {
    let mut path = parent_path.to_vec();
    let mut conflict_nodes = Vec::new();
    let merged = config.strategy().merge_nodes(a, b, &mut path, &mut conflict_nodes);

    debug!(
        records = merged.record_count(),
        conflict_nodes = conflict_nodes.len(),
        "merge complete"
    );
    MergeOutcome {
        merged,
        conflict_nodes,
    }
}

/// Diff `origin` against both changed sides and merge the two deltas.
pub fn diff3(
    changed_a: Option<&Value>,
    origin: Option<&Value>,
    changed_b: Option<&Value>,
    diff_config: &DiffConfig,
    merge_config: &MergeConfig,
) -> MergeOutcome {
    let delta_a = diff_with_config(origin, changed_a, diff_config);
    let delta_b = diff_with_config(origin, changed_b, diff_config);
    merge_deltas(Some(&delta_a), Some(&delta_b), merge_config)
}

/// [`diff3`] with the default diff and merge configurations.
pub fn merge3(changed_a: Option<&Value>, origin: Option<&Value>, changed_b: Option<&Value>) -> MergeOutcome {
    diff3(
        changed_a,
        origin,
        changed_b,
        &DiffConfig::default(),
        &MergeConfig::default(),
    )
}
