//! The delta tree: accumulated changes mirroring the changed paths.
//!
//! Each node carries records applied at its position, child nodes keyed by
//! path segment, and (after a merge) conflicts. The path from the root over
//! the subtree keys to a node is the property path that patching resolves on
//! the target.
//!
//! # Invariants
//!
//! - In a well-formed tree a node has records or subtrees, not both. Merge
//!   reports the mixed case as a structure conflict.
//! - Subtree keys are never [`PathSegment::Slot`].
//! - Records keyed by a slot live on the node of the list they address.

use std::collections::BTreeMap;

use crate::conflict::Conflict;
use crate::path::{PathSegment, PropertyPath};
use crate::record::{sort_records, Change, DeltaRecord};

/// A node of a delta tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeltaTree {
    /// Changes applied at this node (`"."`).
    pub records: Vec<DeltaRecord>,
    /// Changes nested one level deeper (`"/"`).
    pub subtrees: BTreeMap<PathSegment, DeltaTree>,
    /// Conflicts produced by merging (`"!"`). Ignored by diff.
    pub conflicts: Vec<Conflict>,
}

impl DeltaTree {
    /// Create an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the node holds no records, subtrees or conflicts.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.subtrees.is_empty() && self.conflicts.is_empty()
    }

    pub fn has_records(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn has_subtrees(&self) -> bool {
        !self.subtrees.is_empty()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Append a record at `path`, creating intermediate nodes as needed.
    ///
    /// Every segment up to the first [`PathSegment::Slot`] becomes a subtree
    /// key. The record is keyed by the last segment of the path, so numeric
    /// keys stay numeric even though they also appear as subtree keys. An
    /// empty path records at this node with no key (root replacement).
    pub fn record(&mut self, path: &[PathSegment], change: Change) {
        let mut node = self;
        for segment in path {
            if segment.is_slot() {
                break;
            }
            node = node.subtrees.entry(segment.clone()).or_default();
        }
        node.records
            .push(DeltaRecord::new(path.last().cloned(), change));
    }

    /// The child node at `segment`.
    pub fn subtree(&self, segment: &PathSegment) -> Option<&DeltaTree> {
        self.subtrees.get(segment)
    }

    /// The node at `path`, relative to this node.
    pub fn node_at(&self, path: &[PathSegment]) -> Option<&DeltaTree> {
        path.iter()
            .try_fold(self, |node, segment| node.subtrees.get(segment))
    }

    /// Sort this node's records into canonical order.
    pub fn sort_records(&mut self) {
        sort_records(&mut self.records);
    }

    /// Sort the records of every node in this tree into canonical order.
    pub fn sort_all_records(&mut self) {
        self.sort_records();
        for child in self.subtrees.values_mut() {
            child.sort_all_records();
        }
    }

    /// Paths of every node that carries conflicts, depth-first.
    pub fn conflict_paths(&self) -> Vec<PropertyPath> {
        let mut paths = Vec::new();
        let mut current = Vec::new();
        self.collect_conflict_paths(&mut current, &mut paths);
        paths
    }

    fn collect_conflict_paths(&self, current: &mut PropertyPath, out: &mut Vec<PropertyPath>) {
        if self.has_conflicts() {
            out.push(current.clone());
        }
        for (segment, child) in &self.subtrees {
            current.push(segment.clone());
            child.collect_conflict_paths(current, out);
            current.pop();
        }
    }

    /// Total number of records in this tree.
    pub fn record_count(&self) -> usize {
        self.records.len()
            + self
                .subtrees
                .values()
                .map(DeltaTree::record_count)
                .sum::<usize>()
    }

    /// Total number of conflicts in this tree.
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
            + self
                .subtrees
                .values()
                .map(DeltaTree::conflict_count)
                .sum::<usize>()
    }
}
