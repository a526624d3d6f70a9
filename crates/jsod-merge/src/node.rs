//! Node-level merge.

use std::collections::BTreeSet;

use jsod_types::{
    sort_records, Conflict, ConflictNode, DeltaTree, PathDisplay, PathSegment, PropertyPath,
};
use tracing::debug;

use crate::strategy::MergeStrategy;

/// Merge two delta nodes at `path`.
///
/// - Neither side: an empty node. One side: a clone of it.
/// - Records on one side and subtrees on either: a structure conflict
///   holding both whole nodes, nothing else is merged.
/// - Records only: both sides are sorted and merged record by record; the
///   merged records are sorted again.
/// - Subtrees only: children are merged over the union of keys and kept
///   when not empty. An index and a property named by that index are the
///   same child; the merged child takes `b`'s key.
///
/// Conflicts already carried by either node are kept once. A node that receives
/// a new conflict is appended to `conflict_nodes`.
pub fn merge_tree_nodes<S: MergeStrategy + ?Sized>(
    strategy: &S,
    a: Option<&DeltaTree>,
    b: Option<&DeltaTree>,
    path: &mut PropertyPath,
    conflict_nodes: &mut Vec<ConflictNode>,
) -> DeltaTree {
    let (a, b) = match (a, b) {
        (None, None) => return DeltaTree::new(),
        (Some(node), None) | (None, Some(node)) => return node.clone(),
        (Some(a), Some(b)) => (a, b),
    };

    let mut node = DeltaTree::new();
    let mut conflicts = Vec::new();
    let has_records = a.has_records() || b.has_records();
    let has_subtrees = a.has_subtrees() || b.has_subtrees();

    if has_records && has_subtrees {
        conflicts.push(Conflict::structure(a.clone(), b.clone()));
    } else if has_records {
        let mut records_a = a.records.clone();
        let mut records_b = b.records.clone();
        sort_records(&mut records_a);
        sort_records(&mut records_b);

        node.records = strategy.merge_node_records(&records_a, &records_b, path, &mut conflicts);
        node.sort_records();
    } else if has_subtrees {
        for (key, child_a, child_b) in paired_subtrees(a, b) {
            path.push(key.clone());
            let child = strategy.merge_nodes(child_a, child_b, path, conflict_nodes);
            path.pop();
            if !child.is_empty() {
                node.subtrees.insert(key.clone(), child);
            }
        }
    }

    node.conflicts = a.conflicts.clone();
    for carried in &b.conflicts {
        if !node.conflicts.contains(carried) {
            node.conflicts.push(carried.clone());
        }
    }
    if !conflicts.is_empty() {
        for conflict in &conflicts {
            debug!(path = %PathDisplay(path.as_slice()), kind = %conflict.conflict_type, "merge conflict");
        }
        node.conflicts.extend(conflicts);
        conflict_nodes.push(ConflictNode {
            path: path.clone(),
            node: node.clone(),
        });
    }
    node
}

type SubtreePair<'t> = (&'t PathSegment, Option<&'t DeltaTree>, Option<&'t DeltaTree>);

/// Children of `a` and `b` paired by the entry they address, in key order.
fn paired_subtrees<'t>(a: &'t DeltaTree, b: &'t DeltaTree) -> Vec<SubtreePair<'t>> {
    let mut taken = BTreeSet::new();
    let mut pairs = Vec::with_capacity(a.subtrees.len().max(b.subtrees.len()));

    for (key_a, child_a) in &a.subtrees {
        let found = b
            .subtrees
            .get_key_value(key_a)
            .or_else(|| alternate_key(key_a).and_then(|alt| b.subtrees.get_key_value(&alt)));
        match found {
            Some((key_b, child_b)) if !taken.contains(key_b) => {
                taken.insert(key_b);
                pairs.push((key_b, Some(child_a), Some(child_b)));
            }
            _ => pairs.push((key_a, Some(child_a), None)),
        }
    }
    pairs.extend(
        b.subtrees
            .iter()
            .filter(|(key, _)| !taken.contains(key))
            .map(|(key, child)| (key, None, Some(child))),
    );
    pairs.sort_by(|x, y| x.0.cmp(y.0));
    pairs
}

/// The other spelling of a key that [`PathSegment::addresses_same`] accepts.
fn alternate_key(key: &PathSegment) -> Option<PathSegment> {
    match key {
        PathSegment::Index(i) => Some(PathSegment::Property(i.to_string())),
        PathSegment::Property(name) => match PathSegment::parse_key(name) {
            index @ PathSegment::Index(_) => Some(index),
            _ => None,
        },
        PathSegment::Slot(_) => None,
    }
}
