//! The recursive delta tree walk.
//!
//! Each node is applied against a slot: the value at the node's path, or
//! `None` when absent. Children are taken out of their container, patched,
//! and written back, so a child that ends up absent is removed from its
//! container. Subtrees go first in ascending key order, then the node's own
//! records in canonical order.

use jsod_types::{sort_records, DeltaTree, PathDisplay, PathSegment, PropertyPath, Value};
use tracing::trace;

use crate::apply::{apply_record, incompatible, store_element};
use crate::error::PatchResult;

pub(crate) fn walk(slot: &mut Option<Value>, node: &DeltaTree, path: &mut PropertyPath) -> PatchResult<()> {
    if node.has_conflicts() {
        trace!(path = %PathDisplay(path.as_slice()), conflicts = node.conflicts.len(), "skipping conflicts");
    }

    for (segment, child_node) in &node.subtrees {
        path.push(segment.clone());
        let result = patch_child(slot, segment, child_node, path);
        path.pop();
        result?;
    }

    if node.has_records() {
        let mut records = node.records.clone();
        sort_records(&mut records);
        for record in &records {
            apply_record(slot, record, path)?;
        }
    }
    Ok(())
}

/// Patch the child at `segment`. The child is written back even when its
/// own walk fails.
fn patch_child(
    slot: &mut Option<Value>,
    segment: &PathSegment,
    node: &DeltaTree,
    path: &mut PropertyPath,
) -> PatchResult<()> {
    let mut child = take_child(slot, segment, path)?;
    let walked = walk(&mut child, node, path);
    put_child(slot, segment, child, path)?;
    walked
}

/// Take the child at `segment` out of the container in `slot`.
fn take_child(slot: &mut Option<Value>, segment: &PathSegment, path: &[PathSegment]) -> PatchResult<Option<Value>> {
    match (slot.as_mut(), segment) {
        (Some(Value::Object(entries)), segment) => Ok(entries.remove(&segment.as_key())),
        (Some(Value::Array(items)), PathSegment::Index(i) | PathSegment::Slot(i)) => {
            Ok(items.get_mut(*i).map(|item| std::mem::replace(item, Value::Null)))
        }
        (Some(list @ (Value::Bytes(_) | Value::Typed(_))), PathSegment::Index(i) | PathSegment::Slot(i)) => {
            Ok(list.element(*i).map(|element| element.into_owned()))
        }
        (Some(list @ (Value::Array(_) | Value::Bytes(_) | Value::Typed(_))), PathSegment::Property(_)) => {
            Err(incompatible(path, "object", Some(&*list)))
        }
        (container, _) => Err(incompatible(path, "container", container.as_deref())),
    }
}

/// Write a patched child back into the container in `slot`.
fn put_child(
    slot: &mut Option<Value>,
    segment: &PathSegment,
    child: Option<Value>,
    path: &[PathSegment],
) -> PatchResult<()> {
    match (slot.as_mut(), segment.position()) {
        (Some(Value::Object(entries)), _) => {
            match child {
                Some(value) => entries.insert(segment.as_key(), value),
                None => entries.remove(&segment.as_key()),
            };
            Ok(())
        }
        (Some(list), Some(index)) => store_element(list, index, child, path),
        (container, _) => Err(incompatible(path, "container", container.as_deref())),
    }
}
