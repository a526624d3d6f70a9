//! List-level diffs: ordered (by position) and unordered (by value).

use std::borrow::Cow;

use jsod_types::{Change, DeltaTree, PathSegment, PropertyPath, Value};

use crate::config::DiffConfig;

/// Diff two list-likes position by position.
///
/// Positions past the end of `changed` are deletes, positions past the end
/// of `origin` are adds, and shared positions go through the comparator
/// chain. Works for arrays, byte buffers and typed arrays; buffer elements
/// compare as numbers.
pub fn diff_as_ordered_list(
    origin: &Value,
    changed: &Value,
    config: &DiffConfig,
    delta: &mut DeltaTree,
    path: &mut PropertyPath,
) {
    let hooks = config.hooks();
    let origin_len = origin.list_len().unwrap_or(0);
    let changed_len = changed.list_len().unwrap_or(0);

    for index in 0..origin_len {
        let Some(origin_item) = origin.element(index) else {
            continue;
        };
        path.push(PathSegment::Index(index));
        match changed.element(index) {
            Some(changed_item) => hooks.on_compare(path, &origin_item, &changed_item, config, delta),
            None => hooks.on_delete(path, &origin_item, config, delta),
        }
        path.pop();
    }

    for index in origin_len..changed_len {
        if let Some(changed_item) = changed.element(index) {
            path.push(PathSegment::Index(index));
            hooks.on_add(path, &changed_item, config, delta);
            path.pop();
        }
    }
}

/// Diff two lists as bags of values.
///
/// Each origin element is matched against the first unmatched deep-equal
/// element of `changed`. Unmatched origin elements are recorded as deletes
/// carrying the removed value, unmatched changed elements as adds. Records
/// land on the list's own node keyed by a [`PathSegment::Slot`] holding the
/// element's position in its list. Hooks are not consulted.
pub fn diff_as_unordered_valuelist(
    origin: &Value,
    changed: &Value,
    _config: &DiffConfig,
    delta: &mut DeltaTree,
    path: &mut PropertyPath,
) {
    let origin_items = items(origin);
    let changed_items = items(changed);
    let mut matched = vec![false; changed_items.len()];

    for (origin_index, origin_item) in origin_items.iter().enumerate() {
        let found = changed_items
            .iter()
            .enumerate()
            .position(|(i, item)| !matched[i] && item == origin_item);
        match found {
            Some(i) => matched[i] = true,
            None => {
                path.push(PathSegment::Slot(origin_index));
                delta.record(path, Change::DeleteByValue(origin_item.clone().into_owned()));
                path.pop();
            }
        }
    }

    for (changed_index, changed_item) in changed_items.iter().enumerate() {
        if matched[changed_index] {
            continue;
        }
        path.push(PathSegment::Slot(changed_index));
        delta.record(path, Change::Add(changed_item.clone().into_owned()));
        path.pop();
    }
}

fn items(list: &Value) -> Vec<Cow<'_, Value>> {
    (0..list.list_len().unwrap_or(0))
        .filter_map(|index| list.element(index))
        .collect()
}
