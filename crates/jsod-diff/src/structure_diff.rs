//! Structure-level diff: presence and coarse type of a single position.

use jsod_types::{DeltaTree, PropertyPath, Value};

use crate::config::DiffConfig;

/// Diff a single position where either side may be absent.
///
/// Absent on one side becomes an add or a delete, a coarse type change
/// becomes a modify, and two present values of the same coarse type go
/// through the comparator chain. Two absent sides record nothing.
pub fn diff_as_structure(
    origin: Option<&Value>,
    changed: Option<&Value>,
    config: &DiffConfig,
    delta: &mut DeltaTree,
    path: &mut PropertyPath,
) {
    let hooks = config.hooks();
    match (origin, changed) {
        (None, None) => {}
        (None, Some(changed)) => hooks.on_add(path, changed, config, delta),
        (Some(origin), None) => hooks.on_delete(path, origin, config, delta),
        (Some(origin), Some(changed)) => {
            if type_changed(origin, changed) {
                hooks.on_type_change(path, origin, changed, config, delta);
            } else {
                hooks.on_compare(path, origin, changed, config, delta);
            }
        }
    }
}

/// Whether two present values differ in coarse type.
///
/// The categories are checked independently: array, function,
/// object-like, number and string. A mismatch in any one is a type change.
pub fn type_changed(origin: &Value, changed: &Value) -> bool {
    origin.is_array() != changed.is_array()
        || origin.is_function() != changed.is_function()
        || origin.is_object_like() != changed.is_object_like()
        || origin.is_number() != changed.is_number()
        || origin.is_string() != changed.is_string()
}
