//! Tree-level diff: compare two objects key by key.

use jsod_types::{DeltaTree, PathSegment, PropertyPath, Value};

use crate::config::DiffConfig;
use crate::structure_diff::diff_as_structure;

/// Diff two objects over the union of their keys.
///
/// Each key is visited once and diffed as a structure one level deeper. A
/// side that is not an object contributes no keys.
pub fn diff_as_tree(
    origin: &Value,
    changed: &Value,
    config: &DiffConfig,
    delta: &mut DeltaTree,
    path: &mut PropertyPath,
) {
    let origin_entries = origin.as_object();
    let changed_entries = changed.as_object();

    // Keys present in changed, with or without an origin counterpart.
    for (key, changed_value) in changed_entries.into_iter().flatten() {
        let origin_value = origin_entries.and_then(|entries| entries.get(key));
        path.push(PathSegment::property(key.as_str()));
        diff_as_structure(origin_value, Some(changed_value), config, delta, path);
        path.pop();
    }

    // Keys removed from origin.
    for (key, origin_value) in origin_entries.into_iter().flatten() {
        if changed_entries.is_some_and(|entries| entries.contains_key(key)) {
            continue;
        }
        path.push(PathSegment::property(key.as_str()));
        diff_as_structure(Some(origin_value), None, config, delta, path);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsod_types::{Change, DeltaRecord};

    fn p(name: &str) -> PathSegment {
        PathSegment::property(name)
    }

    fn tree(origin: &Value, changed: &Value) -> DeltaTree {
        let mut delta = DeltaTree::new();
        diff_as_tree(origin, changed, &DiffConfig::default(), &mut delta, &mut Vec::new());
        delta
    }

    #[test]
    fn identical_objects_record_nothing() {
        let value = Value::object([("a", Value::from(1)), ("b", Value::from("x"))]);
        assert!(tree(&value, &value).is_empty());
    }

    #[test]
    fn mixed_key_changes() {
        let origin = Value::object([
            ("keep", Value::from(true)),
            ("modify", Value::from("old")),
            ("remove", Value::from(42)),
        ]);
        let changed = Value::object([
            ("keep", Value::from(true)),
            ("modify", Value::from("new")),
            ("added", Value::from(7)),
        ]);

        let delta = tree(&origin, &changed);
        assert_eq!(delta.record_count(), 3);
        assert!(delta.subtree(&p("keep")).is_none());
        assert_eq!(
            delta.subtree(&p("added")).unwrap().records,
            vec![DeltaRecord::add(Some(p("added")), Value::from(7))]
        );
        assert_eq!(
            delta.subtree(&p("modify")).unwrap().records,
            vec![DeltaRecord::modify(Some(p("modify")), Value::from("new"))]
        );
        assert_eq!(delta.subtree(&p("remove")).unwrap().records[0].change, Change::Delete);
    }

    #[test]
    fn nested_objects_recurse() {
        let origin = Value::object([("config", Value::object([("debug", Value::from(false))]))]);
        let changed = Value::object([("config", Value::object([("debug", Value::from(true))]))]);

        let delta = tree(&origin, &changed);
        let node = delta.node_at(&[p("config"), p("debug")]).unwrap();
        assert_eq!(node.records, vec![DeltaRecord::modify(Some(p("debug")), Value::from(true))]);
        assert!(delta.subtree(&p("config")).unwrap().records.is_empty());
    }
}
