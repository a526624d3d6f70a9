//! Diff engine for jsod.
//!
//! Compares two nested values and records the differences as a
//! [`DeltaTree`]. Comparison is pluggable: a [`DiffConfig`] carries an
//! ordered chain of [`Comparator`]s and a set of [`DiffHooks`] that decide
//! what gets recorded.
//!
//! # Key Types
//!
//! - [`DiffConfig`] -- Comparator chain plus hooks, with presets for each diffing mode
//! - [`Comparator`] / [`CustomComparator`] -- Strategies tried in order on each pair
//! - [`DiffHooks`] / [`RecordingHooks`] -- Add/delete/change/type-change/compare events
//!
//! # Example
//!
//! ```
//! use jsod_diff::diff;
//! use jsod_types::{PathSegment, Value};
//!
//! let origin = Value::object([("x", Value::from(1))]);
//! let changed = Value::object([("x", Value::from(2))]);
//! let delta = diff(Some(&origin), Some(&changed));
//! assert!(delta.subtree(&PathSegment::property("x")).is_some());
//! ```

pub mod comparator;
pub mod config;
pub mod list_diff;
pub mod structure_diff;
pub mod tree_diff;

pub use comparator::{compare_using, Comparator, CustomComparator};
pub use config::{DiffConfig, DiffHooks, RecordingHooks};
pub use list_diff::{diff_as_ordered_list, diff_as_unordered_valuelist};
pub use structure_diff::{diff_as_structure, type_changed};
pub use tree_diff::diff_as_tree;

use jsod_types::{DeltaTree, Value};
use tracing::debug;

/// Diff two values with the default configuration.
///
/// Either side may be absent: an absent origin records the whole changed
/// value as an add at the root, an absent changed side records a root delete.
pub fn diff(origin: Option<&Value>, changed: Option<&Value>) -> DeltaTree {
    diff_with_config(origin, changed, &DiffConfig::default())
}

/// Diff two values with an explicit configuration.
///
/// The records of every node come back in canonical order, the order patch
/// and merge process them in.
pub fn diff_with_config(
    origin: Option<&Value>,
    changed: Option<&Value>,
    config: &DiffConfig,
) -> DeltaTree {
    let mut delta = DeltaTree::new();
    let mut path = Vec::new();
    diff_as_structure(origin, changed, config, &mut delta, &mut path);
    delta.sort_all_records();

    debug!(records = delta.record_count(), "diff complete");
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsod_types::{Change, DeltaRecord, PathSegment};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn diff_against_nothing_adds_root() {
        let changed = v(json!({"x": 1}));
        let delta = diff(None, Some(&changed));
        assert_eq!(delta.to_json(), json!({".": [[null, "+", {"x": 1}]]}));
    }

    #[test]
    fn diff_to_nothing_deletes_root() {
        let origin = v(json!({"x": 1}));
        let delta = diff(Some(&origin), None);
        assert_eq!(delta.records, vec![DeltaRecord::delete(None)]);
    }

    #[test]
    fn diff_nested_modify() {
        let delta = diff(Some(&v(json!({"x": 1}))), Some(&v(json!({"x": 2}))));
        assert_eq!(delta.to_json(), json!({"/": {"x": {".": [["x", "~", 2]]}}}));
    }

    #[test]
    fn diff_nested_delete() {
        let delta = diff(Some(&v(json!({"x": 1}))), Some(&v(json!({}))));
        assert_eq!(delta.to_json(), json!({"/": {"x": {".": [["x", "-"]]}}}));
    }

    #[test]
    fn diff_with_self_is_empty() {
        let value = v(json!({"a": [1, 2, {"b": null}], "c": "text", "d": {"e": [true]}}));
        assert!(diff(Some(&value), Some(&value)).is_empty());
        assert!(diff_with_config(Some(&value), Some(&value), &DiffConfig::no_unordered()).is_empty());
        assert!(diff(None, None).is_empty());
    }

    #[test]
    fn array_swap_depends_on_config() {
        let origin = v(json!(["a", "b"]));
        let changed = v(json!(["b", "a"]));

        assert!(diff(Some(&origin), Some(&changed)).is_empty());

        let ordered = diff_with_config(Some(&origin), Some(&changed), &DiffConfig::no_unordered());
        assert_eq!(ordered.record_count(), 2);
        assert_eq!(
            ordered.to_json(),
            json!({"/": {
                "0": {".": [[0, "~", "b"]]},
                "1": {".": [[1, "~", "a"]]}
            }})
        );
    }

    #[test]
    fn value_pure_replaces_whole_object() {
        let origin = v(json!({"a": {"b": 1}}));
        let changed = v(json!({"a": {"b": 2}}));
        let delta = diff_with_config(Some(&origin), Some(&changed), &DiffConfig::value_pure());
        assert_eq!(delta.records, vec![DeltaRecord::modify(None, changed)]);
    }

    #[test]
    fn unordered_inside_object() {
        let origin = v(json!({"tags": ["a", "b"]}));
        let changed = v(json!({"tags": ["b", "c"]}));
        let delta = diff(Some(&origin), Some(&changed));
        let tags = delta.subtree(&PathSegment::property("tags")).unwrap();
        assert_eq!(
            tags.records,
            vec![
                DeltaRecord::add(Some(PathSegment::Slot(1)), Value::from("c")),
                DeltaRecord::delete_by_value(Some(PathSegment::Slot(0)), Value::from("a")),
            ]
        );
    }

    #[test]
    fn records_come_back_in_canonical_order() {
        let delta = diff(Some(&v(json!(["a"]))), Some(&v(json!(["b"]))));
        assert_eq!(delta.to_json(), json!({".": [[0, "+", "b"], [0, "-", "a"]]}));

        let mut sorted = delta.clone();
        sorted.sort_all_records();
        assert_eq!(sorted, delta);
    }

    #[derive(Default)]
    struct Spy {
        adds: Mutex<Vec<String>>,
    }

    struct SpyHooks(Arc<Spy>);

    impl DiffHooks for SpyHooks {
        fn on_add(&self, path: &[PathSegment], changed: &Value, _config: &DiffConfig, delta: &mut DeltaTree) {
            self.0
                .adds
                .lock()
                .unwrap()
                .push(jsod_types::PathDisplay(path).to_string());
            delta.record(path, Change::Add(changed.clone()));
        }

        fn on_delete(&self, _path: &[PathSegment], _origin: &Value, _config: &DiffConfig, _delta: &mut DeltaTree) {}
    }

    #[test]
    fn hooks_observe_and_filter_events() {
        let spy = Arc::new(Spy::default());
        let config = DiffConfig::default().with_hooks(SpyHooks(Arc::clone(&spy)));

        let origin = v(json!({"gone": 1, "stay": {"x": 1}}));
        let changed = v(json!({"stay": {"x": 1, "y": 2}, "new": true}));
        let delta = diff_with_config(Some(&origin), Some(&changed), &config);

        let mut adds = spy.adds.lock().unwrap().clone();
        adds.sort();
        assert_eq!(adds, vec!["new".to_string(), "stay/y".to_string()]);
        assert_eq!(delta.record_count(), 2);
        assert!(delta.subtree(&PathSegment::property("gone")).is_none());
    }
}
