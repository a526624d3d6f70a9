//! Structural diff, patch and three-way merge of nested values.
//!
//! This is the main entry point for applications using jsod. It re-exports
//! the public surface of the engine crates:
//!
//! - [`types`] -- Values, paths, records, delta trees, conflicts and their JSON form
//! - [`diff`](mod@diff) -- Comparator chain and diff handlers
//! - [`patch`](mod@patch) -- Delta application with conflict policies
//! - [`merge`](mod@merge) -- Record and node merge, `diff3`
//!
//! # Example
//!
//! ```
//! use jsod::{diff, merge3, patch_clone, Value};
//! use serde_json::json;
//!
//! let origin = Value::from(json!({"title": "draft", "tags": ["a"]}));
//! let ours = Value::from(json!({"title": "final", "tags": ["a"]}));
//! let theirs = Value::from(json!({"title": "draft", "tags": ["a", "b"]}));
//!
//! let outcome = merge3(Some(&ours), Some(&origin), Some(&theirs));
//! assert!(!outcome.has_conflicts());
//!
//! let merged = patch_clone(Some(&origin), &outcome.merged).unwrap();
//! let expected = Value::from(json!({"title": "final", "tags": ["a", "b"]}));
//! assert!(diff(merged.as_ref(), Some(&expected)).is_empty());
//! ```

pub use jsod_diff as diff;
pub use jsod_merge as merge;
pub use jsod_patch as patch;
pub use jsod_types as types;

pub use jsod_types::{
    Change, Conflict, ConflictNode, ConflictSide, ConflictType, DeltaOperation, DeltaRecord, DeltaTree,
    PathSegment, PropertyPath, TypeError, TypeResult, TypedArray, TypedKind, Value,
};

pub use jsod_diff::{diff, diff_with_config, Comparator, CustomComparator, DiffConfig, DiffHooks};

pub use jsod_patch::{
    patch, patch_clone, patch_clone_with_config, patch_in_place, patch_in_place_with_config,
    patch_with_config, ConflictPolicy, PatchConfig, PatchError, PatchResult,
};

pub use jsod_merge::{
    diff3, merge, merge3, merge_deltas, merge_deltas_at, MergeConfig, MergeOutcome, MergeStrategy,
    RecordMerge,
};
