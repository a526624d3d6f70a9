//! Patch engine for jsod.
//!
//! Applies a [`DeltaTree`] to a target value, producing the changed value
//! the delta was recorded against. Records and subtrees are applied; merge
//! conflicts are rejected up front or skipped, depending on the
//! [`ConflictPolicy`].
//!
//! Targets are `Option<Value>` because a delta may create or delete the
//! root itself.
//!
//! # Key Types
//!
//! - [`PatchConfig`] / [`ConflictPolicy`] -- How conflict-bearing deltas are treated
//! - [`PatchError`] -- Unresolved conflicts or a target of the wrong shape
//!
//! # Example
//!
//! ```
//! use jsod_types::{Change, DeltaTree, PathSegment, Value};
//!
//! let mut delta = DeltaTree::new();
//! delta.record(&[PathSegment::property("x")], Change::Modify(Value::from(2)));
//!
//! let target = Value::object([("x", Value::from(1))]);
//! let patched = jsod_patch::patch(Some(target), &delta).unwrap();
//! assert_eq!(patched, Some(Value::object([("x", Value::from(2))])));
//! ```

pub mod apply;
pub mod config;
pub mod error;
mod walk;

pub use apply::{apply_record, store_element};
pub use config::{ConflictPolicy, PatchConfig};
pub use error::{PatchError, PatchResult};

use jsod_types::{DeltaTree, PathDisplay, Value};
use tracing::debug;

/// Patch `target` with the default configuration and return the result.
///
/// The target is moved in and its storage is mutated; the returned value is
/// the new root, which differs from the input only where the delta replaces
/// or deletes the root.
pub fn patch(target: Option<Value>, delta: &DeltaTree) -> PatchResult<Option<Value>> {
    patch_with_config(target, delta, &PatchConfig::default())
}

pub fn patch_with_config(
    mut target: Option<Value>,
    delta: &DeltaTree,
    config: &PatchConfig,
) -> PatchResult<Option<Value>> {
    patch_in_place_with_config(&mut target, delta, config)?;
    Ok(target)
}

/// Patch `target` in place with the default configuration.
///
/// Conflicts are checked before any mutation. A shape mismatch found during
/// the walk leaves the changes applied so far in place; use
/// [`patch_clone`] when the target must survive a failed patch.
pub fn patch_in_place(target: &mut Option<Value>, delta: &DeltaTree) -> PatchResult<()> {
    patch_in_place_with_config(target, delta, &PatchConfig::default())
}

pub fn patch_in_place_with_config(
    target: &mut Option<Value>,
    delta: &DeltaTree,
    config: &PatchConfig,
) -> PatchResult<()> {
    let conflict_paths = delta.conflict_paths();
    if let Some(first) = conflict_paths.first() {
        match config.conflict_policy {
            ConflictPolicy::Reject => {
                return Err(PatchError::UnresolvedConflicts {
                    path: PathDisplay(first).to_string(),
                    count: conflict_paths.len(),
                });
            }
            ConflictPolicy::Skip => {
                debug!(nodes = conflict_paths.len(), "patching around unresolved conflicts");
            }
        }
    }

    debug!(records = delta.record_count(), "patch start");
    walk::walk(target, delta, &mut Vec::new())?;
    debug!("patch complete");
    Ok(())
}

/// Patch a copy of `target`, leaving the original untouched.
pub fn patch_clone(target: Option<&Value>, delta: &DeltaTree) -> PatchResult<Option<Value>> {
    patch_clone_with_config(target, delta, &PatchConfig::default())
}

pub fn patch_clone_with_config(
    target: Option<&Value>,
    delta: &DeltaTree,
    config: &PatchConfig,
) -> PatchResult<Option<Value>> {
    patch_with_config(target.cloned(), delta, config)
}
