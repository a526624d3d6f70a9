//! Error types for the patch crate.

use thiserror::Error;

/// Errors that can occur while applying a delta tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// The delta carries merge conflicts and the policy rejects them.
    #[error("delta has {count} unresolved conflict node(s), first at {path}")]
    UnresolvedConflicts { path: String, count: usize },

    /// The target does not have the shape the delta expects.
    #[error("incompatible target at {path}: expected {expected}, found {found}")]
    IncompatibleTarget {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A list would have to grow past what can be stored.
    #[error("cannot grow list at {path} to index {index}")]
    IndexTooLarge { path: String, index: usize },
}

/// Convenience alias for patch results.
pub type PatchResult<T> = Result<T, PatchError>;
