//! Foundation types for jsod.
//!
//! This crate provides the value model and the delta data structures shared
//! by the diff, patch and merge engines. Every other jsod crate depends on
//! `jsod-types`.
//!
//! # Key Types
//!
//! - [`Value`] -- A nested value: primitives, lists, objects, buffers, typed arrays, functions
//! - [`PathSegment`] / [`PropertyPath`] -- Steps from a diff root to a nested position
//! - [`DeltaRecord`] / [`Change`] -- A single atomic add/modify/delete
//! - [`DeltaTree`] -- Recorded changes, structured like the changed paths
//! - [`Conflict`] / [`ConflictType`] -- Irreconcilable changes found by merging

pub mod codec;
pub mod conflict;
pub mod error;
pub mod path;
pub mod record;
pub mod tree;
pub mod value;

pub use conflict::{Conflict, ConflictNode, ConflictSide, ConflictType};
pub use error::{TypeError, TypeResult};
pub use path::{PathDisplay, PathSegment, PropertyPath};
pub use record::{compare_keys, sort_records, Change, DeltaOperation, DeltaRecord};
pub use tree::DeltaTree;
pub use value::{to_byte, TypedArray, TypedKind, Value, ValueShape};
