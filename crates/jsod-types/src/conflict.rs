//! Merge conflicts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::PropertyPath;
use crate::record::DeltaRecord;
use crate::tree::DeltaTree;
use crate::value::Value;

/// Why two deltas could not be reconciled at a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictType {
    /// Both sides perform the same operation at the same target with
    /// different values.
    #[serde(rename = "CONFLICT_RECORD_DIFF_VALUE")]
    RecordDiffValue,
    /// The two sides perform different operations at the same target.
    #[serde(rename = "CONFLICT_RECORD_DIFF_OPERATION")]
    RecordDiffOperation,
    /// One side changes the node itself while the other changes its
    /// children. Both sides of such a conflict are whole subtrees.
    #[serde(rename = "CONFLICT_TREE_DIFF_STRUCTURE")]
    TreeDiffStructure,
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::RecordDiffValue => "CONFLICT_RECORD_DIFF_VALUE",
            ConflictType::RecordDiffOperation => "CONFLICT_RECORD_DIFF_OPERATION",
            ConflictType::TreeDiffStructure => "CONFLICT_TREE_DIFF_STRUCTURE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CONFLICT_RECORD_DIFF_VALUE" => Some(ConflictType::RecordDiffValue),
            "CONFLICT_RECORD_DIFF_OPERATION" => Some(ConflictType::RecordDiffOperation),
            "CONFLICT_TREE_DIFF_STRUCTURE" => Some(ConflictType::TreeDiffStructure),
            _ => None,
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a conflict: a record, or a whole delta subtree.
#[derive(Clone, Debug, PartialEq)]
pub enum ConflictSide {
    Record(DeltaRecord),
    Tree(DeltaTree),
}

impl ConflictSide {
    pub fn as_record(&self) -> Option<&DeltaRecord> {
        match self {
            ConflictSide::Record(r) => Some(r),
            ConflictSide::Tree(_) => None,
        }
    }

    pub fn as_tree(&self) -> Option<&DeltaTree> {
        match self {
            ConflictSide::Tree(t) => Some(t),
            ConflictSide::Record(_) => None,
        }
    }
}

/// A merge-time record of two irreconcilable changes at one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    pub conflict_type: ConflictType,
    pub a: ConflictSide,
    pub b: ConflictSide,
    /// Optional data attached by a merge strategy.
    pub meta: Option<Value>,
}

impl Conflict {
    pub fn new(conflict_type: ConflictType, a: ConflictSide, b: ConflictSide) -> Self {
        Self {
            conflict_type,
            a,
            b,
            meta: None,
        }
    }

    /// A conflict between two records.
    pub fn between_records(conflict_type: ConflictType, a: DeltaRecord, b: DeltaRecord) -> Self {
        Self::new(conflict_type, ConflictSide::Record(a), ConflictSide::Record(b))
    }

    /// A structure conflict between two whole nodes.
    pub fn structure(a: DeltaTree, b: DeltaTree) -> Self {
        Self::new(
            ConflictType::TreeDiffStructure,
            ConflictSide::Tree(a),
            ConflictSide::Tree(b),
        )
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Lookup entry for a node of a merged tree that carries conflicts.
#[derive(Clone, Debug, PartialEq)]
pub struct ConflictNode {
    pub path: PropertyPath,
    pub node: DeltaTree,
}
