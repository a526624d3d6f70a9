//! Delta records: single atomic changes, and their canonical order.

use std::cmp::Ordering;
use std::fmt;

use crate::path::PathSegment;
use crate::value::Value;

/// The kind of change a record performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeltaOperation {
    Add,
    Modify,
    Delete,
}

impl DeltaOperation {
    /// The single-character wire symbol.
    pub const fn symbol(self) -> char {
        match self {
            DeltaOperation::Add => '+',
            DeltaOperation::Modify => '~',
            DeltaOperation::Delete => '-',
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(DeltaOperation::Add),
            "~" => Some(DeltaOperation::Modify),
            "-" => Some(DeltaOperation::Delete),
            _ => None,
        }
    }
}

/// Operations order by their symbol: `+` < `-` < `~`, which puts ADD first,
/// then DELETE, then MODIFY.
impl Ord for DeltaOperation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.symbol().cmp(&other.symbol())
    }
}

impl PartialOrd for DeltaOperation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DeltaOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// What a record does at its key.
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    /// The key was absent and now holds the value.
    Add(Value),
    /// The key held something else and now holds the value.
    Modify(Value),
    /// Positional removal: the key no longer exists.
    Delete,
    /// Removal of one entry equal to the value from an unordered value list.
    DeleteByValue(Value),
}

impl Change {
    pub fn operation(&self) -> DeltaOperation {
        match self {
            Change::Add(_) => DeltaOperation::Add,
            Change::Modify(_) => DeltaOperation::Modify,
            Change::Delete | Change::DeleteByValue(_) => DeltaOperation::Delete,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Change::Add(v) | Change::Modify(v) | Change::DeleteByValue(v) => Some(v),
            Change::Delete => None,
        }
    }
}

/// A single atomic change: `[key, operation, value?]`.
///
/// `key` is `None` for a root-level replacement. A [`PathSegment::Slot`] key
/// addresses an entry of an unordered value list living at the record's node;
/// every other key addresses the node's own position in its parent.
#[derive(Clone, Debug, PartialEq)]
pub struct DeltaRecord {
    pub key: Option<PathSegment>,
    pub change: Change,
}

impl DeltaRecord {
    pub fn new(key: Option<PathSegment>, change: Change) -> Self {
        Self { key, change }
    }

    pub fn add(key: Option<PathSegment>, value: Value) -> Self {
        Self::new(key, Change::Add(value))
    }

    pub fn modify(key: Option<PathSegment>, value: Value) -> Self {
        Self::new(key, Change::Modify(value))
    }

    pub fn delete(key: Option<PathSegment>) -> Self {
        Self::new(key, Change::Delete)
    }

    pub fn delete_by_value(key: Option<PathSegment>, value: Value) -> Self {
        Self::new(key, Change::DeleteByValue(value))
    }

    pub fn operation(&self) -> DeltaOperation {
        self.change.operation()
    }

    pub fn value(&self) -> Option<&Value> {
        self.change.value()
    }

    pub fn key(&self) -> Option<&PathSegment> {
        self.key.as_ref()
    }

    /// Returns `true` if the key is a list position.
    pub fn has_numeric_key(&self) -> bool {
        self.key.as_ref().is_some_and(PathSegment::is_numeric)
    }

    /// Returns `true` if this record addresses an unordered value-list entry.
    pub fn targets_value_list(&self) -> bool {
        self.key.as_ref().is_some_and(PathSegment::is_slot)
    }

    /// The canonical application order of records at one node.
    ///
    /// Numeric keys order by operation first; ADD records then go from the
    /// largest index to the smallest, every other operation from the smallest
    /// to the largest. Non-numeric keys order by key, then by operation.
    pub fn canonical_cmp(&self, other: &DeltaRecord) -> Ordering {
        let key_order = compare_keys(self.key(), other.key());
        let op_a = self.operation();
        let op_order = op_a.cmp(&other.operation());

        if self.has_numeric_key() && other.has_numeric_key() {
            if op_order != Ordering::Equal {
                op_order
            } else if op_a == DeltaOperation::Add {
                key_order.reverse()
            } else {
                key_order
            }
        } else {
            key_order.then(op_order)
        }
    }
}

/// Orders record keys: the root key first, then list positions numerically,
/// then property names lexicographically.
pub fn compare_keys(a: Option<&PathSegment>, b: Option<&PathSegment>) -> Ordering {
    fn rank(key: Option<&PathSegment>) -> u8 {
        match key {
            None => 0,
            Some(k) if k.is_numeric() => 1,
            Some(_) => 2,
        }
    }

    match (a, b) {
        (Some(PathSegment::Property(x)), Some(PathSegment::Property(y))) => x.cmp(y),
        (Some(x), Some(y)) if x.is_numeric() && y.is_numeric() => x.position().cmp(&y.position()),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Sort records into canonical order (stable).
pub fn sort_records(records: &mut [DeltaRecord]) {
    records.sort_by(DeltaRecord::canonical_cmp);
}

impl fmt::Display for DeltaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "[{key} {}]", self.operation()),
            None => write!(f, "[. {}]", self.operation()),
        }
    }
}
