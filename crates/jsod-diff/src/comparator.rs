//! The comparator chain.
//!
//! When both sides of a comparison are present and share a coarse type, the
//! comparators of the active [`DiffConfig`] are tried in order. The first
//! one that accepts the pair handles it; later comparators are not
//! consulted. A chain that accepts nothing records nothing.

use std::fmt;
use std::sync::Arc;

use jsod_types::{DeltaTree, PathDisplay, PropertyPath, Value, ValueShape};
use tracing::trace;

use crate::config::DiffConfig;
use crate::list_diff::{diff_as_ordered_list, diff_as_unordered_valuelist};
use crate::tree_diff::diff_as_tree;

/// A user-supplied comparator, pluggable into a [`DiffConfig`] chain.
pub trait CustomComparator: Send + Sync {
    /// Name shown in debug output.
    fn name(&self) -> &str;

    /// Whether this comparator handles the pair.
    fn accepts(&self, origin: &Value, changed: &Value) -> bool;

    /// Diff the pair, recording into `delta` at `path`.
    fn compare(
        &self,
        path: &mut PropertyPath,
        origin: &Value,
        changed: &Value,
        config: &DiffConfig,
        delta: &mut DeltaTree,
    );
}

/// One entry in a comparator chain.
#[derive(Clone)]
pub enum Comparator {
    /// Plain arrays as bags of values: additions and removals by deep
    /// equality, positions ignored.
    UnorderedValueList,
    /// Arrays, buffers and typed arrays element by element.
    OrderedList,
    /// Functions by identity.
    Function,
    /// Objects key by key.
    Tree,
    /// Any pair by deep equality.
    Value,
    Custom(Arc<dyn CustomComparator>),
}

impl Comparator {
    /// Wrap a custom comparator.
    pub fn custom(comparator: impl CustomComparator + 'static) -> Self {
        Comparator::Custom(Arc::new(comparator))
    }

    pub fn name(&self) -> &str {
        match self {
            Comparator::UnorderedValueList => "unordered-valuelist",
            Comparator::OrderedList => "ordered-list",
            Comparator::Function => "function",
            Comparator::Tree => "tree",
            Comparator::Value => "value",
            Comparator::Custom(custom) => custom.name(),
        }
    }

    /// Whether this comparator handles the pair.
    ///
    /// Built-in comparators require both sides to have the shape they
    /// handle. Ordered lists additionally require the same representation:
    /// an array never compares positionally against a buffer, nor a typed
    /// array against one of a different element kind.
    pub fn accepts(&self, origin: &Value, changed: &Value) -> bool {
        let shapes = (origin.shape(), changed.shape());
        match self {
            Comparator::UnorderedValueList => shapes == (ValueShape::List, ValueShape::List),
            Comparator::OrderedList => same_list_representation(origin, changed),
            Comparator::Function => shapes == (ValueShape::Callable, ValueShape::Callable),
            Comparator::Tree => shapes == (ValueShape::Tree, ValueShape::Tree),
            Comparator::Value => true,
            Comparator::Custom(custom) => custom.accepts(origin, changed),
        }
    }

    /// Diff an accepted pair.
    pub fn compare(
        &self,
        path: &mut PropertyPath,
        origin: &Value,
        changed: &Value,
        config: &DiffConfig,
        delta: &mut DeltaTree,
    ) {
        match self {
            Comparator::UnorderedValueList => {
                diff_as_unordered_valuelist(origin, changed, config, delta, path)
            }
            Comparator::OrderedList => diff_as_ordered_list(origin, changed, config, delta, path),
            Comparator::Tree => diff_as_tree(origin, changed, config, delta, path),
            Comparator::Function | Comparator::Value => {
                if origin != changed {
                    config.hooks().on_change(path, origin, changed, config, delta);
                }
            }
            Comparator::Custom(custom) => custom.compare(path, origin, changed, config, delta),
        }
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Custom(custom) => f.debug_tuple("Custom").field(&custom.name()).finish(),
            other => f.write_str(other.name()),
        }
    }
}

fn same_list_representation(origin: &Value, changed: &Value) -> bool {
    match (origin, changed) {
        (Value::Array(_), Value::Array(_)) | (Value::Bytes(_), Value::Bytes(_)) => true,
        (Value::Typed(a), Value::Typed(b)) => a.kind() == b.kind(),
        _ => false,
    }
}

/// Run `comparators` over a pair: the first one that accepts it compares it.
pub fn compare_using(
    comparators: &[Comparator],
    path: &mut PropertyPath,
    origin: &Value,
    changed: &Value,
    config: &DiffConfig,
    delta: &mut DeltaTree,
) {
    match comparators.iter().find(|c| c.accepts(origin, changed)) {
        Some(comparator) => comparator.compare(path, origin, changed, config, delta),
        None => trace!(
            path = %PathDisplay(path.as_slice()),
            origin = origin.kind_name(),
            changed = changed.kind_name(),
            "no comparator accepted pair"
        ),
    }
}
