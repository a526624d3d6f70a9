use std::fmt;
use std::sync::Arc;

use jsod_types::{Change, DeltaTree, PathSegment, PropertyPath, Value};

use crate::comparator::{compare_using, Comparator};

// ---------------------------------------------------------------------------
// DiffHooks
// ---------------------------------------------------------------------------

/// Event handlers called while diffing.
///
/// Every method has a default that records the matching change in the delta
/// tree (`on_compare` runs the comparator chain). Implementors override only
/// the events they care about.
///
/// The trait is object-safe and `Send + Sync` so hooks can be shared by a
/// [`DiffConfig`] across threads.
pub trait DiffHooks: Send + Sync {
    /// A value is present in `changed` but not in `origin`.
    fn on_add(&self, path: &[PathSegment], changed: &Value, _config: &DiffConfig, delta: &mut DeltaTree) {
        delta.record(path, Change::Add(changed.clone()));
    }

    /// A value is present in `origin` but not in `changed`.
    fn on_delete(&self, path: &[PathSegment], _origin: &Value, _config: &DiffConfig, delta: &mut DeltaTree) {
        delta.record(path, Change::Delete);
    }

    /// Two values of the same kind differ.
    fn on_change(
        &self,
        path: &[PathSegment],
        _origin: &Value,
        changed: &Value,
        _config: &DiffConfig,
        delta: &mut DeltaTree,
    ) {
        delta.record(path, Change::Modify(changed.clone()));
    }

    /// The value at a path changed its coarse type.
    fn on_type_change(
        &self,
        path: &[PathSegment],
        _origin: &Value,
        changed: &Value,
        _config: &DiffConfig,
        delta: &mut DeltaTree,
    ) {
        delta.record(path, Change::Modify(changed.clone()));
    }

    /// Both values are present and of the same coarse type.
    fn on_compare(
        &self,
        path: &mut PropertyPath,
        origin: &Value,
        changed: &Value,
        config: &DiffConfig,
        delta: &mut DeltaTree,
    ) {
        compare_using(config.comparators(), path, origin, changed, config, delta);
    }
}

/// The default hooks: record every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordingHooks;

impl DiffHooks for RecordingHooks {}

// ---------------------------------------------------------------------------
// DiffConfig
// ---------------------------------------------------------------------------

/// Configuration of a diff: the comparator chain and the event hooks.
///
/// A config is immutable once built. Presets restrict the comparator chain
/// to a single diffing mode; builders replace one part and keep the rest.
#[derive(Clone)]
pub struct DiffConfig {
    comparators: Vec<Comparator>,
    hooks: Arc<dyn DiffHooks>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            comparators: vec![
                Comparator::UnorderedValueList,
                Comparator::OrderedList,
                Comparator::Function,
                Comparator::Tree,
                Comparator::Value,
            ],
            hooks: Arc::new(RecordingHooks),
        }
    }
}

impl DiffConfig {
    /// The default configuration: plain arrays are unordered value lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects recurse, everything else compares by value.
    pub fn tree_pure() -> Self {
        Self::default().with_comparators(vec![Comparator::Tree, Comparator::Value])
    }

    /// Arrays are value bags, everything else compares by value.
    pub fn unordered_valuelist_pure() -> Self {
        Self::default().with_comparators(vec![Comparator::UnorderedValueList, Comparator::Value])
    }

    /// List-likes compare by position, everything else by value.
    pub fn ordered_list_pure() -> Self {
        Self::default().with_comparators(vec![Comparator::OrderedList, Comparator::Value])
    }

    /// Every pair compares by deep equality.
    pub fn value_pure() -> Self {
        Self::default().with_comparators(vec![Comparator::Value])
    }

    /// The default chain without unordered value lists: plain arrays are
    /// diffed by position like buffers.
    pub fn no_unordered() -> Self {
        Self::default().with_comparators(vec![
            Comparator::OrderedList,
            Comparator::Function,
            Comparator::Tree,
            Comparator::Value,
        ])
    }

    /// Replace the comparator chain.
    pub fn with_comparators(mut self, comparators: Vec<Comparator>) -> Self {
        self.comparators = comparators;
        self
    }

    /// Replace the event hooks.
    pub fn with_hooks(mut self, hooks: impl DiffHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Replace the event hooks with an already shared instance.
    pub fn with_shared_hooks(mut self, hooks: Arc<dyn DiffHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// The comparator chain, in priority order.
    pub fn comparators(&self) -> &[Comparator] {
        &self.comparators
    }

    pub fn hooks(&self) -> &dyn DiffHooks {
        self.hooks.as_ref()
    }
}

impl fmt::Debug for DiffConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffConfig")
            .field("comparators", &self.comparators)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_order() {
        let config = DiffConfig::default();
        let names: Vec<_> = config.comparators().iter().map(Comparator::name).collect();
        assert_eq!(names, vec!["unordered-valuelist", "ordered-list", "function", "tree", "value"]);
    }

    #[test]
    fn presets_restrict_the_chain() {
        assert_eq!(DiffConfig::value_pure().comparators().len(), 1);
        assert_eq!(DiffConfig::tree_pure().comparators().len(), 2);
        assert!(!DiffConfig::no_unordered()
            .comparators()
            .iter()
            .any(|c| matches!(c, Comparator::UnorderedValueList)));
    }

    #[test]
    fn builders_do_not_touch_the_default() {
        let custom = DiffConfig::default().with_comparators(vec![Comparator::Value]);
        assert_eq!(custom.comparators().len(), 1);
        assert_eq!(DiffConfig::default().comparators().len(), 5);
    }
}
