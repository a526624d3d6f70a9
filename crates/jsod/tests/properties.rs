use jsod::{
    diff, diff_with_config, merge, patch_clone, DeltaTree, DiffConfig, TypedArray, TypedKind, Value,
};
use proptest::prelude::*;

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i32..1000).prop_map(|n| Value::Number(f64::from(n) / 4.0)),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

fn arb_value() -> BoxedStrategy<Value> {
    let leaf = prop_oneof![
        6 => arb_scalar(),
        1 => prop::collection::vec(any::<u8>(), 0..6).prop_map(Value::Bytes),
        1 => prop::collection::vec(-100i32..100, 0..4).prop_map(|items| {
            Value::Typed(TypedArray::from_values(TypedKind::Int16, items.into_iter().map(f64::from)))
        }),
        1 => "[a-z]{1,3}".prop_map(Value::Function),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..5).prop_map(Value::Object),
        ]
    })
    .boxed()
}

/// Objects over a small key set, so two draws share most of their keys.
fn arb_document() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-d]", arb_value(), 0..4).prop_map(Value::Object)
}

/// Documents, plus bare lists so that deltas carry records at the root.
fn arb_root() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => arb_document(),
        1 => prop::collection::vec(arb_value(), 0..4).prop_map(Value::Array),
    ]
}

proptest! {
    #[test]
    fn diff_with_self_is_empty(value in arb_value()) {
        prop_assert!(diff(Some(&value), Some(&value)).is_empty());
        prop_assert!(diff_with_config(Some(&value), Some(&value), &DiffConfig::no_unordered()).is_empty());
    }

    #[test]
    fn ordered_patch_reproduces_changed(origin in arb_document(), changed in arb_document()) {
        let delta = diff_with_config(Some(&origin), Some(&changed), &DiffConfig::no_unordered());
        let patched = patch_clone(Some(&origin), &delta).unwrap();
        prop_assert_eq!(patched, Some(changed));
    }

    #[test]
    fn ordered_patch_reproduces_any_pair(origin in arb_value(), changed in arb_value()) {
        let delta = diff_with_config(Some(&origin), Some(&changed), &DiffConfig::no_unordered());
        let patched = patch_clone(Some(&origin), &delta).unwrap();
        prop_assert_eq!(patched, Some(changed));
    }

    #[test]
    fn unordered_patch_reproduces_changed_as_bags(origin in arb_root(), changed in arb_root()) {
        let delta = diff(Some(&origin), Some(&changed));
        let patched = patch_clone(Some(&origin), &delta).unwrap();
        prop_assert!(diff(patched.as_ref(), Some(&changed)).is_empty());
    }

    #[test]
    fn merge_with_empty_is_identity(origin in arb_root(), changed in arb_root()) {
        let delta = diff(Some(&origin), Some(&changed));
        let against_nothing = merge(Some(&delta), None);
        let against_empty = merge(Some(&delta), Some(&DeltaTree::new()));
        prop_assert_eq!(against_nothing.merged, delta.clone());
        prop_assert_eq!(against_empty.merged, delta);
    }

    #[test]
    fn merge_of_agreeing_deltas_returns_the_delta(origin in arb_root(), changed in arb_root()) {
        let delta = diff(Some(&origin), Some(&changed));
        let outcome = merge(Some(&delta), Some(&delta));
        prop_assert!(!outcome.has_conflicts());
        prop_assert_eq!(outcome.merged, delta);
    }

    #[test]
    fn delta_json_round_trips(origin in arb_root(), changed in arb_root()) {
        let delta = diff(Some(&origin), Some(&changed));
        let decoded = DeltaTree::from_json(&delta.to_json()).unwrap();
        prop_assert_eq!(decoded, delta);
    }
}
