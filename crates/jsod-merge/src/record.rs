//! Record-level merge.

use jsod_types::{Conflict, ConflictType, DeltaRecord, PathSegment};

use crate::strategy::{MergeStrategy, RecordMerge};

/// Merge the records of two nodes.
///
/// Every record of `a` is matched against the first unconsumed record of
/// `b` it corresponds to. A matched pair goes through
/// [`MergeStrategy::merge_records`]; an unmatched record of either side is
/// cloned through. Conflicts are appended to `conflicts`.
pub fn merge_all_node_records<S: MergeStrategy + ?Sized>(
    strategy: &S,
    a: &[DeltaRecord],
    b: &[DeltaRecord],
    path: &[PathSegment],
    conflicts: &mut Vec<Conflict>,
) -> Vec<DeltaRecord> {
    let mut consumed = vec![false; b.len()];
    let mut merged = Vec::with_capacity(a.len().max(b.len()));

    for record_a in a {
        match find_matching_record(record_a, b, &consumed) {
            Some(index) => {
                consumed[index] = true;
                match strategy.merge_records(record_a, &b[index], path) {
                    RecordMerge::Merged(record) => merged.push(record),
                    RecordMerge::Conflicted(conflict) => conflicts.push(conflict),
                }
            }
            None => merged.push(record_a.clone()),
        }
    }

    merged.extend(
        b.iter()
            .zip(&consumed)
            .filter(|(_, used)| !**used)
            .map(|(record, _)| record.clone()),
    );
    merged
}

/// Index of the first unconsumed record in `candidates` that corresponds
/// to `record`.
///
/// Unordered value-list entries have no stable position across two diffs,
/// so they correspond by value; every other record corresponds by key.
pub fn find_matching_record(
    record: &DeltaRecord,
    candidates: &[DeltaRecord],
    consumed: &[bool],
) -> Option<usize> {
    let matches = |candidate: &DeltaRecord| {
        if record.targets_value_list() {
            candidate.targets_value_list() && candidate.value() == record.value()
        } else {
            !candidate.targets_value_list() && same_key(record.key(), candidate.key())
        }
    };

    candidates
        .iter()
        .enumerate()
        .find(|(i, candidate)| !consumed.get(*i).copied().unwrap_or(false) && matches(*candidate))
        .map(|(i, _)| i)
}

fn same_key(a: Option<&PathSegment>, b: Option<&PathSegment>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.addresses_same(b),
        (None, None) => true,
        _ => false,
    }
}

/// Merge one matched pair of records.
///
/// Different operations conflict, then different values conflict. An
/// agreeing pair contributes a single record; it carries `b`'s key, which
/// only differs from `a`'s for value-list entries.
pub fn merge_record_pair(a: &DeltaRecord, b: &DeltaRecord) -> RecordMerge {
    if a.operation() != b.operation() {
        return RecordMerge::Conflicted(Conflict::between_records(
            ConflictType::RecordDiffOperation,
            a.clone(),
            b.clone(),
        ));
    }
    if a.value() != b.value() {
        return RecordMerge::Conflicted(Conflict::between_records(
            ConflictType::RecordDiffValue,
            a.clone(),
            b.clone(),
        ));
    }
    RecordMerge::Merged(b.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StandardMerge;
    use jsod_types::{sort_records, Value};

    fn key(name: &str) -> Option<PathSegment> {
        Some(PathSegment::property(name))
    }

    fn slot(i: usize) -> Option<PathSegment> {
        Some(PathSegment::Slot(i))
    }

    fn merge(a: &[DeltaRecord], b: &[DeltaRecord]) -> (Vec<DeltaRecord>, Vec<Conflict>) {
        let mut conflicts = Vec::new();
        let merged = merge_all_node_records(&StandardMerge, a, b, &[], &mut conflicts);
        (merged, conflicts)
    }

    #[test]
    fn identical_records_merge_to_one() {
        let record = DeltaRecord::modify(key("x"), Value::from(2));
        let (merged, conflicts) = merge(&[record.clone()], &[record.clone()]);
        assert_eq!(merged, vec![record]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn different_values_conflict() {
        let a = DeltaRecord::modify(key("x"), Value::from(1));
        let b = DeltaRecord::modify(key("x"), Value::from(2));
        let (merged, conflicts) = merge(&[a.clone()], &[b.clone()]);
        assert!(merged.is_empty());
        assert_eq!(
            conflicts,
            vec![Conflict::between_records(ConflictType::RecordDiffValue, a, b)]
        );
    }

    #[test]
    fn different_operations_conflict() {
        let a = DeltaRecord::modify(key("x"), Value::from(1));
        let b = DeltaRecord::delete(key("x"));
        let (merged, conflicts) = merge(&[a], &[b]);
        assert!(merged.is_empty());
        assert_eq!(conflicts[0].conflict_type, ConflictType::RecordDiffOperation);
    }

    #[test]
    fn unmatched_records_pass_through() {
        let a = DeltaRecord::modify(key("x"), Value::from(1));
        let b = DeltaRecord::modify(key("y"), Value::from(2));
        let (merged, conflicts) = merge(&[a.clone()], &[b.clone()]);
        assert_eq!(merged, vec![a, b]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn value_list_entries_match_by_value() {
        let mut a = vec![
            DeltaRecord::add(slot(3), Value::from("x")),
            DeltaRecord::delete_by_value(slot(0), Value::from("old")),
        ];
        let mut b = vec![
            DeltaRecord::delete_by_value(slot(1), Value::from("old")),
            DeltaRecord::add(slot(0), Value::from("y")),
            DeltaRecord::add(slot(2), Value::from("x")),
        ];
        sort_records(&mut a);
        sort_records(&mut b);

        let (mut merged, conflicts) = merge(&a, &b);
        sort_records(&mut merged);
        assert!(conflicts.is_empty());
        assert_eq!(
            merged,
            vec![
                DeltaRecord::add(slot(2), Value::from("x")),
                DeltaRecord::add(slot(0), Value::from("y")),
                DeltaRecord::delete_by_value(slot(1), Value::from("old")),
            ]
        );
    }

    #[test]
    fn matching_consumes_candidates() {
        let x = DeltaRecord::add(slot(0), Value::from("x"));
        let (merged, conflicts) = merge(&[x.clone(), x.clone()], &[x.clone()]);
        assert_eq!(merged.len(), 2);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn value_list_entries_never_match_keyed_records() {
        let keyed = DeltaRecord::modify(Some(PathSegment::Index(0)), Value::from("x"));
        let entry = DeltaRecord::add(slot(0), Value::from("x"));
        assert_eq!(find_matching_record(&entry, &[keyed.clone()], &[false]), None);
        assert_eq!(find_matching_record(&keyed, &[entry], &[false]), None);
    }

    #[test]
    fn index_and_numeric_property_keys_match() {
        let a = DeltaRecord::modify(Some(PathSegment::Index(1)), Value::from(1));
        let b = DeltaRecord::modify(key("1"), Value::from(1));
        assert_eq!(find_matching_record(&a, &[b], &[false]), Some(0));
    }
}
