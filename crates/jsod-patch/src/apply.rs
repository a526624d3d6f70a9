//! Record application and list storage.
//!
//! A record always applies to the slot of the node that holds it: the value
//! at that node's path, or `None` when nothing is there. Records keyed by a
//! [`PathSegment::Slot`], and value-carrying deletes, operate on the list
//! held in that slot instead.
//!
//! The serialized form cannot tell a value-list add from an ordered-list add
//! when the slot number repeats the node's own numeric key, and decodes it as
//! ordered. An ordered add never targets an occupied element, so an
//! index-keyed add that finds a list in its slot is applied as a value-list
//! add.

use jsod_types::{to_byte, Change, DeltaRecord, PathDisplay, PathSegment, Value};

use crate::error::{PatchError, PatchResult};

/// Apply one record to `slot`.
pub fn apply_record(
    slot: &mut Option<Value>,
    record: &DeltaRecord,
    path: &[PathSegment],
) -> PatchResult<()> {
    match (&record.key, &record.change) {
        (_, Change::DeleteByValue(value)) => remove_value(slot, value, path),
        (Some(PathSegment::Slot(position)), change) => apply_in_list(slot, *position, change, path),
        (Some(PathSegment::Index(position)), change @ Change::Add(_))
            if slot.as_ref().is_some_and(Value::is_list_like) =>
        {
            apply_in_list(slot, *position, change, path)
        }
        (_, Change::Add(value) | Change::Modify(value)) => {
            *slot = Some(value.clone());
            Ok(())
        }
        (_, Change::Delete) => {
            *slot = None;
            Ok(())
        }
    }
}

/// Apply a slot-keyed record to the list held in `slot`.
///
/// An add appends to a growable array and grows a binary store to cover
/// the slot. Everything else addresses the list by position.
fn apply_in_list(
    slot: &mut Option<Value>,
    position: usize,
    change: &Change,
    path: &[PathSegment],
) -> PatchResult<()> {
    let Some(list) = slot.as_mut() else {
        return Err(incompatible(path, "list", None));
    };
    match change {
        Change::Add(value) => match list {
            Value::Array(items) => {
                items.push(value.clone());
                Ok(())
            }
            Value::Bytes(_) | Value::Typed(_) => store_element(list, position, Some(value.clone()), path),
            other => Err(incompatible(path, "list", Some(&*other))),
        },
        Change::Modify(value) => store_element(list, position, Some(value.clone()), path),
        Change::Delete => store_element(list, position, None, path),
        Change::DeleteByValue(value) => remove_value(slot, value, path),
    }
}

/// Remove the first element of the array in `slot` equal to `value`.
///
/// Binary stores are left untouched. A missing element is not an error.
fn remove_value(slot: &mut Option<Value>, value: &Value, path: &[PathSegment]) -> PatchResult<()> {
    match slot {
        Some(Value::Array(items)) => {
            if let Some(index) = items.iter().position(|item| item == value) {
                items.remove(index);
            }
            Ok(())
        }
        Some(Value::Bytes(_) | Value::Typed(_)) => Ok(()),
        other => Err(incompatible(path, "list", other.as_ref())),
    }
}

/// Write `element` at `index` of a list-like, or truncate it there when
/// `element` is `None`.
///
/// Arrays pad with `Null` when growing. Buffers and typed arrays grow with
/// zeros and the element is coerced to the store's element type. An object
/// accepts the index as a property name. Growth that cannot be allocated is
/// an [`PatchError::IndexTooLarge`] error.
pub fn store_element(
    list: &mut Value,
    index: usize,
    element: Option<Value>,
    path: &[PathSegment],
) -> PatchResult<()> {
    match list {
        Value::Array(items) => match element {
            Some(value) => {
                if index >= items.len() {
                    let len = grown_len(index, path)?;
                    items
                        .try_reserve_exact(len - items.len())
                        .map_err(|_| too_large(path, index))?;
                    items.resize(len, Value::Null);
                }
                items[index] = value;
            }
            None => items.truncate(index),
        },
        Value::Bytes(bytes) => match element {
            Some(value) => {
                if index >= bytes.len() {
                    let len = grown_len(index, path)?;
                    bytes
                        .try_reserve_exact(len - bytes.len())
                        .map_err(|_| too_large(path, index))?;
                    bytes.resize(len, 0);
                }
                bytes[index] = to_byte(&value);
            }
            None => bytes.truncate(index),
        },
        Value::Typed(typed) => match element {
            Some(value) => {
                if index >= typed.len() {
                    let len = grown_len(index, path)?;
                    *typed = typed.try_resized(len).ok_or_else(|| too_large(path, index))?;
                }
                typed.set(index, value.to_number());
            }
            None => {
                if index < typed.len() {
                    *typed = typed.resized(index);
                }
            }
        },
        Value::Object(entries) => match element {
            Some(value) => {
                entries.insert(index.to_string(), value);
            }
            None => {
                entries.remove(&index.to_string());
            }
        },
        other => return Err(incompatible(path, "list", Some(&*other))),
    }
    Ok(())
}

/// Length a list needs to hold `index`.
fn grown_len(index: usize, path: &[PathSegment]) -> PatchResult<usize> {
    index.checked_add(1).ok_or_else(|| too_large(path, index))
}

fn too_large(path: &[PathSegment], index: usize) -> PatchError {
    PatchError::IndexTooLarge {
        path: PathDisplay(path).to_string(),
        index,
    }
}

pub(crate) fn incompatible(
    path: &[PathSegment],
    expected: &'static str,
    found: Option<&Value>,
) -> PatchError {
    PatchError::IncompatibleTarget {
        path: PathDisplay(path).to_string(),
        expected,
        found: found.map_or("nothing", Value::kind_name),
    }
}
