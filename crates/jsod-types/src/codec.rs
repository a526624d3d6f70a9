//! The serialized form of values, records, conflicts and delta trees.
//!
//! Delta trees encode as a JSON object with up to three entries, each
//! omitted when empty:
//!
//! - `"."`: the records, each `[key, op, value?]` with `op` one of `+ ~ -`
//!   and a `null` key for root-level records
//! - `"/"`: child trees keyed by property name or list index
//! - `"!"`: conflicts, each `{conflictType, A, B, meta?}`
//!
//! Values that JSON cannot express natively use single-entry tagged objects:
//! `{"$bytes": "<hex>"}`, `{"$typed": {"kind", "elements"}}`,
//! `{"$function": "<name>"}` and `{"$number": "NaN" | "Infinity" | "-Infinity"}`.
//!
//! Numeric record keys carry no marker telling an ordered list index from
//! an unordered value-list slot. Decoding treats a numeric key as an ordered
//! index when it equals the index of the node it sits on (and the record is
//! not a value-carrying DELETE), and as a slot otherwise. A value-list add
//! on a property named like a number can therefore decode as an ordered
//! add; patch applies such an add to the list it finds there.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value as Json};

use crate::conflict::{Conflict, ConflictSide, ConflictType};
use crate::error::{TypeError, TypeResult};
use crate::path::PathSegment;
use crate::record::{Change, DeltaOperation, DeltaRecord};
use crate::tree::DeltaTree;
use crate::value::{TypedArray, TypedKind, Value};

const RECORDS: &str = ".";
const SUBTREES: &str = "/";
const CONFLICTS: &str = "!";

const TAG_BYTES: &str = "$bytes";
const TAG_TYPED: &str = "$typed";
const TAG_FUNCTION: &str = "$function";
const TAG_NUMBER: &str = "$number";

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

impl Value {
    /// Encode as JSON, tagging non-JSON shapes.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Bytes(bytes) => tagged(TAG_BYTES, Json::String(hex::encode(bytes))),
            Value::Typed(typed) => tagged(
                TAG_TYPED,
                json!({
                    "kind": typed.kind(),
                    "elements": typed.as_slice().iter().map(|n| number_to_json(*n)).collect::<Vec<_>>(),
                }),
            ),
            Value::Function(name) => tagged(TAG_FUNCTION, Json::String(name.clone())),
        }
    }

    /// Decode from JSON, resolving tagged encodings.
    pub fn from_json(json: &Json) -> TypeResult<Value> {
        Ok(match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(_) => Value::Number(json_number(json)?),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Array(
                items
                    .iter()
                    .map(Value::from_json)
                    .collect::<TypeResult<_>>()?,
            ),
            Json::Object(map) => match decode_tagged(map)? {
                Some(value) => value,
                None => Value::Object(
                    map.iter()
                        .map(|(k, v)| Ok((k.clone(), Value::from_json(v)?)))
                        .collect::<TypeResult<_>>()?,
                ),
            },
        })
    }
}

fn tagged(tag: &str, payload: Json) -> Json {
    let mut map = Map::new();
    map.insert(tag.to_string(), payload);
    Json::Object(map)
}

fn number_to_json(n: f64) -> Json {
    if n.is_nan() {
        tagged(TAG_NUMBER, Json::String("NaN".into()))
    } else if n.is_infinite() {
        let name = if n > 0.0 { "Infinity" } else { "-Infinity" };
        tagged(TAG_NUMBER, Json::String(name.into()))
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Json::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number)
    }
}

fn special_number(name: &str) -> TypeResult<f64> {
    match name {
        "NaN" => Ok(f64::NAN),
        "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        other => Err(TypeError::malformed("number", format!("unknown special number {other:?}"))),
    }
}

fn json_number(json: &Json) -> TypeResult<f64> {
    match json {
        Json::Number(n) => n
            .as_f64()
            .ok_or_else(|| TypeError::malformed("number", n.to_string())),
        Json::Object(map) => match map.get(TAG_NUMBER).and_then(Json::as_str) {
            Some(name) if map.len() == 1 => special_number(name),
            _ => Err(TypeError::malformed("number", json.to_string())),
        },
        other => Err(TypeError::malformed("number", other.to_string())),
    }
}

fn decode_tagged(map: &Map<String, Json>) -> TypeResult<Option<Value>> {
    if map.len() != 1 {
        return Ok(None);
    }
    let Some((tag, payload)) = map.iter().next() else {
        return Ok(None);
    };

    match tag.as_str() {
        TAG_BYTES => {
            let encoded = payload
                .as_str()
                .ok_or_else(|| TypeError::malformed("bytes", "expected a hex string"))?;
            let bytes = hex::decode(encoded).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
            Ok(Some(Value::Bytes(bytes)))
        }
        TAG_TYPED => {
            let kind: TypedKind = payload
                .get("kind")
                .cloned()
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| TypeError::Serialization(e.to_string()))?
                .ok_or_else(|| TypeError::malformed("typed array", "missing kind"))?;
            let elements = payload
                .get("elements")
                .and_then(Json::as_array)
                .ok_or_else(|| TypeError::malformed("typed array", "missing elements"))?
                .iter()
                .map(json_number)
                .collect::<TypeResult<Vec<f64>>>()?;
            Ok(Some(Value::Typed(TypedArray::from_values(kind, elements))))
        }
        TAG_FUNCTION => {
            let name = payload
                .as_str()
                .ok_or_else(|| TypeError::malformed("function", "expected a name"))?;
            Ok(Some(Value::Function(name.to_string())))
        }
        TAG_NUMBER => {
            let name = payload
                .as_str()
                .ok_or_else(|| TypeError::malformed("number", "expected a name"))?;
            Ok(Some(Value::Number(special_number(name)?)))
        }
        _ => Ok(None),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Value::from_json(&json).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

fn key_to_json(key: Option<&PathSegment>) -> Json {
    match key {
        None => Json::Null,
        Some(PathSegment::Property(name)) => Json::String(name.clone()),
        Some(PathSegment::Index(i)) | Some(PathSegment::Slot(i)) => Json::from(*i),
    }
}

impl DeltaRecord {
    /// Encode as `[key, op, value?]`.
    pub fn to_json(&self) -> Json {
        let mut out = vec![
            key_to_json(self.key()),
            Json::String(self.operation().symbol().to_string()),
        ];
        if let Some(value) = self.value() {
            out.push(value.to_json());
        }
        Json::Array(out)
    }

    /// Decode `[key, op, value?]` found on the node reached through
    /// `node_segment` (`None` at the root).
    pub fn from_json(json: &Json, node_segment: Option<&PathSegment>) -> TypeResult<Self> {
        let items = json
            .as_array()
            .ok_or_else(|| TypeError::malformed("record", "expected an array"))?;
        if !(2..=3).contains(&items.len()) {
            return Err(TypeError::malformed(
                "record",
                format!("expected 2 or 3 elements, got {}", items.len()),
            ));
        }

        let symbol = items[1]
            .as_str()
            .ok_or_else(|| TypeError::malformed("record", "operation must be a string"))?;
        let op = DeltaOperation::from_symbol(symbol)
            .ok_or_else(|| TypeError::UnknownOperation(symbol.to_string()))?;
        let value = items.get(2).map(Value::from_json).transpose()?;

        let key = match &items[0] {
            Json::Null => None,
            Json::String(name) => Some(PathSegment::Property(name.clone())),
            Json::Number(n) => {
                let position = n
                    .as_u64()
                    .and_then(|i| usize::try_from(i).ok())
                    .ok_or_else(|| TypeError::malformed("record", format!("invalid index {n}")))?;
                let ordered = node_segment == Some(&PathSegment::Index(position))
                    && !(op == DeltaOperation::Delete && value.is_some());
                Some(if ordered {
                    PathSegment::Index(position)
                } else {
                    PathSegment::Slot(position)
                })
            }
            other => {
                return Err(TypeError::malformed("record", format!("invalid key {other}")));
            }
        };

        let numeric = key.as_ref().is_some_and(PathSegment::is_numeric);
        let change = match (op, value) {
            (DeltaOperation::Add, Some(v)) => Change::Add(v),
            (DeltaOperation::Modify, Some(v)) => Change::Modify(v),
            (DeltaOperation::Add | DeltaOperation::Modify, None) => {
                return Err(TypeError::malformed("record", format!("`{op}` requires a value")));
            }
            (DeltaOperation::Delete, Some(v)) if numeric => Change::DeleteByValue(v),
            (DeltaOperation::Delete, _) => Change::Delete,
        };

        Ok(DeltaRecord::new(key, change))
    }
}

// ---------------------------------------------------------------------------
// Conflicts
// ---------------------------------------------------------------------------

fn side_to_json(side: &ConflictSide) -> Json {
    match side {
        ConflictSide::Record(record) => record.to_json(),
        ConflictSide::Tree(tree) => tree.to_json(),
    }
}

fn side_from_json(json: &Json, node_segment: Option<&PathSegment>) -> TypeResult<ConflictSide> {
    match json {
        Json::Array(_) => Ok(ConflictSide::Record(DeltaRecord::from_json(json, node_segment)?)),
        Json::Object(_) => Ok(ConflictSide::Tree(decode_tree(json, node_segment)?)),
        other => Err(TypeError::malformed("conflict", format!("invalid side {other}"))),
    }
}

impl Conflict {
    /// Encode as `{conflictType, A, B, meta?}`.
    pub fn to_json(&self) -> Json {
        let mut map = Map::new();
        map.insert(
            "conflictType".into(),
            Json::String(self.conflict_type.as_str().into()),
        );
        map.insert("A".into(), side_to_json(&self.a));
        map.insert("B".into(), side_to_json(&self.b));
        if let Some(meta) = &self.meta {
            map.insert("meta".into(), meta.to_json());
        }
        Json::Object(map)
    }

    /// Decode a conflict found on the node reached through `node_segment`.
    pub fn from_json(json: &Json, node_segment: Option<&PathSegment>) -> TypeResult<Self> {
        let map = json
            .as_object()
            .ok_or_else(|| TypeError::malformed("conflict", "expected an object"))?;

        let type_name = map
            .get("conflictType")
            .and_then(Json::as_str)
            .ok_or_else(|| TypeError::malformed("conflict", "missing conflictType"))?;
        let conflict_type = ConflictType::parse(type_name)
            .ok_or_else(|| TypeError::UnknownConflictType(type_name.to_string()))?;

        let side = |name: &str| {
            map.get(name)
                .ok_or_else(|| TypeError::malformed("conflict", format!("missing side {name}")))
                .and_then(|json| side_from_json(json, node_segment))
        };
        let a = side("A")?;
        let b = side("B")?;
        let meta = map.get("meta").map(Value::from_json).transpose()?;

        Ok(Conflict {
            conflict_type,
            a,
            b,
            meta,
        })
    }
}

// ---------------------------------------------------------------------------
// Trees
// ---------------------------------------------------------------------------

impl DeltaTree {
    /// Encode as `{".": [..], "/": {..}, "!": [..]}`, omitting empty entries.
    pub fn to_json(&self) -> Json {
        let mut map = Map::new();
        if self.has_records() {
            map.insert(
                RECORDS.into(),
                Json::Array(self.records.iter().map(DeltaRecord::to_json).collect()),
            );
        }
        if self.has_subtrees() {
            map.insert(
                SUBTREES.into(),
                Json::Object(
                    self.subtrees
                        .iter()
                        .map(|(segment, child)| (segment.as_key(), child.to_json()))
                        .collect(),
                ),
            );
        }
        if self.has_conflicts() {
            map.insert(
                CONFLICTS.into(),
                Json::Array(self.conflicts.iter().map(Conflict::to_json).collect()),
            );
        }
        Json::Object(map)
    }

    /// Decode a root tree.
    pub fn from_json(json: &Json) -> TypeResult<Self> {
        decode_tree(json, None)
    }
}

fn decode_tree(json: &Json, segment: Option<&PathSegment>) -> TypeResult<DeltaTree> {
    let map = json
        .as_object()
        .ok_or_else(|| TypeError::malformed("delta tree", "expected an object"))?;

    let mut tree = DeltaTree::new();
    for (entry, payload) in map {
        match entry.as_str() {
            RECORDS => {
                let records = payload
                    .as_array()
                    .ok_or_else(|| TypeError::malformed("delta tree", "records must be an array"))?;
                tree.records = records
                    .iter()
                    .map(|record| DeltaRecord::from_json(record, segment))
                    .collect::<TypeResult<_>>()?;
            }
            SUBTREES => {
                let children = payload
                    .as_object()
                    .ok_or_else(|| TypeError::malformed("delta tree", "subtrees must be an object"))?;
                for (key, child) in children {
                    let child_segment = PathSegment::parse_key(key);
                    let node = decode_tree(child, Some(&child_segment))?;
                    tree.subtrees.insert(child_segment, node);
                }
            }
            CONFLICTS => {
                let conflicts = payload
                    .as_array()
                    .ok_or_else(|| TypeError::malformed("delta tree", "conflicts must be an array"))?;
                tree.conflicts = conflicts
                    .iter()
                    .map(|conflict| Conflict::from_json(conflict, segment))
                    .collect::<TypeResult<_>>()?;
            }
            other => {
                return Err(TypeError::malformed(
                    "delta tree",
                    format!("unexpected entry {other:?}"),
                ));
            }
        }
    }
    Ok(tree)
}

impl Serialize for DeltaTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DeltaTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        DeltaTree::from_json(&json).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment as Seg;

    #[test]
    fn empty_tree_encodes_as_empty_object() {
        assert_eq!(DeltaTree::new().to_json(), json!({}));
    }

    #[test]
    fn root_record_uses_null_key() {
        let mut tree = DeltaTree::new();
        tree.record(&[], Change::Add(Value::from(json!({"x": 1}))));
        assert_eq!(tree.to_json(), json!({".": [[null, "+", {"x": 1}]]}));
    }

    #[test]
    fn nested_records_encode_with_subtrees() {
        let mut tree = DeltaTree::new();
        tree.record(&[Seg::property("x")], Change::Modify(Value::from(2)));
        tree.record(&[Seg::property("y")], Change::Delete);
        assert_eq!(
            tree.to_json(),
            json!({"/": {"x": {".": [["x", "~", 2]]}, "y": {".": [["y", "-"]]}}})
        );
    }

    #[test]
    fn tree_round_trips_through_json() {
        let mut tree = DeltaTree::new();
        tree.record(&[Seg::property("a"), Seg::Index(1)], Change::Modify(Value::from("b")));
        tree.record(&[Seg::property("a"), Seg::Index(2)], Change::Delete);
        tree.record(&[Seg::property("tags"), Seg::Slot(0)], Change::DeleteByValue(Value::from("x")));
        tree.record(&[Seg::property("tags"), Seg::Slot(1)], Change::Add(Value::from("y")));
        tree.record(&[Seg::property("raw")], Change::Add(Value::bytes(*b"a!")));

        let decoded = DeltaTree::from_json(&tree.to_json()).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn numeric_key_off_the_node_index_decodes_as_slot() {
        let json = json!({"/": {"list": {".": [[3, "+", "z"]]}}});
        let tree = DeltaTree::from_json(&json).unwrap();
        let list = tree.node_at(&[Seg::property("list")]).unwrap();
        assert_eq!(list.records[0].key, Some(Seg::Slot(3)));
    }

    #[test]
    fn value_carrying_delete_is_always_by_value() {
        let json = json!({"/": {"0": {".": [[0, "-", "v"]]}}});
        let tree = DeltaTree::from_json(&json).unwrap();
        let node = tree.node_at(&[Seg::Index(0)]).unwrap();
        assert_eq!(
            node.records[0],
            DeltaRecord::delete_by_value(Some(Seg::Slot(0)), Value::from("v"))
        );
    }

    #[test]
    fn zero_padded_names_stay_properties() {
        let mut tree = DeltaTree::new();
        tree.record(&[Seg::property("007")], Change::Modify(Value::from(2)));
        let json = tree.to_json();
        assert_eq!(json, json!({"/": {"007": {".": [["007", "~", 2]]}}}));
        assert_eq!(DeltaTree::from_json(&json).unwrap(), tree);
    }

    #[test]
    fn value_list_add_on_numeric_name_decodes_as_ordered() {
        let json = json!({"/": {"1": {".": [[1, "+", "b"]]}}});
        let tree = DeltaTree::from_json(&json).unwrap();
        let node = tree.node_at(&[Seg::Index(1)]).unwrap();
        assert_eq!(node.records, vec![DeltaRecord::add(Some(Seg::Index(1)), Value::from("b"))]);
    }

    #[test]
    fn conflicts_round_trip() {
        let a = DeltaRecord::modify(Some(Seg::property("x")), Value::from(1));
        let b = DeltaRecord::delete(Some(Seg::property("x")));
        let mut node = DeltaTree::new();
        node.conflicts.push(
            Conflict::between_records(ConflictType::RecordDiffOperation, a, b)
                .with_meta(Value::from("m")),
        );
        let mut inner = DeltaTree::new();
        inner.record(&[Seg::property("y")], Change::Delete);
        node.conflicts
            .push(Conflict::structure(inner.clone(), DeltaTree::new()));

        let mut root = DeltaTree::new();
        root.subtrees.insert(Seg::property("x"), node);

        let json = root.to_json();
        assert_eq!(
            json["/"]["x"]["!"][0]["conflictType"],
            json!("CONFLICT_RECORD_DIFF_OPERATION")
        );
        assert_eq!(DeltaTree::from_json(&json).unwrap(), root);
    }

    #[test]
    fn special_values_are_tagged() {
        let typed = TypedArray::from_values(TypedKind::Int16, [1.0, -2.0]);
        let value = Value::object([
            ("bytes", Value::bytes(*b"\x00\xff")),
            ("typed", Value::Typed(typed)),
            ("f", Value::function("handler")),
            ("nan", Value::Number(f64::NAN)),
            ("inf", Value::Number(f64::NEG_INFINITY)),
            ("pi", Value::Number(3.5)),
        ]);
        let json = value.to_json();
        assert_eq!(json["bytes"], json!({"$bytes": "00ff"}));
        assert_eq!(json["f"], json!({"$function": "handler"}));
        assert_eq!(json["nan"], json!({"$number": "NaN"}));
        assert_eq!(json["pi"], json!(3.5));
        assert_eq!(Value::from_json(&json).unwrap(), value);
    }

    #[test]
    fn decoding_errors_are_reported() {
        assert!(matches!(
            DeltaTree::from_json(&json!({".": [["x", "?", 1]]})),
            Err(TypeError::UnknownOperation(_))
        ));
        assert!(matches!(
            DeltaTree::from_json(&json!({".": [["x", "+"]]})),
            Err(TypeError::Malformed { .. })
        ));
        assert!(matches!(
            Value::from_json(&json!({"$bytes": "zz"})),
            Err(TypeError::InvalidHex(_))
        ));
        assert!(DeltaTree::from_json(&json!([])).is_err());
        assert!(DeltaTree::from_json(&json!({"?": 1})).is_err());
    }

    #[test]
    fn serde_goes_through_the_json_form() {
        let mut tree = DeltaTree::new();
        tree.record(&[Seg::property("x")], Change::Modify(Value::from(2)));
        let text = serde_json::to_string(&tree).unwrap();
        assert_eq!(text, r#"{"/":{"x":{".":[["x","~",2]]}}}"#);
        let back: DeltaTree = serde_json::from_str(&text).unwrap();
        assert_eq!(back, tree);
    }
}
