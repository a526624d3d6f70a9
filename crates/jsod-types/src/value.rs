//! The value model that jsod diffs, patches and merges.
//!
//! [`Value`] is a closed enum covering JSON-like data plus the non-JSON
//! shapes the engines care about: fixed-size byte buffers, fixed-width
//! numeric arrays and callables. Absence is never a `Value`; it is modelled
//! as `Option<&Value>` / `Option<Value>` wherever a position may be empty.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A nested value.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// A growable plain list.
    Array(Vec<Value>),
    /// A plain key-value tree.
    Object(BTreeMap<String, Value>),
    /// A fixed-size binary buffer.
    Bytes(Vec<u8>),
    /// A fixed-width numeric array.
    Typed(TypedArray),
    /// A callable, identified by name.
    Function(String),
}

/// Coarse classification of a value, resolved once per comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueShape {
    /// Null, booleans, numbers and strings.
    Scalar,
    /// Functions.
    Callable,
    /// Growable plain lists.
    List,
    /// Byte buffers and typed arrays.
    Binary,
    /// Plain key-value objects.
    Tree,
}

impl Value {
    /// Build an object from `(key, value)` pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a byte buffer.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(data.into())
    }

    /// Build a function reference.
    pub fn function(name: impl Into<String>) -> Self {
        Value::Function(name.into())
    }

    /// The classification used by the comparator chain.
    pub fn shape(&self) -> ValueShape {
        match self {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => ValueShape::Scalar,
            Value::Function(_) => ValueShape::Callable,
            Value::Array(_) => ValueShape::List,
            Value::Bytes(_) | Value::Typed(_) => ValueShape::Binary,
            Value::Object(_) => ValueShape::Tree,
        }
    }

    /// Short human-readable name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Bytes(_) => "bytes",
            Value::Typed(_) => "typed array",
            Value::Function(_) => "function",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` for every reference-like value: lists, objects,
    /// buffers, typed arrays and functions. `Null` is not object-like.
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Object(_) | Value::Bytes(_) | Value::Typed(_) | Value::Function(_)
        )
    }

    /// Returns `true` for indexable sequences: arrays, buffers and typed arrays.
    pub fn is_list_like(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Bytes(_) | Value::Typed(_))
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number of elements of a list-like value.
    pub fn list_len(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(items.len()),
            Value::Bytes(bytes) => Some(bytes.len()),
            Value::Typed(typed) => Some(typed.len()),
            _ => None,
        }
    }

    /// Element `index` of a list-like value. Buffer and typed-array elements
    /// are materialised as [`Value::Number`].
    pub fn element(&self, index: usize) -> Option<Cow<'_, Value>> {
        match self {
            Value::Array(items) => items.get(index).map(Cow::Borrowed),
            Value::Bytes(bytes) => bytes
                .get(index)
                .map(|b| Cow::Owned(Value::Number(f64::from(*b)))),
            Value::Typed(typed) => typed.get(index).map(|n| Cow::Owned(Value::Number(n))),
            _ => None,
        }
    }

    /// Numeric conversion used when storing into binary containers.
    ///
    /// Mirrors the usual loose number coercion: `null` is zero, booleans are
    /// zero or one, numeric strings parse, everything else is `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            _ => f64::NAN,
        }
    }
}

fn same_number(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => same_number(*a, *b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Typed(a), Value::Typed(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

impl From<TypedArray> for Value {
    fn from(typed: TypedArray) -> Self {
        Value::Typed(typed)
    }
}

/// Plain structural conversion from JSON. Tagged encodings (`{"$bytes": ..}`
/// and friends) are kept as ordinary objects; use [`Value::from_json`] to
/// decode them.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TypedArray
// ---------------------------------------------------------------------------

/// Element kind of a [`TypedArray`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypedKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl TypedKind {
    /// Convert an arbitrary number into the representable value for this kind.
    pub fn coerce(self, n: f64) -> f64 {
        match self {
            TypedKind::Int8 => wrap_integer(n, 8, true),
            TypedKind::Uint8 => wrap_integer(n, 8, false),
            TypedKind::Uint8Clamped => {
                if n.is_nan() {
                    0.0
                } else {
                    n.clamp(0.0, 255.0).round_ties_even()
                }
            }
            TypedKind::Int16 => wrap_integer(n, 16, true),
            TypedKind::Uint16 => wrap_integer(n, 16, false),
            TypedKind::Int32 => wrap_integer(n, 32, true),
            TypedKind::Uint32 => wrap_integer(n, 32, false),
            TypedKind::Float32 => f64::from(n as f32),
            TypedKind::Float64 => n,
        }
    }
}

/// Modular integer conversion: truncate toward zero, then wrap into
/// `bits` bits. Non-finite inputs become zero.
fn wrap_integer(n: f64, bits: u32, signed: bool) -> f64 {
    if !n.is_finite() {
        return 0.0;
    }
    let modulus = 2f64.powi(bits as i32);
    let wrapped = n.trunc().rem_euclid(modulus);
    if signed && wrapped >= modulus / 2.0 {
        wrapped - modulus
    } else {
        wrapped
    }
}

/// Coerce a value into a buffer byte.
pub fn to_byte(value: &Value) -> u8 {
    wrap_integer(value.to_number(), 8, false) as u8
}

/// A fixed-width numeric array. Every stored element is coerced to the
/// array's [`TypedKind`].
#[derive(Clone, Debug)]
pub struct TypedArray {
    kind: TypedKind,
    elements: Vec<f64>,
}

impl TypedArray {
    /// A zero-filled array of `len` elements.
    pub fn new(kind: TypedKind, len: usize) -> Self {
        Self {
            kind,
            elements: vec![0.0; len],
        }
    }

    /// Build an array from numbers, coercing each one.
    pub fn from_values(kind: TypedKind, values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            kind,
            elements: values.into_iter().map(|n| kind.coerce(n)).collect(),
        }
    }

    pub fn kind(&self) -> TypedKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.elements.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.elements
    }

    /// Store `n` at `index`. Out-of-range writes are ignored and return `false`,
    /// since the length of a typed array is fixed.
    pub fn set(&mut self, index: usize, n: f64) -> bool {
        match self.elements.get_mut(index) {
            Some(slot) => {
                *slot = self.kind.coerce(n);
                true
            }
            None => false,
        }
    }

    /// A copy of this array with a new length: the retained prefix is copied,
    /// new elements are zero.
    pub fn resized(&self, len: usize) -> TypedArray {
        let mut elements = vec![0.0; len];
        let keep = len.min(self.elements.len());
        elements[..keep].copy_from_slice(&self.elements[..keep]);
        TypedArray {
            kind: self.kind,
            elements,
        }
    }

    /// [`resized`](Self::resized), or `None` when storage for `len`
    /// elements cannot be allocated.
    pub fn try_resized(&self, len: usize) -> Option<TypedArray> {
        let mut elements = Vec::new();
        elements.try_reserve_exact(len).ok()?;
        let keep = len.min(self.elements.len());
        elements.extend_from_slice(&self.elements[..keep]);
        elements.resize(len, 0.0);
        Some(TypedArray {
            kind: self.kind,
            elements,
        })
    }
}

impl PartialEq for TypedArray {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.elements.len() == other.elements.len()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| same_number(*a, *b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nan_equals_nan() {
        assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_ne!(Value::Number(1.0), Value::Number(f64::NAN));
    }

    #[test]
    fn deep_equality_is_structural() {
        let a = Value::from(json!({"a": [1, 2, {"b": null}]}));
        let b = Value::from(json!({"a": [1, 2, {"b": null}]}));
        let c = Value::from(json!({"a": [1, 2, {"b": 0}]}));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn shapes() {
        assert_eq!(Value::Null.shape(), ValueShape::Scalar);
        assert_eq!(Value::from("x").shape(), ValueShape::Scalar);
        assert_eq!(Value::function("f").shape(), ValueShape::Callable);
        assert_eq!(Value::Array(vec![]).shape(), ValueShape::List);
        assert_eq!(Value::bytes(*b"ab").shape(), ValueShape::Binary);
        assert_eq!(
            Value::Typed(TypedArray::new(TypedKind::Uint8, 2)).shape(),
            ValueShape::Binary
        );
        assert_eq!(Value::from(json!({})).shape(), ValueShape::Tree);
    }

    #[test]
    fn buffer_elements_materialise_as_numbers() {
        let buf = Value::bytes(*b"a");
        assert_eq!(buf.list_len(), Some(1));
        assert_eq!(buf.element(0).as_deref(), Some(&Value::Number(97.0)));
        assert!(buf.element(1).is_none());
    }

    #[test]
    fn integer_kinds_wrap() {
        assert_eq!(TypedKind::Uint8.coerce(256.0), 0.0);
        assert_eq!(TypedKind::Uint8.coerce(-1.0), 255.0);
        assert_eq!(TypedKind::Int8.coerce(128.0), -128.0);
        assert_eq!(TypedKind::Int16.coerce(3.9), 3.0);
        assert_eq!(TypedKind::Uint32.coerce(f64::NAN), 0.0);
    }

    #[test]
    fn clamped_kind_clamps_and_rounds_to_even() {
        assert_eq!(TypedKind::Uint8Clamped.coerce(300.0), 255.0);
        assert_eq!(TypedKind::Uint8Clamped.coerce(-5.0), 0.0);
        assert_eq!(TypedKind::Uint8Clamped.coerce(2.5), 2.0);
        assert_eq!(TypedKind::Uint8Clamped.coerce(3.5), 4.0);
    }

    #[test]
    fn to_byte_coerces_loosely() {
        assert_eq!(to_byte(&Value::from(33)), 33);
        assert_eq!(to_byte(&Value::from("12")), 12);
        assert_eq!(to_byte(&Value::from("!")), 0);
        assert_eq!(to_byte(&Value::Bool(true)), 1);
    }

    #[test]
    fn typed_array_resize_copies_prefix() {
        let arr = TypedArray::from_values(TypedKind::Uint8, [65.0, 66.0]);
        let grown = arr.resized(3);
        assert_eq!(grown.as_slice(), &[65.0, 66.0, 0.0]);
        let shrunk = arr.resized(1);
        assert_eq!(shrunk.as_slice(), &[65.0]);

        assert_eq!(arr.try_resized(3), Some(grown));
        assert_eq!(arr.try_resized(usize::MAX), None);
    }

    #[test]
    fn typed_array_set_is_bounded() {
        let mut arr = TypedArray::new(TypedKind::Int8, 1);
        assert!(arr.set(0, 200.0));
        assert_eq!(arr.get(0), Some(-56.0));
        assert!(!arr.set(1, 1.0));
    }
}
