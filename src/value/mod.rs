//! Tree values.
//!
//! Two parallel trees share the same leaves ([`Scalar`]):
//! - [`Value`] is the ordinary, mutable tree. Its associative nodes are
//!   [`Mash<Value>`] and its sequential nodes are `Vec<Value>`.
//! - [`Node`] is the frozen tree. Its associative nodes are
//!   [`ImmutableMash`](crate::ImmutableMash) and its sequential nodes are
//!   [`ImmutableArray`](crate::ImmutableArray).
//!
//! The two compare equal across the boundary (`Node == Value`) whenever they
//! hold the same content, ignoring mutability.

pub mod node;
pub mod scalar;

pub use node::Node;
pub use scalar::{Opaque, Scalar};

use crate::collections::Mash;
use crate::key::{KeyLike, Symbol};
use core::cmp::Ordering;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// An ordinary, mutable tree value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Leaf value.
    Scalar(Scalar),
    /// Mutable associative container.
    Map(Mash<Value>),
    /// Mutable sequential container.
    Array(Vec<Value>),
}

impl Value {
    /// The null value.
    pub const NULL: Value = Value::Scalar(Scalar::Null);

    /// Returns the map, if this is one.
    #[inline]
    pub fn as_mash(&self) -> Option<&Mash<Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the map mutably, if this is one.
    #[inline]
    pub fn as_mash_mut(&mut self) -> Option<&mut Mash<Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the array, if this is one.
    #[inline]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the array mutably, if this is one.
    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the scalar, if this is one.
    #[inline]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Text content of a string or symbol scalar.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Integer content.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Scalar::as_i64)
    }

    /// Numeric content.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Scalar::as_f64)
    }

    /// Boolean content.
    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Scalar::as_bool)
    }

    /// True for the null scalar.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Scalar(Scalar::Null))
    }

    /// Looks up `key` if this value is a map.
    pub fn get<K: KeyLike + ?Sized>(&self, key: &K) -> Option<&Value> {
        self.as_mash().and_then(|m| m.get(key))
    }

    /// Returns the element at `index` if this value is an array.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|a| a.get(index))
    }

    /// Freezes this tree. See [`crate::freeze`].
    pub fn freeze(self) -> Node {
        crate::convert::freeze(self)
    }

    /// Converts to a `serde_json::Value`.
    ///
    /// Symbols become strings, integer map keys become their decimal text and
    /// opaque objects become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::NULL
    }
}

/// Element behaviour needed by the in-place sequential operations.
///
/// Implemented by both the mutable and the frozen tree so that the same
/// operations run over a deep copy (`Vec<Value>`) and a shallow one (`Vec<Node>`).
pub trait Element: Clone + PartialEq {
    /// The null scalar, used to pad sequences.
    fn null() -> Self;

    /// True for the null scalar.
    fn is_null(&self) -> bool;

    /// Total order used by sorting.
    fn sort_cmp(&self, other: &Self) -> Ordering;

    /// Splits a nested sequence into its elements; other values come back as `Err`.
    ///
    /// # Errors
    /// Returns `self` unchanged when it is not a sequence.
    fn into_items(self) -> Result<Vec<Self>, Self>;
}

pub(crate) fn container_rank(is_map: bool) -> u8 {
    if is_map {
        6
    } else {
        7
    }
}

impl Element for Value {
    fn null() -> Self {
        Value::NULL
    }

    fn is_null(&self) -> bool {
        Value::is_null(self)
    }

    fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => a.sort_cmp(b),
            (Value::Array(a), Value::Array(b)) => cmp_seq(a, b, Element::sort_cmp),
            (Value::Map(a), Value::Map(b)) => a.len().cmp(&b.len()),
            (Value::Scalar(_), _) => Ordering::Less,
            (_, Value::Scalar(_)) => Ordering::Greater,
            (a, b) => container_rank(a.as_mash().is_some()).cmp(&container_rank(b.as_mash().is_some())),
        }
    }

    fn into_items(self) -> Result<Vec<Self>, Self> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(other),
        }
    }
}

pub(crate) fn cmp_seq<T>(a: &[T], b: &[T], cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match cmp(x, y) {
            Ordering::Equal => {}
            non_eq => return non_eq,
        }
    }
    a.len().cmp(&b.len())
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(s) => s.serialize(serializer),
            Value::Map(m) => m.serialize(serializer),
            Value::Array(a) => a.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::NULL,
            serde_json::Value::Bool(b) => Value::from(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::from(i),
                None => Value::from(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                let mut mash = Mash::with_capacity(map.len());
                for (k, v) in map {
                    mash.insert(k.as_str(), Value::from(v));
                }
                Value::Map(mash)
            }
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<Mash<Value>> for Value {
    fn from(m: Mash<Value>) -> Self {
        Value::Map(m)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! scalar_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                #[inline]
                fn from(v: $t) -> Self {
                    Value::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

scalar_value!((), bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, &str, String, Arc<str>, Symbol, Opaque);

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Value::Scalar(Scalar::Str(s)) if &**s == other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        self.as_i64() == Some(*other)
    }
}

impl PartialEq<i32> for Value {
    fn eq(&self, other: &i32) -> bool {
        self.as_i64() == Some(i64::from(*other))
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_shape() {
        let v = Value::from(json!({"a": [1, 2.5, null, "x"], "b": {"c": true}}));
        let a = v.get("a").and_then(Value::as_array).unwrap();
        assert_eq!(a.len(), 4);
        assert_eq!(a[0], 1);
        assert_eq!(a[1].as_f64(), Some(2.5));
        assert!(a[2].is_null());
        assert_eq!(a[3], "x");
        assert_eq!(v.get("b").and_then(|b| b.get("c")), Some(&Value::from(true)));
    }

    #[test]
    fn test_to_json_round_trip() {
        let source = json!({"top": {"list": [1, "two", {"three": 3}]}});
        assert_eq!(Value::from(source.clone()).to_json(), source);
    }

    #[test]
    fn test_deserialize_value() {
        let v: Value = serde_json::from_str(r#"{"k": [true, false]}"#).unwrap();
        assert_eq!(v.get("k").and_then(|k| k.get_index(1)), Some(&Value::from(false)));
    }

    #[test]
    fn test_flatten_items() {
        let nested = Value::from(vec![Value::from(1), Value::from(2)]);
        assert_eq!(nested.into_items().map(|v| v.len()), Ok(2));
        assert_eq!(Value::from(1).into_items(), Err(Value::from(1)));
    }
}
