//! Frozen tree nodes.

use super::{cmp_seq, container_rank, Element, Scalar, Value};
use crate::collections::{ImmutableArray, ImmutableMash};
use crate::key::{CanonicalKey, KeyLike};
use core::cmp::Ordering;
use serde::{Serialize, Serializer};

/// A node of a frozen tree.
///
/// Every associative or sequential node reachable from a `Node` is itself an
/// [`ImmutableMash`] or [`ImmutableArray`]; no mutable container can be reached
/// from a frozen root. Cloning a node is cheap: containers are shared, not copied.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Leaf value.
    Scalar(Scalar),
    /// Frozen associative container.
    Mash(ImmutableMash),
    /// Frozen sequential container.
    Array(ImmutableArray),
}

impl Node {
    /// The null node.
    pub const NULL: Node = Node::Scalar(Scalar::Null);

    /// True for associative nodes.
    #[inline]
    pub fn is_mash(&self) -> bool {
        matches!(self, Node::Mash(_))
    }

    /// True for sequential nodes.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Node::Array(_))
    }

    /// True for leaves.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::Scalar(_))
    }

    /// True for the null leaf.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }

    /// Returns the mash, if this is one.
    #[inline]
    pub fn as_mash(&self) -> Option<&ImmutableMash> {
        match self {
            Node::Mash(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the array, if this is one.
    #[inline]
    pub fn as_array(&self) -> Option<&ImmutableArray> {
        match self {
            Node::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the leaf, if this is one.
    #[inline]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Text content of a string or symbol leaf.
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

    /// Looks up `key` if this node is a mash.
    pub fn get<K: KeyLike + ?Sized>(&self, key: &K) -> Option<&Node> {
        self.as_mash().and_then(|m| m.get(key))
    }

    /// Returns the element at `index` if this node is an array.
    pub fn get_index(&self, index: usize) -> Option<&Node> {
        self.as_array().and_then(|a| a.get(index))
    }

    /// Follows `path` through nested mashes and arrays.
    ///
    /// Text segments look up mash keys. Integer segments look up integer mash
    /// keys, or index arrays (negative values count from the end).
    pub fn dig<I>(&self, path: I) -> Option<&Node>
    where
        I: IntoIterator,
        I::Item: KeyLike,
    {
        let mut current = self;
        for segment in path {
            let key = segment.normalize();
            current = match (current, &key) {
                (Node::Mash(m), _) => m.get(&key)?,
                (Node::Array(a), CanonicalKey::Int(i)) => a.at(isize::try_from(*i).ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Deep-converts back into an ordinary mutable tree.
    pub fn thaw(&self) -> Value {
        crate::convert::thaw(self)
    }

    /// Converts to a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::NULL
    }
}

impl Element for Node {
    fn null() -> Self {
        Node::NULL
    }

    fn is_null(&self) -> bool {
        Node::is_null(self)
    }

    fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Node::Scalar(a), Node::Scalar(b)) => a.sort_cmp(b),
            (Node::Array(a), Node::Array(b)) => cmp_seq(a.as_slice(), b.as_slice(), Element::sort_cmp),
            (Node::Mash(a), Node::Mash(b)) => a.len().cmp(&b.len()),
            (Node::Scalar(_), _) => Ordering::Less,
            (_, Node::Scalar(_)) => Ordering::Greater,
            (a, b) => container_rank(a.is_mash()).cmp(&container_rank(b.is_mash())),
        }
    }

    fn into_items(self) -> Result<Vec<Self>, Self> {
        match self {
            Node::Array(items) => Ok(items.dup_shallow()),
            other => Err(other),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(s) => s.serialize(serializer),
            Node::Mash(m) => m.serialize(serializer),
            Node::Array(a) => a.serialize(serializer),
        }
    }
}

impl From<ImmutableMash> for Node {
    fn from(m: ImmutableMash) -> Self {
        Node::Mash(m)
    }
}

impl From<ImmutableArray> for Node {
    fn from(a: ImmutableArray) -> Self {
        Node::Array(a)
    }
}

impl From<Scalar> for Node {
    fn from(s: Scalar) -> Self {
        Node::Scalar(s)
    }
}

/// Equality across the frozen/mutable boundary.
impl PartialEq<Value> for Node {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Node::Scalar(a), Value::Scalar(b)) => a == b,
            (Node::Mash(a), Value::Map(b)) => a == b,
            (Node::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq<Node> for Value {
    fn eq(&self, other: &Node) -> bool {
        other == self
    }
}

impl PartialEq<str> for Node {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Node::Scalar(Scalar::Str(s)) if &**s == other)
    }
}

impl PartialEq<&str> for Node {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<i64> for Node {
    fn eq(&self, other: &i64) -> bool {
        self.as_i64() == Some(*other)
    }
}

impl PartialEq<i32> for Node {
    fn eq(&self, other: &i32) -> bool {
        self.as_i64() == Some(i64::from(*other))
    }
}

impl PartialEq<f64> for Node {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Node::Scalar(Scalar::Float(f)) if f == other)
    }
}

impl PartialEq<bool> for Node {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}
