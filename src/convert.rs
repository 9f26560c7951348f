//! Deep conversion between mutable and frozen trees.
//!
//! - [`freeze`] walks an input tree once, wrapping every associative value in
//!   an [`ImmutableMash`] (keys normalized) and every sequential value in an
//!   [`ImmutableArray`]. Anything else is a scalar and is moved through as-is;
//!   opaque objects are never inspected or copied.
//! - [`thaw`] is the inverse: every frozen container becomes a [`Mash<Value>`]
//!   or `Vec<Value>`, recursively.
//!
//! `thaw(&freeze(x)) == x` holds for every acyclic input. Recursion depth is
//! the nesting depth of the input.

use crate::collections::{ImmutableArray, ImmutableMash, Mash};
use crate::key::{KeyLike, Symbol};
use crate::value::{Node, Opaque, Scalar, Value};
use core::fmt;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Raised by the shape-checked constructors when the input has the wrong shape.
///
/// Freezing itself never fails; only [`ImmutableMash::new`] and
/// [`ImmutableArray::new`] check what the input froze into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeError {
    /// Expected an associative input; holds the shape actually found.
    NotAssociative(&'static str),
    /// Expected a sequential input; holds the shape actually found.
    NotSequential(&'static str),
}

impl fmt::Display for FreezeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreezeError::NotAssociative(found) => write!(f, "expected an associative value, found {found}"),
            FreezeError::NotSequential(found) => write!(f, "expected a sequential value, found {found}"),
        }
    }
}

impl std::error::Error for FreezeError {}

/// Anything that can be frozen into a [`Node`].
pub trait Freeze {
    /// Consumes `self`, producing its frozen equivalent.
    fn freeze(self) -> Node;
}

/// Freezes `value`.
#[inline]
pub fn freeze<T: Freeze>(value: T) -> Node {
    value.freeze()
}

/// Deep-converts a frozen node into an ordinary mutable tree.
pub fn thaw(node: &Node) -> Value {
    match node {
        Node::Scalar(s) => Value::Scalar(s.clone()),
        Node::Mash(m) => Value::Map(thaw_mash(m)),
        Node::Array(a) => Value::Array(thaw_array(a)),
    }
}

pub(crate) fn thaw_mash(mash: &ImmutableMash) -> Mash<Value> {
    let mut out = Mash::with_capacity(mash.len());
    for (k, v) in mash.iter() {
        out.insert_canonical(k.clone(), thaw(v));
    }
    out
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn thaw_array(array: &ImmutableArray) -> Vec<Value> {
    array.iter().map(thaw).collect()
}

/// Arrays above this length are thawed on the rayon pool.
#[cfg(feature = "parallel")]
const PARALLEL_THAW_MIN_LEN: usize = 1024;

#[cfg(feature = "parallel")]
pub(crate) fn thaw_array(array: &ImmutableArray) -> Vec<Value> {
    use rayon::prelude::*;
    if array.len() >= PARALLEL_THAW_MIN_LEN {
        array.as_slice().par_iter().map(thaw).collect()
    } else {
        array.iter().map(thaw).collect()
    }
}

impl Freeze for Node {
    #[inline]
    fn freeze(self) -> Node {
        self
    }
}

impl Freeze for Scalar {
    #[inline]
    fn freeze(self) -> Node {
        Node::Scalar(self)
    }
}

impl Freeze for ImmutableMash {
    #[inline]
    fn freeze(self) -> Node {
        Node::Mash(self)
    }
}

impl Freeze for ImmutableArray {
    #[inline]
    fn freeze(self) -> Node {
        Node::Array(self)
    }
}

impl Freeze for Value {
    fn freeze(self) -> Node {
        match self {
            Value::Scalar(s) => Node::Scalar(s),
            Value::Map(m) => Node::Mash(ImmutableMash::from_mash(m)),
            Value::Array(a) => Node::Array(ImmutableArray::from_vec(a)),
        }
    }
}

impl<V: Freeze> Freeze for Mash<V> {
    fn freeze(self) -> Node {
        Node::Mash(ImmutableMash::from_mash(self))
    }
}

impl<V: Freeze> Freeze for Vec<V> {
    fn freeze(self) -> Node {
        Node::Array(ImmutableArray::from_vec(self))
    }
}

impl<V: Freeze, const N: usize> Freeze for [V; N] {
    fn freeze(self) -> Node {
        Node::Array(ImmutableArray::from_vec(Vec::from(self)))
    }
}

impl<K: KeyLike, V: Freeze, S> Freeze for HashMap<K, V, S> {
    fn freeze(self) -> Node {
        Node::Mash(self.into_iter().collect())
    }
}

impl<K: KeyLike, V: Freeze> Freeze for BTreeMap<K, V> {
    fn freeze(self) -> Node {
        Node::Mash(self.into_iter().collect())
    }
}

impl<V: Freeze> Freeze for Option<V> {
    fn freeze(self) -> Node {
        self.map_or(Node::NULL, Freeze::freeze)
    }
}

impl Freeze for serde_json::Value {
    fn freeze(self) -> Node {
        match self {
            serde_json::Value::Array(items) => items.freeze(),
            serde_json::Value::Object(map) => Node::Mash(map.into_iter().collect()),
            scalar => Value::from(scalar).freeze(),
        }
    }
}

macro_rules! freeze_scalar {
    ($($t:ty),*) => {
        $(
            impl Freeze for $t {
                #[inline]
                fn freeze(self) -> Node {
                    Node::Scalar(Scalar::from(self))
                }
            }
        )*
    };
}

freeze_scalar!((), bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, &str, String, Arc<str>, Symbol, Opaque);
