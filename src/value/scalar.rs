//! Leaf values shared by frozen and thawed trees.

use crate::key::Symbol;
use core::any::Any;
use core::cmp::Ordering;
use core::fmt;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// A caller-supplied object carried through a tree without inspection.
///
/// Freezing and thawing move the handle, never the object: two `Opaque`
/// values are equal only when they point at the same allocation.
#[derive(Clone)]
pub struct Opaque {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Opaque {
    /// Wraps `value` in a new shared handle.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an existing shared handle without copying the object.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Returns the wrapped object if it is a `T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Name of the wrapped type, as reported by the compiler.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// True if both handles point at the same object.
    #[inline]
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name)
    }
}

/// Any value that is neither associative nor sequential.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    /// Absent / nil.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Str(Arc<str>),
    /// Symbolic atom used as a value.
    Sym(Symbol),
    /// Caller-supplied object passed through by reference.
    Opaque(Opaque),
}

impl Scalar {
    fn rank(&self) -> u8 {
        match self {
            Scalar::Null => 0,
            Scalar::Bool(_) => 1,
            Scalar::Int(_) | Scalar::Float(_) => 2,
            Scalar::Str(_) => 3,
            Scalar::Sym(_) => 4,
            Scalar::Opaque(_) => 5,
        }
    }

    /// Total order used by sorting operations.
    ///
    /// Values of different kinds order by kind; numbers compare numerically
    /// across `Int` and `Float`; opaque objects compare by type name only.
    #[allow(clippy::cast_precision_loss)]
    pub fn sort_cmp(&self, other: &Scalar) -> Ordering {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Float(b)) => (*a as f64).total_cmp(b),
            (Scalar::Float(a), Scalar::Int(b)) => a.total_cmp(&(*b as f64)),
            (Scalar::Float(a), Scalar::Float(b)) => a.total_cmp(b),
            (Scalar::Str(a), Scalar::Str(b)) => a.cmp(b),
            (Scalar::Sym(a), Scalar::Sym(b)) => a.cmp(b),
            (Scalar::Opaque(a), Scalar::Opaque(b)) => a.type_name().cmp(b.type_name()),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Text content, for strings and symbols.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            Scalar::Sym(s) => Some(s.name()),
            _ => None,
        }
    }

    /// Integer content.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric content, widening integers.
    #[inline]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Boolean content.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The wrapped opaque object, if any.
    #[inline]
    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Scalar::Opaque(o) => Some(o),
            _ => None,
        }
    }

    /// True for [`Scalar::Null`].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Opaque objects have no data representation of their own.
            Scalar::Null | Scalar::Opaque(_) => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::Str(s) => serializer.serialize_str(s),
            Scalar::Sym(s) => s.serialize(serializer),
        }
    }
}

impl From<()> for Scalar {
    fn from((): ()) -> Self {
        Scalar::Null
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

macro_rules! int_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Scalar {
                #[inline]
                fn from(i: $t) -> Self {
                    Scalar::Int(i64::from(i))
                }
            }
        )*
    };
}

int_scalar!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

impl From<f32> for Scalar {
    fn from(f: f32) -> Self {
        Scalar::Float(f64::from(f))
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(Arc::from(s))
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(Arc::from(s))
    }
}

impl From<Arc<str>> for Scalar {
    fn from(s: Arc<str>) -> Self {
        Scalar::Str(s)
    }
}

impl From<Symbol> for Scalar {
    fn from(s: Symbol) -> Self {
        Scalar::Sym(s)
    }
}

impl From<Opaque> for Scalar {
    fn from(o: Opaque) -> Self {
        Scalar::Opaque(o)
    }
}
