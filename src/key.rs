//! Key normalization for associative containers.
//!
//! Attribute trees are produced by code that is free to spell the same key in
//! several ways: as plain text (`"port"`), as a symbolic atom (`Symbol::new("port")`),
//! or as an already-normalized [`CanonicalKey`]. Every associative container in
//! this crate stores and compares keys in exactly one form, the canonical key, and
//! converts at the boundary through [`KeyLike::normalize`].
//!
//! Normalization rules:
//! - **Text and symbols** collapse to [`CanonicalKey::Text`].
//! - **Integers** are not normalizable; they are stored verbatim as
//!   [`CanonicalKey::Int`] (identity normalization).
//!
//! Normalization is total and stable: normalizing a canonical key returns it
//! unchanged, so `normalize(&normalize(&k)) == normalize(&k)` for every key form.

use core::fmt;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// A symbolic atom.
///
/// Symbols are a distinct key representation from plain text, but a symbol and a
/// string with the same spelling always address the same stored entry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Creates a symbol with the given name.
    #[inline]
    pub fn new(name: impl AsRef<str>) -> Self {
        Symbol(Arc::from(name.as_ref()))
    }

    /// Returns the symbol's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Shorthand for [`Symbol::new`].
#[inline]
pub fn sym(name: &str) -> Symbol {
    Symbol::new(name)
}

/// The single form in which associative containers store and compare keys.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalKey {
    /// Text key. Both strings and symbols normalize here.
    Text(Arc<str>),
    /// Integer key, stored verbatim. Wide enough for every `u64` and `i64`.
    Int(i128),
}

impl CanonicalKey {
    /// Returns the key text, if this is a text key.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CanonicalKey::Text(s) => Some(s),
            CanonicalKey::Int(_) => None,
        }
    }

    /// Returns the integer, if this is an integer key.
    #[inline]
    pub fn as_int(&self) -> Option<i128> {
        match self {
            CanonicalKey::Int(i) => Some(*i),
            CanonicalKey::Text(_) => None,
        }
    }
}

impl fmt::Debug for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalKey::Text(s) => write!(f, "{s:?}"),
            CanonicalKey::Int(i) => write!(f, "{i}"),
        }
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalKey::Text(s) => f.write_str(s),
            CanonicalKey::Int(i) => write!(f, "{i}"),
        }
    }
}

impl PartialEq<str> for CanonicalKey {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for CanonicalKey {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl Serialize for CanonicalKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CanonicalKey::Text(s) => serializer.serialize_str(s),
            CanonicalKey::Int(i) => match i64::try_from(*i) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => serializer.collect_str(i),
            },
        }
    }
}

/// Any token usable as a lookup or insertion key.
pub trait KeyLike {
    /// Maps this key to its canonical form.
    fn normalize(&self) -> CanonicalKey;
}

/// Normalizes `key` to its canonical form.
#[inline]
pub fn normalize<K: KeyLike + ?Sized>(key: &K) -> CanonicalKey {
    key.normalize()
}

impl KeyLike for CanonicalKey {
    #[inline]
    fn normalize(&self) -> CanonicalKey {
        self.clone()
    }
}

impl KeyLike for str {
    #[inline]
    fn normalize(&self) -> CanonicalKey {
        CanonicalKey::Text(Arc::from(self))
    }
}

impl KeyLike for String {
    #[inline]
    fn normalize(&self) -> CanonicalKey {
        self.as_str().normalize()
    }
}

impl KeyLike for Arc<str> {
    #[inline]
    fn normalize(&self) -> CanonicalKey {
        CanonicalKey::Text(Arc::clone(self))
    }
}

impl KeyLike for Symbol {
    #[inline]
    fn normalize(&self) -> CanonicalKey {
        CanonicalKey::Text(Arc::clone(&self.0))
    }
}

macro_rules! int_key {
    ($($t:ty),*) => {
        $(
            impl KeyLike for $t {
                #[inline]
                fn normalize(&self) -> CanonicalKey {
                    CanonicalKey::Int(i128::from(*self))
                }
            }
        )*
    };
}

int_key!(i8, i16, i32, i64, u8, u16, u32, u64);

// Pointer-sized integers are at most 64 bits wide, so both fit in `i128`.
impl KeyLike for usize {
    #[inline]
    #[allow(clippy::cast_lossless)]
    fn normalize(&self) -> CanonicalKey {
        CanonicalKey::Int(*self as i128)
    }
}

impl KeyLike for isize {
    #[inline]
    #[allow(clippy::cast_lossless)]
    fn normalize(&self) -> CanonicalKey {
        CanonicalKey::Int(*self as i128)
    }
}

impl<K: KeyLike + ?Sized> KeyLike for &K {
    #[inline]
    fn normalize(&self) -> CanonicalKey {
        (**self).normalize()
    }
}

impl From<&str> for CanonicalKey {
    fn from(s: &str) -> Self {
        s.normalize()
    }
}

impl From<Symbol> for CanonicalKey {
    fn from(s: Symbol) -> Self {
        CanonicalKey::Text(s.0)
    }
}

impl From<i64> for CanonicalKey {
    fn from(i: i64) -> Self {
        CanonicalKey::Int(i128::from(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_symbol_normalize_identically() {
        assert_eq!(normalize("port"), normalize(&sym("port")));
        assert_eq!(normalize(&String::from("port")), normalize(&Symbol::new("port")));
    }

    #[test]
    fn test_normalization_is_stable() {
        let forms: Vec<CanonicalKey> = vec![normalize("a"), normalize(&sym("a")), normalize(&7_i64)];
        for key in forms {
            assert_eq!(normalize(&normalize(&key)), key);
        }
    }

    #[test]
    fn test_integer_keys_are_stored_verbatim() {
        assert_eq!(normalize(&3_usize), CanonicalKey::Int(3));
        assert_ne!(normalize(&3_i32), normalize("3"));
    }

    #[test]
    fn test_wide_integer_keys_do_not_wrap() {
        assert_eq!(normalize(&usize::MAX), CanonicalKey::Int(i128::from(u64::MAX)));
        assert_eq!(normalize(&u64::MAX).as_int(), Some(i128::from(u64::MAX)));
        assert_ne!(normalize(&usize::MAX), normalize(&-1_i64));
        assert_eq!(normalize(&-1_isize), normalize(&-1_i64));
        assert_eq!(serde_json::to_string(&normalize(&u64::MAX)).unwrap(), "\"18446744073709551615\"");
        assert_eq!(serde_json::to_string(&normalize(&-5_i32)).unwrap(), "-5");
    }

    #[test]
    fn test_symbol_formatting() {
        let s = sym("platform");
        assert_eq!(format!("{s:?}"), ":platform");
        assert_eq!(s.to_string(), "platform");
        assert_eq!(normalize(&s).to_string(), "platform");
    }
}
