//! `ImmutableMash`: the frozen associative container.
//!
//! An `ImmutableMash` owns a [`Mash<Node>`] behind an `Arc` and never hands out
//! mutable access to it. Construction freezes every value, so every nested
//! associative or sequential value is itself frozen. Clones share storage.
//!
//! Escape hatches:
//! - [`ImmutableMash::dup_shallow`] copies the top level into a writable
//!   [`Mash<Node>`] whose values are the same frozen nodes.
//! - [`ImmutableMash::to_mutable_deep`] thaws the whole tree into a [`Mash<Value>`].

use super::Mash;
use crate::convert::{thaw_mash, Freeze};
use crate::guard::{refuse, ContainerKind, ImmutableModificationError, MashOp, MashWrite, Outcome};
use crate::key::{CanonicalKey, KeyLike};
use crate::value::{Node, Value};
use crate::FreezeError;
use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Frozen associative container with canonical keys.
#[derive(Clone)]
pub struct ImmutableMash {
    entries: Arc<Mash<Node>>,
}

impl ImmutableMash {
    /// Freezes `input`, which must be associative.
    ///
    /// # Errors
    /// Returns [`FreezeError::NotAssociative`] if `input` freezes to an array
    /// or a scalar.
    pub fn new<T: Freeze>(input: T) -> Result<Self, FreezeError> {
        match input.freeze() {
            Node::Mash(m) => Ok(m),
            Node::Array(_) => Err(FreezeError::NotAssociative("array")),
            Node::Scalar(_) => Err(FreezeError::NotAssociative("scalar")),
        }
    }

    /// Creates an empty mash.
    pub fn empty() -> Self {
        Self::from_frozen(Mash::new())
    }

    /// Freezes every value of `mash`. Keys are already canonical.
    pub fn from_mash<V: Freeze>(mash: Mash<V>) -> Self {
        let mut entries = Mash::with_capacity(mash.len());
        for (k, v) in mash {
            entries.insert_canonical(k, v.freeze());
        }
        Self::from_frozen(entries)
    }

    fn from_frozen(entries: Mash<Node>) -> Self {
        #[cfg(feature = "tracing")]
        tracing::trace!(entries = entries.len(), "froze mash");
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the node stored under the normalized `key`.
    #[inline]
    pub fn get<K: KeyLike + ?Sized>(&self, key: &K) -> Option<&Node> {
        self.entries.get(key)
    }

    /// True if the normalized `key` is present.
    #[inline]
    pub fn contains_key<K: KeyLike + ?Sized>(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the node under `key`, or `default` when absent.
    pub fn fetch<'a, K: KeyLike + ?Sized>(&'a self, key: &K, default: &'a Node) -> &'a Node {
        self.get(key).unwrap_or(default)
    }

    /// Follows `path` from this mash. See [`Node::dig`].
    pub fn dig<I>(&self, path: I) -> Option<&Node>
    where
        I: IntoIterator,
        I::Item: KeyLike,
    {
        let mut path = path.into_iter();
        let first = path.next()?;
        self.get(&first)?.dig(path)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, &Node)> + '_ {
        self.entries.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &CanonicalKey> + '_ {
        self.entries.keys()
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Node> + '_ {
        self.entries.values()
    }

    /// Returns a new mash holding this one's entries overlaid with `other`'s.
    pub fn merge(&self, other: &ImmutableMash) -> Mash<Node> {
        let mut out = self.dup_shallow();
        for (k, v) in other.iter() {
            out.insert_canonical(k.clone(), v.clone());
        }
        out
    }

    /// Returns a new mash holding the entries for which `pred` is true.
    pub fn select(&self, mut pred: impl FnMut(&CanonicalKey, &Node) -> bool) -> Mash<Node> {
        self.iter()
            .filter(|(k, v)| pred(*k, *v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Thaws the whole tree into ordinary mutable containers.
    pub fn to_mutable_deep(&self) -> Mash<Value> {
        thaw_mash(self)
    }

    /// Copies the top level into a writable mash sharing the same nodes.
    pub fn dup_shallow(&self) -> Mash<Node> {
        (*self.entries).clone()
    }

    /// True if both handles share the same storage.
    #[inline]
    pub fn ptr_eq(&self, other: &ImmutableMash) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Converts to a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for ImmutableMash {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ImmutableMash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for ImmutableMash {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.entries == *other.entries
    }
}

impl PartialEq<Mash<Value>> for ImmutableMash {
    fn eq(&self, other: &Mash<Value>) -> bool {
        *self.entries == *other
    }
}

impl PartialEq<Mash<Node>> for ImmutableMash {
    fn eq(&self, other: &Mash<Node>) -> bool {
        *self.entries == *other
    }
}

impl PartialEq<ImmutableMash> for Mash<Value> {
    fn eq(&self, other: &ImmutableMash) -> bool {
        other == self
    }
}

impl<K: KeyLike, V: Freeze> FromIterator<(K, V)> for ImmutableMash {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries = Mash::new();
        for (k, v) in iter {
            entries.insert(k, v.freeze());
        }
        Self::from_frozen(entries)
    }
}

impl<'a> IntoIterator for &'a ImmutableMash {
    type Item = (&'a CanonicalKey, &'a Node);
    type IntoIter = Box<dyn Iterator<Item = (&'a CanonicalKey, &'a Node)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl Serialize for ImmutableMash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ImmutableMash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ImmutableMash::new(Value::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

/// Every write is refused before any state is touched.
impl MashWrite<Node> for ImmutableMash {
    fn apply(&mut self, op: MashOp<'_, Node>) -> Result<Outcome<Node>, ImmutableModificationError> {
        Err(refuse(ContainerKind::Mash, op.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::sym;
    use serde_json::json;

    fn sample() -> ImmutableMash {
        ImmutableMash::new(json!({"name": "web", "ports": [80, 443], "tls": {"enabled": true}})).unwrap()
    }

    #[test]
    fn test_reads() {
        let mash = sample();
        assert_eq!(mash.len(), 3);
        assert!(mash.contains_key("tls"));
        assert!(mash.contains_key(&sym("tls")));
        assert!(!mash.contains_key("missing"));
        assert_eq!(mash.get("name").and_then(Node::as_str), Some("web"));
        assert_eq!(mash.dig(["tls", "enabled"]).and_then(Node::as_bool), Some(true));
        assert_eq!(mash.fetch("missing", &Node::NULL), &Node::NULL);
        let keys: Vec<String> = mash.keys().map(ToString::to_string).collect();
        assert_eq!(keys, ["name", "ports", "tls"]);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let mash = sample();
        let first: Vec<_> = mash.iter().map(|(k, _)| k.clone()).collect();
        let second: Vec<_> = (&mash).into_iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_constructor_rejects_non_maps() {
        assert_eq!(ImmutableMash::new(json!([1])).unwrap_err(), FreezeError::NotAssociative("array"));
        assert_eq!(ImmutableMash::new(json!(1)).unwrap_err(), FreezeError::NotAssociative("scalar"));
    }

    #[test]
    fn test_merge_and_select_leave_source_alone() {
        let mash = sample();
        let overlay = ImmutableMash::new(json!({"name": "api", "extra": 1})).unwrap();
        let merged = mash.merge(&overlay);
        assert_eq!(merged.get("name").and_then(Node::as_str), Some("api"));
        assert_eq!(merged.len(), 4);
        let selected = mash.select(|k, _| k != "ports");
        assert_eq!(selected.len(), 2);
        assert_eq!(mash.len(), 3);
        assert_eq!(mash.get("name").and_then(Node::as_str), Some("web"));
    }

    #[test]
    fn test_writes_are_refused() {
        let mut mash = sample();
        let err = mash.apply(MashOp::Clear).unwrap_err();
        assert_eq!(err.operation(), "clear");
        assert_eq!(err.container(), ContainerKind::Mash);
        assert_eq!(mash.delete("name".into()).unwrap_err().operation(), "delete");
        assert_eq!(mash.len(), 3);
    }

    #[test]
    fn test_clones_share_storage() {
        let mash = sample();
        let copy = mash.clone();
        assert!(mash.ptr_eq(&copy));
        assert_eq!(mash, copy);
    }

    #[test]
    fn test_deserialize_freezes() {
        let mash: ImmutableMash = serde_json::from_str(r#"{"a": {"b": [1]}}"#).unwrap();
        assert!(mash.dig(["a", "b"]).is_some_and(Node::is_array));
        assert_eq!(mash.to_json(), json!({"a": {"b": [1]}}));
    }
}
