//! `Mash`: an insertion-ordered, key-normalizing mutable map.
//!
//! Layout follows a dense index map:
//! - **Dense vectors**: `keys` and `values` hold entries in insertion order,
//!   so iteration is a linear scan.
//! - **Hash index**: `index` maps each canonical key to its dense position.
//!
//! Every key passes through [`KeyLike::normalize`] on the way in, so `"name"`
//! and `Symbol::new("name")` address the same entry. Inserting a key that is
//! already present overwrites the value in place (last write wins) and keeps
//! the entry's original position.
//!
//! A mash may also carry a default value or a default generator, consulted
//! by [`Mash::get_or_default`] for missing keys.

use crate::guard::{DefaultGenerator, EntryPredicate, ImmutableModificationError, MashOp, MashWrite, Outcome};
use crate::key::{CanonicalKey, KeyLike};
use core::fmt;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Fallback for missing keys.
#[derive(Clone)]
pub enum MashDefault<V> {
    /// A fixed value. Boxed, since `V` may itself contain a `Mash<V>`.
    Value(Box<V>),
    /// A generator called with the missing key.
    Generator(DefaultGenerator<V>),
}

impl<V: fmt::Debug> fmt::Debug for MashDefault<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MashDefault::Value(v) => f.debug_tuple("Value").field(v).finish(),
            MashDefault::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Mutable associative container with canonical keys.
#[derive(Clone)]
pub struct Mash<V> {
    keys: Vec<CanonicalKey>,
    values: Vec<V>,
    index: HashMap<CanonicalKey, usize>,
    default: Option<MashDefault<V>>,
}

impl<V> Mash<V> {
    /// Creates an empty mash.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty mash with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            default: None,
        }
    }

    /// Number of entries.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if there are no entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Stores `value` under the normalized `key`, returning the previous value.
    pub fn insert<K: KeyLike>(&mut self, key: K, value: V) -> Option<V> {
        self.insert_canonical(key.normalize(), value)
    }

    pub(crate) fn insert_canonical(&mut self, key: CanonicalKey, value: V) -> Option<V> {
        if let Some(&pos) = self.index.get(&key) {
            return Some(core::mem::replace(&mut self.values[pos], value));
        }
        self.index.insert(key.clone(), self.keys.len());
        self.keys.push(key);
        self.values.push(value);
        None
    }

    /// Returns the value stored under `key`.
    #[inline]
    pub fn get<K: KeyLike + ?Sized>(&self, key: &K) -> Option<&V> {
        self.get_canonical(&key.normalize())
    }

    #[inline]
    pub(crate) fn get_canonical(&self, key: &CanonicalKey) -> Option<&V> {
        self.index.get(key).map(|&pos| &self.values[pos])
    }

    /// Returns the value stored under `key`, mutably.
    pub fn get_mut<K: KeyLike + ?Sized>(&mut self, key: &K) -> Option<&mut V> {
        let pos = *self.index.get(&key.normalize())?;
        self.values.get_mut(pos)
    }

    /// Returns the stored value, or the default for missing keys.
    pub fn get_or_default<K: KeyLike + ?Sized>(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let key = key.normalize();
        if let Some(v) = self.get_canonical(&key) {
            return Some(v.clone());
        }
        match &self.default {
            Some(MashDefault::Value(v)) => Some((**v).clone()),
            Some(MashDefault::Generator(g)) => Some(g(&key)),
            None => None,
        }
    }

    /// True if `key` is present.
    #[inline]
    pub fn contains_key<K: KeyLike + ?Sized>(&self, key: &K) -> bool {
        self.index.contains_key(&key.normalize())
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove<K: KeyLike + ?Sized>(&mut self, key: &K) -> Option<V> {
        let pos = self.index.remove(&key.normalize())?;
        self.keys.remove(pos);
        let value = self.values.remove(pos);
        self.reindex_from(pos);
        Some(value)
    }

    /// Removes and returns the first entry.
    pub fn shift(&mut self) -> Option<(CanonicalKey, V)> {
        if self.keys.is_empty() {
            return None;
        }
        let key = self.keys.remove(0);
        let value = self.values.remove(0);
        self.index.remove(&key);
        self.reindex_from(0);
        Some((key, value))
    }

    /// Removes every entry. The default is kept.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
        self.index.clear();
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&CanonicalKey, &V) -> bool) {
        let keys = core::mem::take(&mut self.keys);
        let values = core::mem::take(&mut self.values);
        self.index.clear();
        for (k, v) in keys.into_iter().zip(values) {
            if keep(&k, &v) {
                self.insert_canonical(k, v);
            }
        }
    }

    /// Moves every entry of `other` into `self`, `other` winning on collisions.
    pub fn merge_in(&mut self, other: Mash<V>) {
        for (k, v) in other {
            self.insert_canonical(k, v);
        }
    }

    /// Sets a fixed default for missing keys.
    pub fn set_default(&mut self, value: V) {
        self.default = Some(MashDefault::Value(Box::new(value)));
    }

    /// Sets a default generator for missing keys.
    pub fn set_default_generator(&mut self, generator: DefaultGenerator<V>) {
        self.default = Some(MashDefault::Generator(generator));
    }

    /// The configured default, if any.
    pub fn default_value(&self) -> Option<&MashDefault<V>> {
        self.default.as_ref()
    }

    /// Entry at dense position `index`.
    pub fn get_index(&self, index: usize) -> Option<(&CanonicalKey, &V)> {
        Some((self.keys.get(index)?, self.values.get(index)?))
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, &V)> + '_ {
        self.keys.iter().zip(self.values.iter())
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &CanonicalKey> + '_ {
        self.keys.iter()
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.values.iter()
    }

    fn reindex_from(&mut self, start: usize) {
        for (pos, key) in self.keys.iter().enumerate().skip(start) {
            if let Some(slot) = self.index.get_mut(key) {
                *slot = pos;
            }
        }
    }

    /// Removes entries matching `pred`, reporting whether any were removed.
    fn remove_where(&mut self, pred: &mut EntryPredicate<'_, V>, remove_on: bool) -> bool {
        let before = self.len();
        self.retain(|k, v| pred(k, v) != remove_on);
        before != self.len()
    }
}

impl<V> Default for Mash<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for Mash<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Equality ignores insertion order and defaults.
impl<V: PartialEq<W>, W> PartialEq<Mash<W>> for Mash<V> {
    fn eq(&self, other: &Mash<W>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get_canonical(k).is_some_and(|w| v == w))
    }
}

impl<V> IntoIterator for Mash<V> {
    type Item = (CanonicalKey, V);
    type IntoIter = core::iter::Zip<std::vec::IntoIter<CanonicalKey>, std::vec::IntoIter<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter().zip(self.values)
    }
}

impl<K: KeyLike, V> FromIterator<(K, V)> for Mash<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mash = Mash::new();
        mash.extend(iter);
        mash
    }
}

impl<K: KeyLike, V> Extend<(K, V)> for Mash<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<V: Serialize> Serialize for Mash<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<V> MashWrite<V> for Mash<V> {
    fn apply(&mut self, op: MashOp<'_, V>) -> Result<Outcome<V>, ImmutableModificationError> {
        let outcome = match op {
            MashOp::Assign(key, value) => {
                self.insert_canonical(key, value);
                Outcome::Done
            }
            MashOp::Clear => {
                self.clear();
                Outcome::Done
            }
            MashOp::SetDefault(value) => {
                self.set_default(value);
                Outcome::Done
            }
            MashOp::SetDefaultGenerator(generator) => {
                self.set_default_generator(generator);
                Outcome::Done
            }
            MashOp::Delete(key) => Outcome::Removed(self.remove(&key)),
            MashOp::DeleteIf(mut pred) => {
                self.remove_where(&mut pred, true);
                Outcome::Done
            }
            MashOp::KeepIf(mut pred) => {
                self.remove_where(&mut pred, false);
                Outcome::Done
            }
            MashOp::Reject(mut pred) => Outcome::Changed(self.remove_where(&mut pred, true)),
            MashOp::Select(mut pred) => Outcome::Changed(self.remove_where(&mut pred, false)),
            MashOp::Merge(other) | MashOp::Update(other) => {
                self.merge_in(other);
                Outcome::Done
            }
            MashOp::Replace(other) => {
                self.clear();
                self.merge_in(other);
                Outcome::Done
            }
            MashOp::Shift => Outcome::RemovedEntry(self.shift()),
        };
        Ok(outcome)
    }
}
