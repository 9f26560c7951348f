//! Read/write capability split for attribute containers.
//!
//! Write access is first of all a compile-time matter: the frozen containers
//! ([`ImmutableMash`](crate::ImmutableMash), [`ImmutableArray`](crate::ImmutableArray))
//! have no `&mut self` methods, while their mutable counterparts
//! ([`Mash`](crate::Mash), `Vec`) do.
//!
//! Call sites that must stay polymorphic over frozen and mutable containers go
//! through the write tables instead:
//! - [`MashOp`] / [`ArrayOp`] enumerate every write operation,
//! - [`MashWrite`] / [`ArrayWrite`] apply one to a container,
//! - the frozen implementations refuse every op with
//!   [`ImmutableModificationError`] before touching any state.
//!
//! The name tables ([`MASH_WRITES`], [`ARRAY_READS`], ...) classify operations
//! by name for callers that dispatch on strings.

use crate::collections::Mash;
use crate::key::CanonicalKey;
use core::cmp::Ordering;
use core::fmt;
use std::sync::Arc;

/// Whether an operation observes or changes a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Always permitted, never changes the container.
    Read,
    /// Permitted only on a mutable copy.
    Write,
}

/// The two container shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Associative container.
    Mash,
    /// Sequential container.
    Array,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Mash => f.write_str("mash"),
            ContainerKind::Array => f.write_str("array"),
        }
    }
}

/// Read operations of the associative container.
pub const MASH_READS: &[&str] = &[
    "[]", "fetch", "dig", "key?", "has_key?", "include?", "member?", "length", "size", "empty?",
    "each", "keys", "values", "merge", "select", "==", "to_hash", "dup", "to_json",
];

/// Write operations of the associative container.
pub const MASH_WRITES: &[&str] = &[
    "[]=", "clear", "default=", "default_proc=", "delete", "delete_if", "keep_if", "merge!",
    "update", "reject!", "replace", "select!", "shift",
];

/// Read operations of the sequential container.
pub const ARRAY_READS: &[&str] = &[
    "[]", "at", "slice", "first", "last", "length", "size", "empty?", "each", "include?", "uniq",
    "sort", "+", "==", "to_a", "dup", "to_json",
];

/// Write operations of the sequential container.
pub const ARRAY_WRITES: &[&str] = &[
    "[]=", "clear", "delete", "delete_if", "keep_if", "reject!", "select!", "replace", "shift",
    "<<", "unshift", "insert", "delete_at", "fill", "flatten!", "map!", "compact!", "pop", "push",
    "reverse!", "sort!", "sort_by!", "uniq!", "slice!", "concat",
];

/// Classifies the operation `name` on a container of kind `kind`.
///
/// Returns `None` for names the container does not expose.
pub fn classify(kind: ContainerKind, name: &str) -> Option<Access> {
    let (reads, writes) = match kind {
        ContainerKind::Mash => (MASH_READS, MASH_WRITES),
        ContainerKind::Array => (ARRAY_READS, ARRAY_WRITES),
    };
    if reads.contains(&name) {
        Some(Access::Read)
    } else if writes.contains(&name) {
        Some(Access::Write)
    } else {
        None
    }
}

/// Raised when a write operation reaches a frozen container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImmutableModificationError {
    operation: &'static str,
    container: ContainerKind,
}

impl ImmutableModificationError {
    /// Creates the error for `operation` on a frozen `container`.
    pub fn new(operation: &'static str, container: ContainerKind) -> Self {
        Self { operation, container }
    }

    /// Name of the refused operation.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Kind of container that refused it.
    pub fn container(&self) -> ContainerKind {
        self.container
    }
}

impl fmt::Display for ImmutableModificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot call `{}` on an immutable {}: attributes are read-only, \
             modify a mutable copy (dup_shallow or to_mutable_deep) instead",
            self.operation, self.container
        )
    }
}

impl std::error::Error for ImmutableModificationError {}

/// Builds the refusal for `operation`, logging it when tracing is enabled.
pub(crate) fn refuse(container: ContainerKind, operation: &'static str) -> ImmutableModificationError {
    #[cfg(feature = "tracing")]
    tracing::debug!(operation, %container, "refused write on immutable container");
    ImmutableModificationError::new(operation, container)
}

/// Entry predicate used by the conditional associative writes.
pub type EntryPredicate<'a, V> = Box<dyn FnMut(&CanonicalKey, &V) -> bool + 'a>;

/// Element predicate used by the conditional sequential writes.
pub type ElementPredicate<'a, V> = Box<dyn FnMut(&V) -> bool + 'a>;

/// Generator consulted for missing keys.
pub type DefaultGenerator<V> = Arc<dyn Fn(&CanonicalKey) -> V + Send + Sync>;

/// Every write operation of the associative container.
pub enum MashOp<'a, V> {
    /// Store `value` under `key`.
    Assign(CanonicalKey, V),
    /// Remove every entry.
    Clear,
    /// Value returned for missing keys.
    SetDefault(V),
    /// Generator called for missing keys.
    SetDefaultGenerator(DefaultGenerator<V>),
    /// Remove one entry.
    Delete(CanonicalKey),
    /// Remove entries matching the predicate.
    DeleteIf(EntryPredicate<'a, V>),
    /// Keep only entries matching the predicate.
    KeepIf(EntryPredicate<'a, V>),
    /// Merge another mash in, the other side winning.
    Merge(Mash<V>),
    /// Same as [`MashOp::Merge`].
    Update(Mash<V>),
    /// Like `DeleteIf`, reporting whether anything changed.
    Reject(EntryPredicate<'a, V>),
    /// Replace all entries.
    Replace(Mash<V>),
    /// Like `KeepIf`, reporting whether anything changed.
    Select(EntryPredicate<'a, V>),
    /// Remove the first entry.
    Shift,
}

impl<V> MashOp<'_, V> {
    /// Operation name as listed in [`MASH_WRITES`].
    pub fn name(&self) -> &'static str {
        match self {
            MashOp::Assign(..) => "[]=",
            MashOp::Clear => "clear",
            MashOp::SetDefault(_) => "default=",
            MashOp::SetDefaultGenerator(_) => "default_proc=",
            MashOp::Delete(_) => "delete",
            MashOp::DeleteIf(_) => "delete_if",
            MashOp::KeepIf(_) => "keep_if",
            MashOp::Merge(_) => "merge!",
            MashOp::Update(_) => "update",
            MashOp::Reject(_) => "reject!",
            MashOp::Replace(_) => "replace",
            MashOp::Select(_) => "select!",
            MashOp::Shift => "shift",
        }
    }
}

impl<V> fmt::Debug for MashOp<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MashOp").field(&self.name()).finish()
    }
}

/// Every write operation of the sequential container.
pub enum ArrayOp<'a, V> {
    /// Store `value` at `index`, padding with nulls past the end.
    Assign(usize, V),
    /// Remove every element.
    Clear,
    /// Remove every element equal to the given one.
    Delete(V),
    /// Remove elements matching the predicate.
    DeleteIf(ElementPredicate<'a, V>),
    /// Keep only elements matching the predicate.
    KeepIf(ElementPredicate<'a, V>),
    /// Like `DeleteIf`, reporting whether anything changed.
    Reject(ElementPredicate<'a, V>),
    /// Like `KeepIf`, reporting whether anything changed.
    Select(ElementPredicate<'a, V>),
    /// Replace all elements.
    Replace(Vec<V>),
    /// Remove the first element.
    Shift,
    /// Append one element.
    Append(V),
    /// Prepend elements, keeping their order.
    Prepend(Vec<V>),
    /// Insert elements before `index`, padding with nulls past the end.
    Insert(usize, Vec<V>),
    /// Remove the element at `index`.
    DeleteAt(usize),
    /// Overwrite every element.
    Fill(V),
    /// Splice nested sequences into their parent, recursively.
    Flatten,
    /// Replace every element with the closure's result.
    Map(Box<dyn FnMut(&V) -> V + 'a>),
    /// Remove null elements.
    Compact,
    /// Remove the last element.
    Pop,
    /// Append elements.
    Push(Vec<V>),
    /// Reverse element order.
    Reverse,
    /// Sort elements.
    Sort,
    /// Sort elements with a comparator.
    SortBy(Box<dyn FnMut(&V, &V) -> Ordering + 'a>),
    /// Remove duplicates, keeping first occurrences.
    Uniq,
    /// Remove `len` elements starting at `start`.
    SliceRemove(usize, usize),
    /// Append every element of another sequence.
    Concat(Vec<V>),
}

impl<V> ArrayOp<'_, V> {
    /// Operation name as listed in [`ARRAY_WRITES`].
    pub fn name(&self) -> &'static str {
        match self {
            ArrayOp::Assign(..) => "[]=",
            ArrayOp::Clear => "clear",
            ArrayOp::Delete(_) => "delete",
            ArrayOp::DeleteIf(_) => "delete_if",
            ArrayOp::KeepIf(_) => "keep_if",
            ArrayOp::Reject(_) => "reject!",
            ArrayOp::Select(_) => "select!",
            ArrayOp::Replace(_) => "replace",
            ArrayOp::Shift => "shift",
            ArrayOp::Append(_) => "<<",
            ArrayOp::Prepend(_) => "unshift",
            ArrayOp::Insert(..) => "insert",
            ArrayOp::DeleteAt(_) => "delete_at",
            ArrayOp::Fill(_) => "fill",
            ArrayOp::Flatten => "flatten!",
            ArrayOp::Map(_) => "map!",
            ArrayOp::Compact => "compact!",
            ArrayOp::Pop => "pop",
            ArrayOp::Push(_) => "push",
            ArrayOp::Reverse => "reverse!",
            ArrayOp::Sort => "sort!",
            ArrayOp::SortBy(_) => "sort_by!",
            ArrayOp::Uniq => "uniq!",
            ArrayOp::SliceRemove(..) => "slice!",
            ArrayOp::Concat(_) => "concat",
        }
    }
}

impl<V> fmt::Debug for ArrayOp<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArrayOp").field(&self.name()).finish()
    }
}

/// What a successfully applied write reports back.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<V> {
    /// Applied; nothing to report.
    Done,
    /// Applied; whether any element or entry changed.
    Changed(bool),
    /// Applied; the removed value, if any.
    Removed(Option<V>),
    /// Applied; the removed entry, if any.
    RemovedEntry(Option<(CanonicalKey, V)>),
    /// Applied; the removed run of elements, absent when out of range.
    RemovedMany(Option<Vec<V>>),
}

/// A container that accepts associative write operations.
pub trait MashWrite<V> {
    /// Applies `op`.
    ///
    /// # Errors
    /// Frozen containers return [`ImmutableModificationError`] for every op and
    /// are left untouched.
    fn apply(&mut self, op: MashOp<'_, V>) -> Result<Outcome<V>, ImmutableModificationError>;

    /// Shorthand for [`MashOp::Assign`].
    ///
    /// # Errors
    /// See [`MashWrite::apply`].
    fn store(&mut self, key: CanonicalKey, value: V) -> Result<(), ImmutableModificationError> {
        self.apply(MashOp::Assign(key, value)).map(|_| ())
    }

    /// Shorthand for [`MashOp::Delete`].
    ///
    /// # Errors
    /// See [`MashWrite::apply`].
    fn delete(&mut self, key: CanonicalKey) -> Result<Option<V>, ImmutableModificationError> {
        match self.apply(MashOp::Delete(key))? {
            Outcome::Removed(v) => Ok(v),
            _ => Ok(None),
        }
    }
}

/// A container that accepts sequential write operations.
pub trait ArrayWrite<V> {
    /// Applies `op`.
    ///
    /// # Errors
    /// Frozen containers return [`ImmutableModificationError`] for every op and
    /// are left untouched.
    fn apply(&mut self, op: ArrayOp<'_, V>) -> Result<Outcome<V>, ImmutableModificationError>;

    /// Shorthand for [`ArrayOp::Push`] with one element.
    ///
    /// # Errors
    /// See [`ArrayWrite::apply`].
    fn push_value(&mut self, value: V) -> Result<(), ImmutableModificationError> {
        self.apply(ArrayOp::Push(vec![value])).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_tables_are_disjoint() {
        for name in MASH_WRITES {
            assert!(!MASH_READS.contains(name), "{name} is both read and write");
        }
        for name in ARRAY_WRITES {
            assert!(!ARRAY_READS.contains(name), "{name} is both read and write");
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(ContainerKind::Mash, "delete"), Some(Access::Write));
        assert_eq!(classify(ContainerKind::Mash, "fetch"), Some(Access::Read));
        assert_eq!(classify(ContainerKind::Array, "slice"), Some(Access::Read));
        assert_eq!(classify(ContainerKind::Array, "slice!"), Some(Access::Write));
        assert_eq!(classify(ContainerKind::Array, "frobnicate"), None);
    }

    #[test]
    fn test_op_names_are_classified_as_writes() {
        let ops: Vec<MashOp<'_, Value>> = vec![
            MashOp::Clear,
            MashOp::Shift,
            MashOp::Delete(CanonicalKey::Int(0)),
            MashOp::SetDefault(Value::NULL),
        ];
        for op in &ops {
            assert_eq!(classify(ContainerKind::Mash, op.name()), Some(Access::Write));
        }
        let ops: Vec<ArrayOp<'_, Value>> = vec![ArrayOp::Pop, ArrayOp::Sort, ArrayOp::SliceRemove(0, 1)];
        for op in &ops {
            assert_eq!(classify(ContainerKind::Array, op.name()), Some(Access::Write));
        }
    }

    #[test]
    fn test_error_message_names_operation() {
        let err = ImmutableModificationError::new("delete", ContainerKind::Mash);
        assert_eq!(err.operation(), "delete");
        assert_eq!(err.container(), ContainerKind::Mash);
        assert!(err.to_string().contains("`delete` on an immutable mash"));
    }
}
