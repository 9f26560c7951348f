//! `ImmutableArray`: the frozen sequential container.

use crate::convert::{thaw_array, Freeze};
use crate::guard::{refuse, ArrayOp, ArrayWrite, ContainerKind, ImmutableModificationError, Outcome};
use crate::value::{Element, Node, Value};
use crate::FreezeError;
use core::fmt;
use core::ops::{Bound, RangeBounds};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Frozen sequential container.
///
/// Elements are frozen at construction and the element list can never change.
/// Every read that produces a sub-sequence (slicing, [`uniq`](Self::uniq),
/// [`sorted`](Self::sorted), [`concat`](Self::concat)) returns a fresh `Vec`
/// holding the same frozen nodes.
#[derive(Clone)]
pub struct ImmutableArray {
    items: Arc<[Node]>,
}

impl ImmutableArray {
    /// Freezes `input`, which must be sequential.
    ///
    /// # Errors
    /// Returns [`FreezeError::NotSequential`] if `input` freezes to a mash or a scalar.
    pub fn new<T: Freeze>(input: T) -> Result<Self, FreezeError> {
        match input.freeze() {
            Node::Array(a) => Ok(a),
            Node::Mash(_) => Err(FreezeError::NotSequential("mash")),
            Node::Scalar(_) => Err(FreezeError::NotSequential("scalar")),
        }
    }

    /// Freezes every element of `items`.
    pub fn from_vec<V: Freeze>(items: Vec<V>) -> Self {
        items.into_iter().map(Freeze::freeze).collect()
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if there are no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[Node] {
        &self.items
    }

    /// Element at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    /// Element at `index`, counting from the end when negative.
    pub fn at(&self, index: isize) -> Option<&Node> {
        let index = if index < 0 {
            self.len().checked_sub(index.unsigned_abs())?
        } else {
            index.unsigned_abs()
        };
        self.get(index)
    }

    /// Up to `len` elements starting at `start`.
    ///
    /// `start == len()` yields an empty sequence; `start > len()` yields `None`.
    pub fn slice(&self, start: usize, len: usize) -> Option<Vec<Node>> {
        self.range(start..start.saturating_add(len))
    }

    /// Elements in `range`, with the end clamped to the array.
    ///
    /// Returns `None` when the range starts past the end.
    pub fn range<R: RangeBounds<usize>>(&self, range: R) -> Option<Vec<Node>> {
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        if start > self.len() {
            return None;
        }
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => self.len(),
        }
        .clamp(start, self.len());
        Some(self.items[start..end].to_vec())
    }

    /// First element.
    #[inline]
    pub fn first(&self) -> Option<&Node> {
        self.items.first()
    }

    /// Last element.
    #[inline]
    pub fn last(&self) -> Option<&Node> {
        self.items.last()
    }

    /// True if any element equals `value`.
    pub fn contains<T: ?Sized>(&self, value: &T) -> bool
    where
        Node: PartialEq<T>,
    {
        self.iter().any(|n| n == value)
    }

    /// Elements in order.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Node> {
        self.items.iter()
    }

    /// Parallel iterator over the elements.
    #[cfg(feature = "parallel")]
    pub fn par_iter(&self) -> rayon::slice::Iter<'_, Node> {
        use rayon::prelude::*;
        self.items.par_iter()
    }

    /// A new sequence without duplicates, keeping first occurrences.
    pub fn uniq(&self) -> Vec<Node> {
        let mut out: Vec<Node> = Vec::with_capacity(self.len());
        for item in self.iter() {
            if !out.contains(item) {
                out.push(item.clone());
            }
        }
        out
    }

    /// A new sequence with the elements sorted.
    pub fn sorted(&self) -> Vec<Node> {
        let mut out = self.dup_shallow();
        out.sort_by(Element::sort_cmp);
        out
    }

    /// A new sequence holding these elements followed by `other`'s.
    pub fn concat(&self, other: &[Node]) -> Vec<Node> {
        let mut out = Vec::with_capacity(self.len() + other.len());
        out.extend_from_slice(&self.items);
        out.extend_from_slice(other);
        out
    }

    /// Thaws the whole tree into ordinary mutable containers.
    pub fn to_mutable_deep(&self) -> Vec<Value> {
        thaw_array(self)
    }

    /// Copies the element list into a writable `Vec` sharing the same nodes.
    pub fn dup_shallow(&self) -> Vec<Node> {
        self.items.to_vec()
    }

    /// True if both handles share the same storage.
    #[inline]
    pub fn ptr_eq(&self, other: &ImmutableArray) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    /// Converts to a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for ImmutableArray {
    fn default() -> Self {
        Self {
            items: Arc::from(Vec::new()),
        }
    }
}

impl fmt::Debug for ImmutableArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<Node> for ImmutableArray {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let items: Vec<Node> = iter.into_iter().collect();
        #[cfg(feature = "tracing")]
        tracing::trace!(elements = items.len(), "froze array");
        Self { items: items.into() }
    }
}

impl<'a> IntoIterator for &'a ImmutableArray {
    type Item = &'a Node;
    type IntoIter = core::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for ImmutableArray {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.items[..] == other.items[..]
    }
}

impl PartialEq<[Value]> for ImmutableArray {
    fn eq(&self, other: &[Value]) -> bool {
        self.items[..] == *other
    }
}

impl PartialEq<Vec<Value>> for ImmutableArray {
    fn eq(&self, other: &Vec<Value>) -> bool {
        *self == other[..]
    }
}

impl PartialEq<[Node]> for ImmutableArray {
    fn eq(&self, other: &[Node]) -> bool {
        self.items[..] == *other
    }
}

impl PartialEq<Vec<Node>> for ImmutableArray {
    fn eq(&self, other: &Vec<Node>) -> bool {
        *self == other[..]
    }
}

impl PartialEq<ImmutableArray> for Vec<Value> {
    fn eq(&self, other: &ImmutableArray) -> bool {
        other == self
    }
}

impl Serialize for ImmutableArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ImmutableArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ImmutableArray::new(Value::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

/// Every write is refused before any state is touched.
impl ArrayWrite<Node> for ImmutableArray {
    fn apply(&mut self, op: ArrayOp<'_, Node>) -> Result<Outcome<Node>, ImmutableModificationError> {
        Err(refuse(ContainerKind::Array, op.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn letters() -> ImmutableArray {
        ImmutableArray::new(json!(["a", "b", "c", "d"])).unwrap()
    }

    #[test]
    fn test_slice_by_start_and_length() {
        let array = letters();
        let middle = array.slice(1, 2).unwrap();
        assert_eq!(middle.iter().filter_map(Node::as_str).collect::<Vec<_>>(), ["b", "c"]);
        assert_eq!(array.slice(3, 10).map(|s| s.len()), Some(1));
        assert_eq!(array.slice(4, 1), Some(Vec::new()));
        assert_eq!(array.slice(5, 1), None);
    }

    #[test]
    fn test_range_reads() {
        let array = letters();
        assert_eq!(array.range(..2).map(|s| s.len()), Some(2));
        assert_eq!(array.range(2..).map(|s| s.len()), Some(2));
        assert_eq!(array.range(1..=1).map(|s| s.len()), Some(1));
        assert_eq!(array.range(3..1), Some(Vec::new()));
        assert_eq!(array.range(9..), None);
    }

    #[test]
    fn test_negative_index() {
        let array = letters();
        assert_eq!(array.at(-1), array.last());
        assert_eq!(array.at(-4), array.first());
        assert_eq!(array.at(-5), None);
        assert_eq!(array.at(1).and_then(Node::as_str), Some("b"));
    }

    #[test]
    fn test_uniq_leaves_source_alone() {
        let array = ImmutableArray::new(json!(["foo", "bar", "foo", "baz", "bar"])).unwrap();
        let unique = array.uniq();
        let expected = ImmutableArray::new(json!(["foo", "bar", "baz"])).unwrap();
        assert_eq!(ImmutableArray::from_vec(unique), expected);
        assert_eq!(array.len(), 5);
    }

    #[test]
    fn test_uniq_compares_structures() {
        let array = ImmutableArray::new(json!([{"a": 1}, {"a": 1}, [1], [1], {"a": 2}])).unwrap();
        assert_eq!(array.uniq().len(), 3);
    }

    #[test]
    fn test_sorted_and_concat() {
        let array = ImmutableArray::new(json!([3, 1, 2])).unwrap();
        let sorted = array.sorted();
        assert_eq!(sorted.iter().filter_map(Node::as_i64).collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(array.first().and_then(Node::as_i64), Some(3));
        assert_eq!(array.concat(&sorted).len(), 6);
        assert!(array.contains(&2_i64));
        assert!(!array.contains(&7_i64));
    }

    #[test]
    fn test_writes_are_refused() {
        let mut array = letters();
        for op in [ArrayOp::Pop, ArrayOp::Sort, ArrayOp::Clear, ArrayOp::Append(Node::NULL)] {
            let name = op.name();
            let err = array.apply(op).unwrap_err();
            assert_eq!(err.operation(), name);
            assert_eq!(err.container(), ContainerKind::Array);
        }
        assert!(array.push_value(Node::NULL).is_err());
        assert_eq!(array.len(), 4);
    }

    #[test]
    fn test_equality_with_plain_sequences() {
        let array = letters();
        let plain: Vec<Value> = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        assert_eq!(array, plain);
        assert_eq!(plain, array);
        assert_eq!(array, array.dup_shallow());
    }
}
