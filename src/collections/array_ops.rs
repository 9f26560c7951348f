//! Sequential write operations on ordinary vectors.
//!
//! `Vec<Value>` (deep copies) and `Vec<Node>` (shallow copies) both accept the
//! full [`ArrayOp`] table, so code written against [`ArrayWrite`] runs over a
//! frozen array or a writable copy of it.

use crate::guard::{ArrayOp, ArrayWrite, ImmutableModificationError, Outcome};
use crate::value::Element;

fn pad_to<V: Element>(items: &mut Vec<V>, len: usize) {
    if items.len() < len {
        items.resize_with(len, V::null);
    }
}

fn flatten_into<V: Element>(items: Vec<V>, out: &mut Vec<V>) -> bool {
    let mut nested = false;
    for item in items {
        match item.into_items() {
            Ok(inner) => {
                nested = true;
                flatten_into(inner, out);
            }
            Err(leaf) => out.push(leaf),
        }
    }
    nested
}

fn retain_counting<V>(items: &mut Vec<V>, keep: impl FnMut(&V) -> bool) -> bool {
    let before = items.len();
    items.retain(keep);
    before != items.len()
}

impl<V: Element> ArrayWrite<V> for Vec<V> {
    fn apply(&mut self, op: ArrayOp<'_, V>) -> Result<Outcome<V>, ImmutableModificationError> {
        let outcome = match op {
            ArrayOp::Assign(index, value) => {
                if index < self.len() {
                    self[index] = value;
                } else {
                    pad_to(self, index);
                    self.push(value);
                }
                Outcome::Done
            }
            ArrayOp::Clear => {
                self.clear();
                Outcome::Done
            }
            ArrayOp::Delete(value) => {
                let removed = retain_counting(self, |x| *x != value);
                Outcome::Removed(removed.then_some(value))
            }
            ArrayOp::DeleteIf(mut pred) => {
                self.retain(|x| !pred(x));
                Outcome::Done
            }
            ArrayOp::KeepIf(mut pred) => {
                self.retain(|x| pred(x));
                Outcome::Done
            }
            ArrayOp::Reject(mut pred) => Outcome::Changed(retain_counting(self, |x| !pred(x))),
            ArrayOp::Select(mut pred) => Outcome::Changed(retain_counting(self, |x| pred(x))),
            ArrayOp::Replace(items) => {
                *self = items;
                Outcome::Done
            }
            ArrayOp::Shift => Outcome::Removed((!self.is_empty()).then(|| self.remove(0))),
            ArrayOp::Append(value) => {
                self.push(value);
                Outcome::Done
            }
            ArrayOp::Prepend(items) => {
                self.splice(0..0, items);
                Outcome::Done
            }
            ArrayOp::Insert(index, items) => {
                pad_to(self, index);
                self.splice(index..index, items);
                Outcome::Done
            }
            ArrayOp::DeleteAt(index) => Outcome::Removed((index < self.len()).then(|| self.remove(index))),
            ArrayOp::Fill(value) => {
                for slot in self.iter_mut() {
                    slot.clone_from(&value);
                }
                Outcome::Done
            }
            ArrayOp::Flatten => {
                let items = core::mem::take(self);
                let mut out = Vec::with_capacity(items.len());
                let changed = flatten_into(items, &mut out);
                *self = out;
                Outcome::Changed(changed)
            }
            ArrayOp::Map(mut f) => {
                for slot in self.iter_mut() {
                    *slot = f(slot);
                }
                Outcome::Done
            }
            ArrayOp::Compact => Outcome::Changed(retain_counting(self, |x| !x.is_null())),
            ArrayOp::Pop => Outcome::Removed(self.pop()),
            ArrayOp::Push(items) | ArrayOp::Concat(items) => {
                self.extend(items);
                Outcome::Done
            }
            ArrayOp::Reverse => {
                self.reverse();
                Outcome::Done
            }
            ArrayOp::Sort => {
                self.sort_by(Element::sort_cmp);
                Outcome::Done
            }
            ArrayOp::SortBy(mut cmp) => {
                self.sort_by(|a, b| cmp(a, b));
                Outcome::Done
            }
            ArrayOp::Uniq => {
                let items = core::mem::take(self);
                let before = items.len();
                for item in items {
                    if !self.contains(&item) {
                        self.push(item);
                    }
                }
                Outcome::Changed(before != self.len())
            }
            ArrayOp::SliceRemove(start, len) => {
                if start > self.len() {
                    Outcome::RemovedMany(None)
                } else {
                    let end = start.saturating_add(len).min(self.len());
                    Outcome::RemovedMany(Some(self.drain(start..end).collect()))
                }
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&i| Value::from(i)).collect()
    }

    #[test]
    fn test_assign_and_insert_pad_with_nulls() {
        let mut items = ints(&[1]);
        items.apply(ArrayOp::Assign(3, Value::from(4))).unwrap();
        assert_eq!(items, vec![Value::from(1), Value::NULL, Value::NULL, Value::from(4)]);
        let mut items = ints(&[1]);
        items.apply(ArrayOp::Insert(2, ints(&[9]))).unwrap();
        assert_eq!(items, vec![Value::from(1), Value::NULL, Value::from(9)]);
    }

    #[test]
    fn test_removal_ops_report_what_they_removed() {
        let mut items = ints(&[1, 2, 3, 2]);
        assert_eq!(items.apply(ArrayOp::Delete(Value::from(2))), Ok(Outcome::Removed(Some(Value::from(2)))));
        assert_eq!(items, ints(&[1, 3]));
        assert_eq!(items.apply(ArrayOp::Delete(Value::from(7))), Ok(Outcome::Removed(None)));
        assert_eq!(items.apply(ArrayOp::Shift), Ok(Outcome::Removed(Some(Value::from(1)))));
        assert_eq!(items.apply(ArrayOp::DeleteAt(5)), Ok(Outcome::Removed(None)));
        assert_eq!(items.apply(ArrayOp::Pop), Ok(Outcome::Removed(Some(Value::from(3)))));
        assert_eq!(items.apply(ArrayOp::Pop), Ok(Outcome::Removed(None)));
    }

    #[test]
    fn test_slice_removal() {
        let mut items = ints(&[0, 1, 2, 3, 4]);
        assert_eq!(items.apply(ArrayOp::SliceRemove(1, 2)), Ok(Outcome::RemovedMany(Some(ints(&[1, 2])))));
        assert_eq!(items, ints(&[0, 3, 4]));
        assert_eq!(items.apply(ArrayOp::SliceRemove(9, 1)), Ok(Outcome::RemovedMany(None)));
    }

    #[test]
    fn test_flatten_compact_uniq() {
        let mut items = vec![Value::from(1), Value::from(vec![Value::from(2), Value::from(vec![3])]), Value::NULL];
        assert_eq!(items.apply(ArrayOp::Flatten), Ok(Outcome::Changed(true)));
        assert_eq!(items, vec![Value::from(1), Value::from(2), Value::from(3), Value::NULL]);
        assert_eq!(items.apply(ArrayOp::Flatten), Ok(Outcome::Changed(false)));
        assert_eq!(items.apply(ArrayOp::Compact), Ok(Outcome::Changed(true)));
        items.apply(ArrayOp::Push(ints(&[1, 2]))).unwrap();
        assert_eq!(items.apply(ArrayOp::Uniq), Ok(Outcome::Changed(true)));
        assert_eq!(items, ints(&[1, 2, 3]));
    }

    #[test]
    fn test_ordering_ops() {
        let mut items = ints(&[3, 1, 2]);
        items.apply(ArrayOp::Sort).unwrap();
        assert_eq!(items, ints(&[1, 2, 3]));
        items.apply(ArrayOp::Reverse).unwrap();
        assert_eq!(items, ints(&[3, 2, 1]));
        items.apply(ArrayOp::SortBy(Box::new(|a: &Value, b: &Value| a.as_i64().cmp(&b.as_i64())))).unwrap();
        assert_eq!(items, ints(&[1, 2, 3]));
        items.apply(ArrayOp::Map(Box::new(|v: &Value| Value::from(v.as_i64().unwrap_or(0) * 10)))).unwrap();
        assert_eq!(items, ints(&[10, 20, 30]));
        items.apply(ArrayOp::Fill(Value::from("x"))).unwrap();
        assert!(items.iter().all(|v| *v == "x"));
    }

    #[test]
    fn test_conditional_ops() {
        let mut items = ints(&[1, 2, 3, 4]);
        assert_eq!(items.apply(ArrayOp::Reject(Box::new(|v: &Value| v.as_i64() == Some(9)))), Ok(Outcome::Changed(false)));
        items.apply(ArrayOp::DeleteIf(Box::new(|v: &Value| v.as_i64() == Some(1)))).unwrap();
        items.apply(ArrayOp::KeepIf(Box::new(|v: &Value| v.as_i64() != Some(4)))).unwrap();
        assert_eq!(items, ints(&[2, 3]));
        assert_eq!(items.apply(ArrayOp::Select(Box::new(|v: &Value| v.as_i64() == Some(2)))), Ok(Outcome::Changed(true)));
        items.apply(ArrayOp::Prepend(ints(&[0]))).unwrap();
        items.apply(ArrayOp::Append(Value::from(5))).unwrap();
        assert_eq!(items, ints(&[0, 2, 5]));
        items.apply(ArrayOp::Replace(Vec::new())).unwrap();
        assert!(items.is_empty());
    }
}
