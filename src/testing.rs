//! Proptest strategies for attribute trees.
//!
//! Available to this crate's tests and, with the `proptest` feature, to
//! downstream crates that want to property-test code consuming frozen trees.
//! Generated trees are acyclic and contain no NaN, so they compare equal to
//! themselves.

use crate::collections::Mash;
use crate::key::Symbol;
use crate::value::{Scalar, Value};
use proptest::prelude::*;

/// Leaves of every kind except opaque objects.
pub fn arb_scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        Just(Scalar::Null),
        any::<bool>().prop_map(Scalar::Bool),
        any::<i64>().prop_map(Scalar::Int),
        (-1.0e6..1.0e6_f64).prop_map(Scalar::Float),
        "[a-z ]{0,8}".prop_map(Scalar::from),
        "[a-z]{1,6}".prop_map(|s| Scalar::Sym(Symbol::new(s))),
    ]
}

/// Text keys.
pub fn arb_key() -> impl Strategy<Value = String> {
    "[a-z_]{1,8}"
}

/// Nested trees up to four levels deep.
pub fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_map(Value::Scalar).prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|entries| Value::Map(entries.into_iter().collect())),
        ]
    })
}

/// Associative roots.
pub fn arb_mash() -> impl Strategy<Value = Mash<Value>> {
    prop::collection::vec((arb_key(), arb_value()), 0..8).prop_map(|entries| entries.into_iter().collect())
}

/// Sequential roots.
pub fn arb_array() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_value(), 0..8)
}
