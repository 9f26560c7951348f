//! # `immutable-mash` - Read-only Attribute Trees
//!
//! Frozen, deeply immutable views over nested attribute data: maps of
//! scalars, nested maps and nested arrays, as produced by an attribute merge.
//! Once a tree is frozen, nothing reachable from its root can change.
//!
//! ## Guarantees
//!
//! ### Deep Immutability
//! - **Recursive freeze**: construction converts every nested map into an
//!   [`ImmutableMash`] and every nested array into an [`ImmutableArray`].
//!   No mutable container is reachable from a frozen root.
//! - **No write surface**: the frozen containers have no `&mut self` methods.
//!   Illegal writes are compile errors.
//! - **Dynamic refusal**: code that is polymorphic over frozen and mutable
//!   containers goes through [`MashWrite`] / [`ArrayWrite`]; the frozen side
//!   refuses every op with [`ImmutableModificationError`] before touching state.
//!
//! ### Key Normalization
//! - Text keys and symbol keys name the same entry: `"port"` and
//!   `Symbol::new("port")` both normalize to one [`CanonicalKey`].
//! - Normalization applies on construction and on every lookup.
//! - Colliding keys resolve deterministically: the last write wins.
//!
//! ### Concurrency
//! - Frozen trees are `Send + Sync` and hold no interior mutability, so any
//!   number of threads may read one without coordination.
//! - Copies ([`ImmutableMash::dup_shallow`], [`ImmutableMash::to_mutable_deep`])
//!   allocate fresh top-level storage and never write through to the source.
//!
//! ## Architecture
//!
//! 1. **Keys** ([`key`]): [`Symbol`], [`CanonicalKey`], and the [`KeyLike`] normalizer.
//! 2. **Values** ([`value`]): [`Scalar`] leaves, the mutable [`Value`] tree and the
//!    frozen [`Node`] tree.
//! 3. **Conversion** ([`convert`]): [`freeze`] and [`thaw`].
//! 4. **Guard** ([`guard`]): read/write classification, op tables, the error.
//! 5. **Collections** ([`collections`]): [`Mash`], [`ImmutableMash`], [`ImmutableArray`].
//!
//! ## Example
//!
//! ```rust
//! use immutable_mash::{freeze, sym, ImmutableMash, MashWrite, Node};
//! use serde_json::json;
//!
//! let attrs = ImmutableMash::new(json!({"nginx": {"port": 80, "sites": ["a", "b"]}})).unwrap();
//!
//! // Text and symbol keys address the same entry.
//! assert_eq!(attrs.dig(["nginx", "port"]), attrs.get(&sym("nginx")).and_then(|n| n.get("port")));
//!
//! // Nested containers are frozen too.
//! assert!(matches!(attrs.dig(["nginx", "sites"]), Some(Node::Array(_))));
//!
//! // Writes through the dynamic surface are refused.
//! let mut handle = attrs.clone();
//! assert!(handle.delete("nginx".into()).is_err());
//!
//! // A shallow copy is writable at the top level.
//! let mut copy = attrs.dup_shallow();
//! copy.insert("extra", freeze(1));
//! assert_eq!(copy.len(), 2);
//! assert_eq!(attrs.len(), 1);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod collections;
pub mod convert;
pub mod guard;
pub mod key;
#[cfg(any(test, feature = "proptest"))]
pub mod testing;
pub mod value;

pub use collections::{ImmutableArray, ImmutableMash, Mash, MashDefault};
pub use convert::{freeze, thaw, Freeze, FreezeError};
pub use guard::{
    classify, Access, ArrayOp, ArrayWrite, ContainerKind, ImmutableModificationError, MashOp, MashWrite, Outcome,
};
pub use key::{normalize, sym, CanonicalKey, KeyLike, Symbol};
pub use value::{Element, Node, Opaque, Scalar, Value};

// Frozen trees are shared across threads without coordination.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<Node>();
    assert_send_sync::<ImmutableMash>();
    assert_send_sync::<ImmutableArray>();
    assert_send_sync::<Value>();
};
