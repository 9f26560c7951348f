//! Attribute containers.
//!
//! Containers come in frozen/mutable pairs:
//! - `mash`: [`Mash`], the mutable key-normalizing ordered map
//! - `immutable_mash`: [`ImmutableMash`], its frozen counterpart
//! - `immutable_array`: [`ImmutableArray`], the frozen counterpart of `Vec`
//! - `array_ops`: the sequential write table applied to plain `Vec`s

pub mod array_ops;
pub mod immutable_array;
pub mod immutable_mash;
pub mod mash;

pub use immutable_array::ImmutableArray;
pub use immutable_mash::ImmutableMash;
pub use mash::{Mash, MashDefault};
