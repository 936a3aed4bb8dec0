#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod algebra;

/// The read-only capability shared by map representations.
pub mod associative;

/// Errors reported by fallible operations.
pub mod error;

/// A single-owner HashMap using Robin Hood hashing.
///
/// This module provides `LinearMap`, which wraps the `HashTable` with key
/// semantics and offers the map interface and the bulk set algebra.
pub mod hash_map;

/// A single-owner hash set built on `LinearMap`.
pub mod hash_set;

pub mod hash_table;

/// Pluggable hashing and equality semantics for keys.
pub mod key_hasher;

pub use associative::AssociativeMap;
pub use error::Error;
pub use error::Result;
pub use hash_map::LinearMap;
pub use hash_set::LinearSet;
pub use hash_table::HashTable;
pub use hash_table::MAX_CAPACITY;
pub use key_hasher::FnHasher;
pub use key_hasher::KeyHasher;
pub use key_hasher::Standard;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by maps created without an explicit one.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by maps created without an explicit one.
        pub type DefaultHashBuilder = std::collections::hash_map::RandomState;
    } else {
        compile_error!("either the `foldhash` or the `std` feature must be enabled");
    }
}
