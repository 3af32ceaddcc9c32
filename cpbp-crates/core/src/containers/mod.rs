//! Containers used throughout the engine.
mod keyed_vec;
mod sparse_set;

use fnv::FnvBuildHasher;
pub use keyed_vec::*;
pub(crate) use sparse_set::*;

/// [`std::collections::HashMap`] that defaults to a deterministic hasher.
pub type HashMap<K, V, Hasher = FnvBuildHasher> = std::collections::HashMap<K, V, Hasher>;

/// [`std::collections::HashSet`] that defaults to a deterministic hasher.
pub type HashSet<K, Hasher = FnvBuildHasher> = std::collections::HashSet<K, Hasher>;
