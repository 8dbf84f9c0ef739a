//! The memoization-level lattice.
//!
//! Four values ordered `Never < Unmemoized < Conditional < Memoized`. `join`
//! is the lattice max: commutative, associative, idempotent.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemoizationLevel {
    /// Primitive/comparable by identity; never worth memoizing.
    Never,
    /// Not comparable by identity, but not worth memoizing unless forced.
    Unmemoized,
    /// Memoize iff any dependency (or a forcing parent) is memoized.
    Conditional,
    /// Always memoize when reachable from a return.
    Memoized,
}

impl MemoizationLevel {
    /// Lattice max. `derive(PartialOrd, Ord)` already gives us the
    /// `Never < Unmemoized < Conditional < Memoized` order from declaration
    /// order, so join is just `max`.
    pub fn join(self, other: MemoizationLevel) -> MemoizationLevel {
        self.max(other)
    }
}

impl Default for MemoizationLevel {
    fn default() -> Self {
        MemoizationLevel::Never
    }
}
