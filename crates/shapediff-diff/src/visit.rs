//! Cycle guard shared by both engines.
//!
//! Value graphs may be cyclic. Before descending into a pair of non-nil
//! pointers, slices or maps, an engine records the pair of cell addresses;
//! reaching the same pair again means the comparison is already in progress
//! further up the stack and the pair is treated as equal.

use std::collections::HashSet;
use std::hash::Hash;

use shapediff_value::Value;

/// An unordered pair of cell addresses. `(a, b)` and `(b, a)` are the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairKey {
    lower: usize,
    higher: usize,
}

impl PairKey {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            lower: a.min(b),
            higher: a.max(b),
        }
    }

    /// The key for two values, if both are non-nil pointers, slices or maps.
    pub fn of(a: &Value, b: &Value) -> Option<Self> {
        Some(Self::new(a.cell_addr()?, b.cell_addr()?))
    }
}

/// Set of pairs already entered during one comparison.
#[derive(Debug)]
pub struct VisitGuard<K> {
    seen: HashSet<K>,
}

impl<K: Eq + Hash> VisitGuard<K> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Record `key`. Returns `false` if it was already recorded.
    pub fn first_visit(&mut self, key: K) -> bool {
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl<K: Eq + Hash> Default for VisitGuard<K> {
    fn default() -> Self {
        Self::new()
    }
}
