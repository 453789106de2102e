use std::collections::HashSet;

use crate::pairs::{PairKey, TermPair};

/// Unordered, case-insensitive set of term pairs.
///
/// Used both as the cross-partition positive corpus and as the running set of
/// negatives already generated in a strategy run.
#[derive(Clone, Debug, Default)]
pub struct PairIndex {
    keys: HashSet<PairKey>,
}

impl PairIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from any pair collection.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = &'a TermPair>,
    {
        let mut index = Self::new();
        index.extend(pairs);
        index
    }

    /// Insert a pair; returns `false` when it (or its reverse) was already present.
    pub fn insert(&mut self, pair: &TermPair) -> bool {
        self.keys.insert(pair.key())
    }

    pub fn extend<'a, I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = &'a TermPair>,
    {
        for pair in pairs {
            self.insert(pair);
        }
    }

    /// Union of two indexes.
    pub fn merged(&self, other: &PairIndex) -> PairIndex {
        let mut keys = self.keys.clone();
        keys.extend(other.keys.iter().cloned());
        PairIndex { keys }
    }

    /// True if `(a, b)` or `(b, a)` is present, ignoring case.
    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.keys.contains(&PairKey::new(a, b))
    }

    pub fn contains_pair(&self, pair: &TermPair) -> bool {
        self.keys.contains(&pair.key())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
