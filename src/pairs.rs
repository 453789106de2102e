use crate::distance::term_distance;
use crate::types::{Distance, FoldedTerm, Term};

/// Case-fold a term for identity comparisons.
pub fn fold(term: &str) -> FoldedTerm {
    term.to_lowercase()
}

/// True when two terms differ only in casing.
pub fn same_term(a: &str, b: &str) -> bool {
    a == b || fold(a) == fold(b)
}

/// A pair of distinct terms. Orientation is kept for output but ignored for identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TermPair {
    pub source: Term,
    pub target: Term,
}

impl TermPair {
    /// Build a pair, refusing terms that are case-insensitively identical.
    pub fn new(source: impl Into<Term>, target: impl Into<Term>) -> Option<Self> {
        let source = source.into();
        let target = target.into();
        if same_term(&source, &target) {
            return None;
        }
        Some(Self { source, target })
    }

    /// Canonical unordered, case-folded identity of this pair.
    pub fn key(&self) -> PairKey {
        PairKey::new(&self.source, &self.target)
    }

    /// Same pair with source and target swapped.
    pub fn reversed(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }

    /// Case-insensitive edit distance between the two terms.
    pub fn distance(&self) -> Distance {
        term_distance(&self.source, &self.target)
    }

    /// False for degenerate pairs that slipped past `new` (e.g. deserialized rows).
    pub fn is_valid(&self) -> bool {
        !same_term(&self.source, &self.target)
    }
}

/// Order-independent, case-insensitive identity of a term pair.
///
/// `PairKey::new(a, b) == PairKey::new(b, a)` and casing never matters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: FoldedTerm,
    high: FoldedTerm,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let a = fold(a);
        let b = fold(b);
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn terms(&self) -> (&str, &str) {
        (&self.low, &self.high)
    }
}
