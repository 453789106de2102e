//! Edit distance between terms and the easy/hard difficulty split built on it.

use crate::types::Distance;

/// Levenshtein distance over Unicode scalar values (unit-cost insert, delete, substitute).
pub fn levenshtein(a: &str, b: &str) -> Distance {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single rolling row; `prev` holds the value diagonally up-left.
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev + usize::from(ca != cb);
            prev = row[j + 1];
            row[j + 1] = substitution.min(prev + 1).min(row[j] + 1);
        }
    }
    row[b.len()]
}

/// Case-insensitive edit distance. Every comparison between terms goes through this.
pub fn term_distance(a: &str, b: &str) -> Distance {
    levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Difficulty tier of a positive pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DifficultyTier {
    /// Lexically close pair (`distance <= split_distance`).
    Easy,
    /// Lexically distant pair.
    Hard,
}

impl DifficultyTier {
    /// Classify a distance against the configured split threshold.
    pub fn classify(distance: Distance, split_distance: Distance) -> Self {
        if distance <= split_distance {
            Self::Easy
        } else {
            Self::Hard
        }
    }

    /// Tier name as used in partition file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Hard => "hard",
        }
    }
}
