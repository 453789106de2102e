//! Removal of exact and reverse duplicate term pairs.
//!
//! Each unordered pair is kept once, in the orientation and position of its
//! first occurrence. Identity is case-insensitive (see [`PairKey`]).

use indexmap::IndexMap;

use crate::pairs::{PairKey, TermPair, fold};

/// Counts of rows removed by [`dedup_pairs_with_report`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DedupReport {
    /// Rows in the input.
    pub input: usize,
    /// Rows identical (same orientation) to an earlier row.
    pub exact_duplicates: usize,
    /// Rows that are the reverse of an earlier row.
    pub reverse_duplicates: usize,
}

impl DedupReport {
    /// Rows kept.
    pub fn kept(&self) -> usize {
        self.input - self.exact_duplicates - self.reverse_duplicates
    }
}

/// Drop exact and reverse duplicates, keeping first occurrences in order.
pub fn dedup_pairs<I>(pairs: I) -> Vec<TermPair>
where
    I: IntoIterator<Item = TermPair>,
{
    dedup_pairs_with_report(pairs).0
}

/// Same as [`dedup_pairs`] but also reports what was removed.
pub fn dedup_pairs_with_report<I>(pairs: I) -> (Vec<TermPair>, DedupReport)
where
    I: IntoIterator<Item = TermPair>,
{
    let mut report = DedupReport::default();
    let mut kept: IndexMap<PairKey, TermPair> = IndexMap::new();
    for pair in pairs {
        report.input += 1;
        let key = pair.key();
        match kept.get(&key) {
            None => {
                kept.insert(key, pair);
            }
            Some(existing) if same_orientation(existing, &pair) => {
                report.exact_duplicates += 1;
            }
            Some(_) => {
                report.reverse_duplicates += 1;
            }
        }
    }
    (kept.into_values().collect(), report)
}

fn same_orientation(existing: &TermPair, candidate: &TermPair) -> bool {
    fold(&existing.source) == fold(&candidate.source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pair(a: &str, b: &str) -> TermPair {
        TermPair::new(a, b).unwrap()
    }

    #[test]
    fn removes_exact_and_reverse_duplicates() {
        let input = vec![
            pair("a", "b"),
            pair("b", "a"),
            pair("a", "b"),
            pair("c", "d"),
            pair("d", "c"),
            pair("e", "f"),
        ];
        let (kept, report) = dedup_pairs_with_report(input);
        assert_eq!(kept, vec![pair("a", "b"), pair("c", "d"), pair("e", "f")]);
        assert_eq!(report.input, 6);
        assert_eq!(report.exact_duplicates, 1);
        assert_eq!(report.reverse_duplicates, 2);
        assert_eq!(report.kept(), 3);
    }

    #[test]
    fn case_variants_collapse_into_first_occurrence() {
        let kept = dedup_pairs(vec![pair("Fever", "Pyrexia"), pair("pyrexia", "FEVER")]);
        assert_eq!(kept, vec![pair("Fever", "Pyrexia")]);
    }

    #[test]
    fn dedup_is_idempotent_and_never_keeps_both_orientations() {
        let input: Vec<TermPair> = (0..40)
            .map(|i| {
                let a = format!("t{}", i % 7);
                let b = format!("t{}", (i * 3 + 1) % 7);
                (a, b)
            })
            .filter_map(|(a, b)| TermPair::new(a, b))
            .collect();
        let once = dedup_pairs(input.clone());
        let twice = dedup_pairs(once.clone());
        assert_eq!(once, twice);
        assert!(once.len() <= input.len());

        let oriented: HashSet<(String, String)> = once
            .iter()
            .map(|p| (p.source.clone(), p.target.clone()))
            .collect();
        for p in &once {
            assert!(!oriented.contains(&(p.target.clone(), p.source.clone())));
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let (kept, report) = dedup_pairs_with_report(Vec::new());
        assert!(kept.is_empty());
        assert_eq!(report, DedupReport::default());
    }
}
