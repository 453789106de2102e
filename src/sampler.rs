//! Negative pair generation.
//!
//! Two strategies turn one partition of positive pairs into an equally sized
//! set of negative pairs:
//!
//! - [`NegativeStrategy::Random`] pairs each source term with a uniformly drawn
//!   term from the partition.
//! - [`NegativeStrategy::MinimalDistance`] pairs each source term with the
//!   lexically closest terms that are neither its synonyms nor paired with one
//!   of its synonyms anywhere else in the partition.
//!
//! Both strategies reject pairs already present in the positive corpus, in
//! the negatives of earlier partitions, or earlier in the same call. The RNG is
//! reseeded from [`SamplerConfig::seed`] on every call.

use std::collections::{BTreeMap, HashSet, VecDeque};

use indexmap::IndexMap;
use rand::Rng;
use tracing::debug;

use crate::config::{NegativeStrategy, SamplerConfig};
use crate::corpus::PairIndex;
use crate::distance::term_distance;
use crate::errors::DatasetError;
use crate::pairs::{TermPair, fold, same_term};
use crate::rng::DeterministicRng;
use crate::types::{Distance, FoldedTerm};

/// Negatives generated for one partition, with the edit distance of each pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NegativeSample {
    pub pairs: Vec<TermPair>,
    pub distances: Vec<Distance>,
}

impl NegativeSample {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn push(&mut self, pair: TermPair, distance: Distance) {
        self.pairs.push(pair);
        self.distances.push(distance);
    }
}

/// Generates negative pairs for positive partitions.
#[derive(Clone, Debug, Default)]
pub struct NegativeSampler {
    config: SamplerConfig,
}

/// Pairs a candidate must not form with its source during one call.
struct Exclusions<'a> {
    corpus: &'a PairIndex,
    prior_negatives: &'a PairIndex,
    own_positives: PairIndex,
    generated: PairIndex,
}

impl Exclusions<'_> {
    fn rejects(&self, source: &str, candidate: &str) -> bool {
        same_term(source, candidate)
            || self.corpus.contains(source, candidate)
            || self.prior_negatives.contains(source, candidate)
            || self.own_positives.contains(source, candidate)
            || self.generated.contains(source, candidate)
    }
}

impl NegativeSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Generate one negative pair per positive pair.
    ///
    /// The result never contains a pair (in either orientation, ignoring case)
    /// found in `corpus`, `prior_negatives`, or `positives`, never repeats a pair,
    /// and never pairs a term with itself.
    pub fn sample(
        &self,
        strategy: NegativeStrategy,
        positives: &[TermPair],
        corpus: &PairIndex,
        prior_negatives: &PairIndex,
    ) -> Result<NegativeSample, DatasetError> {
        if positives.is_empty() {
            return Err(DatasetError::InvariantViolation(
                "negative sampling requires at least one positive pair".to_string(),
            ));
        }
        if let Some((idx, pair)) = positives
            .iter()
            .enumerate()
            .find(|(_, pair)| !pair.is_valid())
        {
            return Err(DatasetError::InvariantViolation(format!(
                "positive pair #{idx} pairs '{}' with itself ('{}')",
                pair.source, pair.target
            )));
        }

        let mut exclusions = Exclusions {
            corpus,
            prior_negatives,
            own_positives: PairIndex::from_pairs(positives),
            generated: PairIndex::new(),
        };
        let mut rng = DeterministicRng::new(self.config.seed);
        let sample = match strategy {
            NegativeStrategy::Random => self.sample_random(positives, &mut exclusions, &mut rng)?,
            NegativeStrategy::MinimalDistance => {
                sample_minimal_distance(positives, &mut exclusions, &mut rng)?
            }
        };
        debug!(
            strategy = %strategy,
            positives = positives.len(),
            negatives = sample.len(),
            "negative sampling finished"
        );
        Ok(sample)
    }

    fn sample_random(
        &self,
        positives: &[TermPair],
        exclusions: &mut Exclusions<'_>,
        rng: &mut DeterministicRng,
    ) -> Result<NegativeSample, DatasetError> {
        let mut sample = NegativeSample::default();
        for (row_idx, positive) in positives.iter().enumerate() {
            let source = &positive.source;
            let mut target = None;
            for _ in 0..self.config.random_draw_limit {
                let drawn_idx = rng.random_range(0..positives.len());
                let drawn = &positives[drawn_idx];
                let candidate = if rng.random_bool(0.5) {
                    &drawn.source
                } else {
                    &drawn.target
                };
                if drawn_idx == row_idx || exclusions.rejects(source, candidate) {
                    continue;
                }
                target = Some(candidate.clone());
                break;
            }
            let Some(target) = target else {
                return Err(DatasetError::Exhausted {
                    source_term: source.clone(),
                    requested: positives.len(),
                    produced: sample.len(),
                });
            };
            let pair = TermPair {
                source: source.clone(),
                target,
            };
            exclusions.generated.insert(&pair);
            let distance = pair.distance();
            sample.push(pair, distance);
        }
        Ok(sample)
    }
}

fn sample_minimal_distance(
    positives: &[TermPair],
    exclusions: &mut Exclusions<'_>,
    rng: &mut DeterministicRng,
) -> Result<NegativeSample, DatasetError> {
    let mut sample = NegativeSample::default();
    // Sources chosen as partners of a term, keyed by that (folded) term.
    let mut paired_with: IndexMap<FoldedTerm, Vec<FoldedTerm>> = IndexMap::new();
    let folded_rows = fold_rows(positives);

    for (source, rows) in group_by_source(positives) {
        let requested = rows.len();
        let mut candidates = usable_candidates(source, &rows, &folded_rows);
        if let Some(already) = paired_with.get(&fold(source)) {
            candidates.retain(|term| !already.contains(&fold(term)));
        }
        let mut tiers = DistanceTiers::new(source, candidates);
        debug!(
            source,
            synonyms = requested,
            candidates = tiers.remaining(),
            "selecting minimal-distance negatives"
        );

        for produced in 0..requested {
            let (target, distance) = loop {
                let Some((term, distance)) = tiers.pick(rng) else {
                    return Err(DatasetError::Exhausted {
                        source_term: source.to_string(),
                        requested,
                        produced,
                    });
                };
                if !exclusions.rejects(source, term) {
                    break (term, distance);
                }
            };
            let pair = TermPair {
                source: source.to_string(),
                target: target.to_string(),
            };
            exclusions.generated.insert(&pair);
            paired_with
                .entry(fold(target))
                .or_default()
                .push(fold(source));
            sample.push(pair, distance);
        }
    }
    Ok(sample)
}

/// Row indices of each distinct source term, in sorted source order.
fn group_by_source(positives: &[TermPair]) -> BTreeMap<&str, Vec<usize>> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, pair) in positives.iter().enumerate() {
        groups.entry(pair.source.as_str()).or_default().push(idx);
    }
    groups
}

/// A positive row with both terms case-folded.
struct FoldedRow<'a> {
    pair: &'a TermPair,
    source: FoldedTerm,
    target: FoldedTerm,
}

fn fold_rows(positives: &[TermPair]) -> Vec<FoldedRow<'_>> {
    positives
        .iter()
        .map(|pair| FoldedRow {
            pair,
            source: fold(&pair.source),
            target: fold(&pair.target),
        })
        .collect()
}

/// Terms that may be paired with `source` as a negative.
///
/// Excludes the source, its synonyms (targets of its rows), every term paired
/// with one of those in another row, and every term of a row that contains
/// such a paired term. The closure is a single hop over "shares a synonym".
fn usable_candidates<'a>(
    source: &str,
    group_rows: &[usize],
    rows: &[FoldedRow<'a>],
) -> Vec<&'a str> {
    let in_group: HashSet<usize> = group_rows.iter().copied().collect();
    let mut synonyms: HashSet<&str> = group_rows
        .iter()
        .map(|idx| rows[*idx].target.as_str())
        .collect();
    let folded_source = fold(source);
    synonyms.insert(folded_source.as_str());

    let outside: Vec<&FoldedRow<'a>> = rows
        .iter()
        .enumerate()
        .filter(|(idx, _)| !in_group.contains(idx))
        .map(|(_, row)| row)
        .collect();

    let mut linked: HashSet<&str> = HashSet::new();
    for row in &outside {
        if synonyms.contains(row.target.as_str()) {
            linked.insert(row.source.as_str());
        }
        if synonyms.contains(row.source.as_str()) {
            linked.insert(row.target.as_str());
        }
    }

    let usable_rows: Vec<&FoldedRow<'a>> = outside
        .into_iter()
        .filter(|row| {
            !linked.contains(row.source.as_str()) && !linked.contains(row.target.as_str())
        })
        .collect();

    // Sources first, then targets; first spelling of each folded term wins.
    let mut unique: IndexMap<&str, &'a str> = IndexMap::new();
    for (folded, term) in usable_rows
        .iter()
        .map(|row| (row.source.as_str(), row.pair.source.as_str()))
        .chain(
            usable_rows
                .iter()
                .map(|row| (row.target.as_str(), row.pair.target.as_str())),
        )
    {
        if synonyms.contains(folded) {
            continue;
        }
        unique.entry(folded).or_insert(term);
    }
    unique.into_values().collect()
}

/// Candidates grouped into ascending edit-distance tiers.
///
/// Picks come uniformly from the lowest non-empty tier; the next tier is only
/// opened once the current one is used up.
struct DistanceTiers<'a> {
    sorted: VecDeque<(&'a str, Distance)>,
    current: Vec<(&'a str, Distance)>,
}

impl<'a> DistanceTiers<'a> {
    /// Drops candidates at distance zero (case-only variants of the source).
    fn new(source: &str, candidates: Vec<&'a str>) -> Self {
        let mut scored: Vec<(&'a str, Distance)> = candidates
            .into_iter()
            .map(|term| (term, term_distance(term, source)))
            .filter(|(_, distance)| *distance > 0)
            .collect();
        scored.sort_by_key(|(_, distance)| *distance);
        Self {
            sorted: scored.into(),
            current: Vec::new(),
        }
    }

    fn remaining(&self) -> usize {
        self.sorted.len() + self.current.len()
    }

    fn pick(&mut self, rng: &mut DeterministicRng) -> Option<(&'a str, Distance)> {
        if self.current.is_empty() {
            let (_, min_distance) = *self.sorted.front()?;
            while let Some(&(term, distance)) = self.sorted.front() {
                if distance != min_distance {
                    break;
                }
                self.current.push((term, distance));
                self.sorted.pop_front();
            }
        }
        let idx = rng.random_range(0..self.current.len());
        Some(self.current.remove(idx))
    }
}

/// Case-folded terms appearing in a set of pairs.
pub fn vocabulary(pairs: &[TermPair]) -> HashSet<FoldedTerm> {
    pairs
        .iter()
        .flat_map(|pair| [fold(&pair.source), fold(&pair.target)])
        .collect()
}
