use rand::seq::SliceRandom;

use crate::errors::DatasetError;
use crate::metrics::{DistanceSummary, StatisticsRecord};
use crate::pairs::TermPair;
use crate::rng::DeterministicRng;
use crate::sampler::NegativeSample;

/// Binary similarity label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PairLabel {
    /// Terms denote the same concept (`1`).
    Positive,
    /// Terms are treated as different concepts (`0`).
    Negative,
}

impl PairLabel {
    /// Numeric label written to dataset files.
    pub fn as_score(&self) -> u8 {
        match self {
            Self::Positive => 1,
            Self::Negative => 0,
        }
    }
}

/// A term pair plus its label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabeledInstance {
    pub pair: TermPair,
    pub label: PairLabel,
}

/// Shuffled positives and negatives of one partition for one strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabeledDataset {
    pub instances: Vec<LabeledInstance>,
}

impl LabeledDataset {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn count(&self, label: PairLabel) -> usize {
        self.instances
            .iter()
            .filter(|instance| instance.label == label)
            .count()
    }
}

/// Merge positives (label 1) and negatives (label 0) and shuffle them
/// deterministically from `seed`.
pub fn assemble(positives: &[TermPair], negatives: &NegativeSample, seed: u64) -> LabeledDataset {
    let mut instances: Vec<LabeledInstance> = positives
        .iter()
        .cloned()
        .map(|pair| LabeledInstance {
            pair,
            label: PairLabel::Positive,
        })
        .chain(negatives.pairs.iter().cloned().map(|pair| LabeledInstance {
            pair,
            label: PairLabel::Negative,
        }))
        .collect();
    let mut rng = DeterministicRng::new(seed);
    instances.shuffle(&mut rng);
    LabeledDataset { instances }
}

/// Statistics block for a freshly sampled partition.
pub fn statistics_for(
    dataset_name: impl Into<String>,
    positive_count: usize,
    negatives: &NegativeSample,
) -> Result<StatisticsRecord, DatasetError> {
    let dataset_name = dataset_name.into();
    let summary = DistanceSummary::from_distances(&negatives.distances).ok_or_else(|| {
        DatasetError::InvariantViolation(format!(
            "no negatives were generated for '{dataset_name}'"
        ))
    })?;
    Ok(StatisticsRecord {
        dataset_name,
        positive_count,
        summary,
    })
}
