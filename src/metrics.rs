use std::fmt;

use crate::constants::statistics::{
    MAX_LABEL, MEAN_LABEL, MEDIAN_LABEL, MIN_LABEL, POSITIVE_COUNT_LABEL,
};
use crate::types::Distance;

/// Aggregate edit-distance statistics over a set of generated negatives.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: Distance,
    pub max: Distance,
}

impl DistanceSummary {
    /// Summarize distances; `None` for an empty slice.
    /// The median of an even-sized slice is the mean of the two middle values.
    pub fn from_distances(distances: &[Distance]) -> Option<Self> {
        if distances.is_empty() {
            return None;
        }
        let mut sorted = distances.to_vec();
        sorted.sort_unstable();
        let count = sorted.len();
        let total: usize = sorted.iter().sum();
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
        } else {
            sorted[mid] as f64
        };
        Some(Self {
            count,
            mean: total as f64 / count as f64,
            median,
            min: sorted[0],
            max: sorted[count - 1],
        })
    }
}

/// One block of the negative-sampling statistics report.
#[derive(Clone, Debug, PartialEq)]
pub struct StatisticsRecord {
    /// Dataset name (partition plus strategy).
    pub dataset_name: String,
    /// Number of positive instances in the partition.
    pub positive_count: usize,
    /// Distance summary of the generated negatives.
    pub summary: DistanceSummary,
}

impl fmt::Display for StatisticsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.dataset_name)?;
        writeln!(f, "{POSITIVE_COUNT_LABEL}: {}", self.positive_count)?;
        writeln!(f, "{MEAN_LABEL}: {}", format_stat(self.summary.mean))?;
        writeln!(f, "{MEDIAN_LABEL}: {}", format_stat(self.summary.median))?;
        writeln!(f, "{MAX_LABEL}: {}", self.summary.max)?;
        writeln!(f, "{MIN_LABEL}: {}", self.summary.min)?;
        writeln!(f)
    }
}

/// Whole numbers print without a fractional part; others with up to 4 decimals.
fn format_stat(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let formatted = format!("{value:.4}");
        formatted.trim_end_matches('0').to_string()
    }
}
