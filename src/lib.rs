#![doc = include_str!("../README.md")]

/// Command-line driver for the dataset build.
pub mod app;
/// Labeling, shuffling, and statistics for finished partitions.
pub mod assembler;
/// Dataset build configuration types.
pub mod config;
/// Centralized constants used across extraction, sampling, and transport.
pub mod constants;
/// Exclusion index over unordered term pairs.
pub mod corpus;
/// Removal of exact and reverse duplicate pairs.
pub mod dedup;
/// Edit distance and easy/hard tiering.
pub mod distance;
/// Distance statistics and the statistics report.
pub mod metrics;
/// RF2 release tables and ontology codes.
pub mod ontology;
/// Term pair data model.
pub mod pairs;
/// Cross-partition negative sampling driver.
pub mod pipeline;
/// Positive pair extraction from an ontology release.
pub mod positives;
mod rng;
/// Negative pair generation strategies.
pub mod sampler;
/// Table readers and writers.
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use assembler::{LabeledDataset, LabeledInstance, PairLabel, assemble};
pub use config::{
    DatasetConfig, NegativeStrategy, OntologyFiles, PartitionFamily, PartitionSpec,
    SamplerConfig,
};
pub use corpus::PairIndex;
pub use dedup::{DedupReport, dedup_pairs};
pub use distance::{DifficultyTier, levenshtein, term_distance};
pub use errors::DatasetError;
pub use metrics::{DistanceSummary, StatisticsRecord};
pub use ontology::OntologyCode;
pub use pairs::{PairKey, TermPair};
pub use pipeline::{NegativeAccumulator, NegativePipeline, PartitionReport};
pub use sampler::{NegativeSample, NegativeSampler};
pub use types::{ComponentId, Distance, FoldedTerm, PartitionName, PathString, Term};
