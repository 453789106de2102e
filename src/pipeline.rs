//! Cross-partition negative sampling.
//!
//! Partitions are processed strictly in configured order. For every strategy a
//! fresh [`NegativeAccumulator`] tracks the negatives generated so far, and each
//! partition is sampled against the positive corpus plus the accumulator's
//! current exclusion pool.

use std::fs;
use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::assembler::{assemble, statistics_for};
use crate::config::{DatasetConfig, NegativeStrategy, PartitionFamily, PartitionSpec};
use crate::corpus::PairIndex;
use crate::errors::DatasetError;
use crate::metrics::StatisticsRecord;
use crate::pairs::TermPair;
use crate::sampler::{NegativeSampler, vocabulary};
use crate::transport::tsv::{
    append_statistics, dataset_path, partition_path, read_pair_table, statistics_path,
    write_labeled_dataset,
};
use crate::types::PartitionName;

/// Negatives generated during one strategy run, pooled by partition family.
///
/// - substitution partitions: `substitution += new`, then `to_consider = substitution`
/// - preferred-to-alternative partitions: `to_consider += new`
/// - synonym partitions: `synonym += new`, then `to_consider = substitution ∪ synonym`
#[derive(Clone, Debug, Default)]
pub struct NegativeAccumulator {
    substitution: PairIndex,
    synonym: PairIndex,
    to_consider: PairIndex,
}

impl NegativeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prior negatives the next partition must avoid.
    pub fn to_consider(&self) -> &PairIndex {
        &self.to_consider
    }

    /// Fold the negatives of a finished partition into the pools.
    pub fn record(&mut self, family: PartitionFamily, negatives: &[TermPair]) {
        match family {
            PartitionFamily::Substitution => {
                self.substitution.extend(negatives);
                self.to_consider = self.substitution.clone();
            }
            PartitionFamily::PreferredToAlternative => {
                self.to_consider.extend(negatives);
            }
            PartitionFamily::Synonym => {
                self.synonym.extend(negatives);
                self.to_consider = self.substitution.merged(&self.synonym);
            }
        }
    }
}

/// Outcome of sampling one partition with one strategy.
#[derive(Clone, Debug)]
pub struct PartitionReport {
    pub partition: PartitionName,
    pub strategy: NegativeStrategy,
    pub positives: usize,
    pub negatives: usize,
    /// Labeled dataset written for this partition.
    pub output: PathBuf,
    pub statistics: StatisticsRecord,
}

/// Drives negative sampling over every configured partition and strategy.
pub struct NegativePipeline {
    dataset_dir: PathBuf,
    partitions: Vec<PartitionSpec>,
    strategies: Vec<NegativeStrategy>,
    sampler: NegativeSampler,
    loaded: Option<LoadedPartitions>,
}

/// Positive tables read from disk plus the corpus built from them.
struct LoadedPartitions {
    tables: IndexMap<PartitionName, Vec<TermPair>>,
    corpus: PairIndex,
}

impl NegativePipeline {
    pub fn new(config: &DatasetConfig) -> Result<Self, DatasetError> {
        config.validate()?;
        Ok(Self {
            dataset_dir: config.dataset_dir.clone(),
            partitions: config.partitions.clone(),
            strategies: config.strategies.clone(),
            sampler: NegativeSampler::new(config.sampler.clone()),
            loaded: None,
        })
    }

    /// Run every strategy over every partition, writing datasets and statistics.
    ///
    /// Each strategy's statistics report is recreated from scratch.
    pub fn run(&mut self) -> Result<Vec<PartitionReport>, DatasetError> {
        let loaded = match self.loaded.take() {
            Some(loaded) => loaded,
            None => self.load()?,
        };
        let result = self.run_strategies(&loaded);
        self.loaded = Some(loaded);
        result
    }

    /// Positive corpus over every loaded partition whose family contributes to it.
    pub fn corpus(&mut self) -> Result<&PairIndex, DatasetError> {
        let loaded = match self.loaded.take() {
            Some(loaded) => loaded,
            None => self.load()?,
        };
        Ok(&self.loaded.insert(loaded).corpus)
    }

    fn run_strategies(
        &self,
        loaded: &LoadedPartitions,
    ) -> Result<Vec<PartitionReport>, DatasetError> {
        let mut reports = Vec::with_capacity(self.strategies.len() * self.partitions.len());
        for strategy in &self.strategies {
            let stats_path = statistics_path(&self.dataset_dir, *strategy);
            if stats_path.exists() {
                fs::remove_file(&stats_path)?;
            }
            info!(strategy = %strategy, "starting negative sampling run");

            let mut accumulator = NegativeAccumulator::new();
            for spec in &self.partitions {
                let positives = loaded
                    .tables
                    .get(&spec.name)
                    .ok_or_else(|| DatasetError::UnknownPartition(spec.name.clone()))?;
                let report = self.process_partition(
                    *strategy,
                    spec,
                    positives,
                    &loaded.corpus,
                    &mut accumulator,
                )?;
                reports.push(report);
            }
        }
        Ok(reports)
    }

    fn load(&self) -> Result<LoadedPartitions, DatasetError> {
        let mut tables = IndexMap::with_capacity(self.partitions.len());
        let mut corpus = PairIndex::new();
        for spec in &self.partitions {
            let path = partition_path(&self.dataset_dir, &spec.name);
            let pairs = read_pair_table(&path)?;
            if pairs.is_empty() {
                return Err(DatasetError::EmptyPartition(spec.name.clone()));
            }
            if spec.family.contributes_to_corpus() {
                corpus.extend(&pairs);
            }
            debug!(
                partition = %spec.name,
                rows = pairs.len(),
                path = %path.display(),
                "loaded positive partition"
            );
            tables.insert(spec.name.clone(), pairs);
        }
        info!(
            partitions = tables.len(),
            corpus_pairs = corpus.len(),
            "positive corpus ready"
        );
        Ok(LoadedPartitions { tables, corpus })
    }

    fn process_partition(
        &self,
        strategy: NegativeStrategy,
        spec: &PartitionSpec,
        positives: &[TermPair],
        corpus: &PairIndex,
        accumulator: &mut NegativeAccumulator,
    ) -> Result<PartitionReport, DatasetError> {
        info!(
            partition = %spec.name,
            strategy = %strategy,
            positives = positives.len(),
            vocabulary = vocabulary(positives).len(),
            prior_negatives = accumulator.to_consider().len(),
            "sampling negatives"
        );
        let negatives = self
            .sampler
            .sample(strategy, positives, corpus, accumulator.to_consider())?;

        let dataset = assemble(positives, &negatives, self.sampler.config().seed);
        let output = dataset_path(&self.dataset_dir, &spec.name, strategy);
        write_labeled_dataset(&output, &dataset)?;

        let dataset_name = output
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| spec.name.clone());
        let statistics = statistics_for(dataset_name, positives.len(), &negatives)?;
        append_statistics(&statistics_path(&self.dataset_dir, strategy), &statistics)?;

        accumulator.record(spec.family, &negatives.pairs);
        info!(
            partition = %spec.name,
            strategy = %strategy,
            negatives = negatives.len(),
            mean_distance = statistics.summary.mean,
            output = %output.display(),
            "wrote labeled dataset"
        );

        Ok(PartitionReport {
            partition: spec.name.clone(),
            strategy,
            positives: positives.len(),
            negatives: negatives.len(),
            output,
            statistics,
        })
    }
}
