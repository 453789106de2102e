use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};
use tracing::info;

use crate::config::{DatasetConfig, NegativeStrategy, OntologyFiles, PartitionSpec, SamplerConfig};
use crate::constants::files::{
    DEFAULT_ASSOCIATION_FILE, DEFAULT_CONCEPT_FILE, DEFAULT_DATASET_DIR,
    DEFAULT_DESCRIPTION_FILE, DEFAULT_ONTOLOGY_DIR,
};
use crate::constants::sampler::DEFAULT_SEED;
use crate::constants::tiers::DEFAULT_SPLIT_DISTANCE;
use crate::pipeline::{NegativePipeline, PartitionReport};
use crate::positives::{positives_from_labels, positives_from_substitutions};

#[derive(Debug, Parser)]
#[command(
    name = "create_datasets",
    disable_help_subcommand = true,
    about = "Build binary term-similarity datasets from an ontology release",
    long_about = "Extract positive term pairs from concept labels and concept substitutions, then add one generated negative pair per positive with each selected sampling strategy.",
    after_help = "Changing the split settings, strategies, or seed produces a different dataset. Set RUST_LOG=debug for per-source sampling detail."
)]
/// CLI for `create_datasets`.
///
/// Common usage:
/// - Full build with defaults: `create_datasets --ontology-dir ../SNOMED_files`
/// - Only one strategy: `--strategy random`
/// - Resample existing partitions: `--skip-positives --seed 7`
struct CreateDatasetsCli {
    #[arg(
        long = "ontology-dir",
        value_name = "PATH",
        default_value = DEFAULT_ONTOLOGY_DIR,
        help = "Folder containing the RF2 release files"
    )]
    ontology_dir: PathBuf,
    #[arg(
        long = "dataset-dir",
        value_name = "PATH",
        default_value = DEFAULT_DATASET_DIR,
        help = "Output folder for positive partitions and final datasets"
    )]
    dataset_dir: PathBuf,
    #[arg(
        long = "description-file",
        default_value = DEFAULT_DESCRIPTION_FILE,
        help = "Description history file name inside the ontology folder"
    )]
    description_file: String,
    #[arg(
        long = "concept-file",
        default_value = DEFAULT_CONCEPT_FILE,
        help = "Concept history file name inside the ontology folder"
    )]
    concept_file: String,
    #[arg(
        long = "association-file",
        default_value = DEFAULT_ASSOCIATION_FILE,
        help = "Association refset file name inside the ontology folder"
    )]
    association_file: String,
    #[arg(
        long = "no-easy-hard-split",
        help = "Keep each partition whole instead of splitting it into easy/hard tiers"
    )]
    no_easy_hard_split: bool,
    #[arg(
        long = "split-distance",
        default_value_t = DEFAULT_SPLIT_DISTANCE,
        help = "Max edit distance (inclusive) of an easy pair"
    )]
    split_distance: usize,
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        value_parser = parse_strategy_arg,
        help = "Negative sampling strategy (random or minimal-distance), repeat as needed in run order [default: minimal-distance, random]"
    )]
    strategies: Vec<NegativeStrategy>,
    #[arg(
        long,
        default_value_t = DEFAULT_SEED,
        help = "Deterministic seed for sampling and shuffling"
    )]
    seed: u64,
    #[arg(
        long = "skip-positives",
        help = "Only sample negatives for partitions already in the dataset folder"
    )]
    skip_positives: bool,
}

impl CreateDatasetsCli {
    fn into_config(self) -> DatasetConfig {
        let defaults = DatasetConfig::default();
        let easy_hard_split = !self.no_easy_hard_split;
        let split = easy_hard_split.then_some(self.split_distance);
        DatasetConfig {
            ontology_dir: self.ontology_dir,
            dataset_dir: self.dataset_dir,
            files: OntologyFiles {
                descriptions: self.description_file,
                concepts: self.concept_file,
                associations: self.association_file,
            },
            easy_hard_split,
            split_distance: self.split_distance,
            strategies: if self.strategies.is_empty() {
                defaults.strategies
            } else {
                self.strategies
            },
            partitions: PartitionSpec::ordered(split),
            sampler: SamplerConfig {
                seed: self.seed,
                ..SamplerConfig::default()
            },
        }
    }
}

/// Run the full dataset build: positive extraction, then negative sampling.
pub fn run_create_datasets<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let Some(cli) = parse_cli::<CreateDatasetsCli, _>(
        std::iter::once("create_datasets".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };
    let skip_positives = cli.skip_positives;
    let config = cli.into_config();
    config.validate()?;
    std::fs::create_dir_all(&config.dataset_dir)?;

    if skip_positives {
        info!("skipping positive extraction");
    } else {
        info!(
            ontology_dir = %config.ontology_dir.display(),
            "creating positive instances from concept labels"
        );
        positives_from_labels(&config)?;
        info!("creating positive instances from concept substitutions");
        positives_from_substitutions(&config)?;
    }

    info!("creating negative instances");
    let reports = NegativePipeline::new(&config)?.run()?;
    print_reports(&reports);
    Ok(())
}

fn print_reports(reports: &[PartitionReport]) {
    println!("=== datasets written ===");
    for report in reports {
        println!(
            "{:<18} {:<40} positives={:<8} negatives={:<8} mean_distance={:.2}",
            report.strategy.as_str(),
            report.partition,
            report.positives,
            report.negatives,
            report.statistics.summary.mean
        );
    }
}

fn parse_strategy_arg(raw: &str) -> Result<NegativeStrategy, String> {
    raw.parse::<NegativeStrategy>()
        .map_err(|err| err.to_string())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CreateDatasetsCli {
        parse_cli::<CreateDatasetsCli, _>(
            std::iter::once("create_datasets").chain(args.iter().copied()),
        )
        .unwrap()
        .unwrap()
    }

    #[test]
    fn defaults_match_dataset_config() {
        let config = parse(&[]).into_config();
        let defaults = DatasetConfig::default();
        assert_eq!(config.strategies, defaults.strategies);
        assert_eq!(config.partitions, defaults.partitions);
        assert_eq!(config.sampler.seed, DEFAULT_SEED);
        assert!(config.easy_hard_split);
        assert_eq!(config.dataset_dir, PathBuf::from(DEFAULT_DATASET_DIR));
    }

    #[test]
    fn repeated_strategies_keep_order_and_accept_legacy_names() {
        let config =
            parse(&["--strategy", "simple", "--strategy", "minimal-distance"]).into_config();
        assert_eq!(
            config.strategies,
            vec![NegativeStrategy::Random, NegativeStrategy::MinimalDistance]
        );
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let result =
            parse_cli::<CreateDatasetsCli, _>(["create_datasets", "--strategy", "closest"]);
        assert!(result.is_err());
    }

    #[test]
    fn split_flags_shape_partition_names() {
        let config = parse(&["--no-easy-hard-split"]).into_config();
        assert_eq!(config.partitions.len(), 5);
        assert_eq!(config.partitions[4].name, "SYN_SYN");

        let config = parse(&["--split-distance", "3"]).into_config();
        assert_eq!(config.partitions[0].name, "possibly_equivalent_to_easy_distance3");
    }

    #[test]
    fn help_returns_none() {
        let parsed = parse_cli::<CreateDatasetsCli, _>(["create_datasets", "--help"]).unwrap();
        assert!(parsed.is_none());
    }
}
