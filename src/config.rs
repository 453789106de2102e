use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::files::{
    DEFAULT_ASSOCIATION_FILE, DEFAULT_CONCEPT_FILE, DEFAULT_DATASET_DIR,
    DEFAULT_DESCRIPTION_FILE, DEFAULT_ONTOLOGY_DIR,
};
use crate::constants::partitions::{
    BASE_ORDER, FSN_SYN, POSSIBLY_EQUIVALENT_TO, REPLACED_BY, SAME_AS, SYN_SYN,
};
use crate::constants::sampler::{DEFAULT_SEED, RANDOM_DRAW_LIMIT};
use crate::constants::tiers::{DEFAULT_SPLIT_DISTANCE, EASY_SUFFIX, HARD_SUFFIX};
use crate::errors::DatasetError;
use crate::types::{Distance, PartitionName};

/// Strategy used to synthesize negative pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NegativeStrategy {
    /// Pair each source with a uniformly drawn term from the partition.
    Random,
    /// Pair each source with the lexically closest terms that are not synonyms.
    MinimalDistance,
}

impl NegativeStrategy {
    /// Canonical name, also used in output file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::MinimalDistance => "minimal-distance",
        }
    }
}

impl fmt::Display for NegativeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NegativeStrategy {
    type Err = DatasetError;

    /// Accepts the canonical names plus the legacy `simple`/`advanced` spellings.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "random" | "simple" => Ok(Self::Random),
            "minimal-distance" | "minimal_distance" | "advanced" => Ok(Self::MinimalDistance),
            _ => Err(DatasetError::UnknownStrategy(raw.to_string())),
        }
    }
}

/// Family a positive partition belongs to. Controls how its negatives feed
/// the exclusion pool of later partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartitionFamily {
    /// Concept association partitions (`replaced_by`, `same_as`, `possibly_equivalent_to`).
    Substitution,
    /// Preferred label paired with each alternative label (`FSN_SYN`).
    PreferredToAlternative,
    /// All label combinations of a concept (`SYN_SYN`).
    Synonym,
}

impl PartitionFamily {
    /// Infer the family from a partition name prefix.
    pub fn for_partition(name: &str) -> Result<Self, DatasetError> {
        if name.starts_with(FSN_SYN) {
            Ok(Self::PreferredToAlternative)
        } else if name.starts_with(SYN_SYN) {
            Ok(Self::Synonym)
        } else if [POSSIBLY_EQUIVALENT_TO, REPLACED_BY, SAME_AS]
            .iter()
            .any(|prefix| name.starts_with(prefix))
        {
            Ok(Self::Substitution)
        } else {
            Err(DatasetError::UnknownPartition(name.to_string()))
        }
    }

    /// Whether partitions of this family are loaded into the positive corpus.
    ///
    /// Preferred-to-alternative pairs are a subset of the synonym pairs.
    pub fn contributes_to_corpus(&self) -> bool {
        !matches!(self, Self::PreferredToAlternative)
    }
}

/// One named positive partition and its family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionSpec {
    /// File stem of the partition table.
    pub name: PartitionName,
    /// Accumulation family.
    pub family: PartitionFamily,
}

impl PartitionSpec {
    /// Build a spec, inferring the family from the name.
    pub fn from_name(name: impl Into<PartitionName>) -> Result<Self, DatasetError> {
        let name = name.into();
        let family = PartitionFamily::for_partition(&name)?;
        Ok(Self { name, family })
    }

    /// Default partition list in processing order (easy/hard split at the
    /// default distance).
    pub fn default_order() -> Vec<PartitionSpec> {
        Self::ordered(Some(DEFAULT_SPLIT_DISTANCE))
    }

    /// Partition list in processing order. With a split distance every family
    /// contributes an easy then a hard partition; without one, a single
    /// partition named after the family.
    pub fn ordered(split_distance: Option<Distance>) -> Vec<PartitionSpec> {
        BASE_ORDER
            .iter()
            .flat_map(|base| partition_names(base, split_distance))
            .filter_map(|name| Self::from_name(name).ok())
            .collect()
    }
}

/// File stems produced for one partition family, easy tier first.
///
/// ```
/// use termpairs::config::partition_names;
///
/// assert_eq!(
///     partition_names("same_as", Some(5)),
///     vec!["same_as_easy_distance5", "same_as_hard_distance5"]
/// );
/// assert_eq!(partition_names("same_as", None), vec!["same_as"]);
/// ```
pub fn partition_names(base: &str, split_distance: Option<Distance>) -> Vec<PartitionName> {
    match split_distance {
        Some(distance) => vec![
            format!("{base}{EASY_SUFFIX}{distance}"),
            format!("{base}{HARD_SUFFIX}{distance}"),
        ],
        None => vec![base.to_string()],
    }
}

/// Negative sampler settings.
#[derive(Clone, Debug)]
pub struct SamplerConfig {
    /// RNG seed. Every `sample` call restarts from this seed.
    pub seed: u64,
    /// Max random draws per positive row before the random strategy fails.
    pub random_draw_limit: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            random_draw_limit: RANDOM_DRAW_LIMIT,
        }
    }
}

/// RF2 release file names inside the ontology directory.
#[derive(Clone, Debug)]
pub struct OntologyFiles {
    pub descriptions: String,
    pub concepts: String,
    pub associations: String,
}

impl Default for OntologyFiles {
    fn default() -> Self {
        Self {
            descriptions: DEFAULT_DESCRIPTION_FILE.to_string(),
            concepts: DEFAULT_CONCEPT_FILE.to_string(),
            associations: DEFAULT_ASSOCIATION_FILE.to_string(),
        }
    }
}

/// Top-level dataset build configuration.
#[derive(Clone, Debug)]
pub struct DatasetConfig {
    /// Directory holding the RF2 release files.
    pub ontology_dir: PathBuf,
    /// Directory positive partitions and final datasets are written to.
    pub dataset_dir: PathBuf,
    /// RF2 file names.
    pub files: OntologyFiles,
    /// Split positive pairs into easy/hard tiers by edit distance.
    pub easy_hard_split: bool,
    /// Max edit distance (inclusive) of an easy pair.
    pub split_distance: usize,
    /// Strategies to run, in order. Each gets its own negative accumulator.
    pub strategies: Vec<NegativeStrategy>,
    /// Partitions to sample negatives for, in processing order.
    pub partitions: Vec<PartitionSpec>,
    /// Sampler settings.
    pub sampler: SamplerConfig,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            ontology_dir: PathBuf::from(DEFAULT_ONTOLOGY_DIR),
            dataset_dir: PathBuf::from(DEFAULT_DATASET_DIR),
            files: OntologyFiles::default(),
            easy_hard_split: true,
            split_distance: DEFAULT_SPLIT_DISTANCE,
            strategies: vec![NegativeStrategy::MinimalDistance, NegativeStrategy::Random],
            partitions: PartitionSpec::default_order(),
            sampler: SamplerConfig::default(),
        }
    }
}

impl DatasetConfig {
    /// Split distance when easy/hard tiering is enabled.
    pub fn tier_split(&self) -> Option<Distance> {
        self.easy_hard_split.then_some(self.split_distance)
    }

    /// Reject configurations the pipeline cannot run.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.strategies.is_empty() {
            return Err(DatasetError::Configuration(
                "at least one negative sampling strategy is required".to_string(),
            ));
        }
        if self.partitions.is_empty() {
            return Err(DatasetError::Configuration(
                "at least one partition is required".to_string(),
            ));
        }
        for spec in &self.partitions {
            let inferred = PartitionFamily::for_partition(&spec.name)?;
            if inferred != spec.family {
                return Err(DatasetError::Configuration(format!(
                    "partition '{}' is configured as {:?} but its name implies {:?}",
                    spec.name, spec.family, inferred
                )));
            }
        }
        if self.sampler.random_draw_limit == 0 {
            return Err(DatasetError::Configuration(
                "random_draw_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_canonical_and_legacy_names() {
        assert_eq!(
            "random".parse::<NegativeStrategy>().unwrap(),
            NegativeStrategy::Random
        );
        assert_eq!(
            "simple".parse::<NegativeStrategy>().unwrap(),
            NegativeStrategy::Random
        );
        assert_eq!(
            "Minimal-Distance".parse::<NegativeStrategy>().unwrap(),
            NegativeStrategy::MinimalDistance
        );
        assert_eq!(
            "advanced".parse::<NegativeStrategy>().unwrap(),
            NegativeStrategy::MinimalDistance
        );
        assert!(matches!(
            "closest".parse::<NegativeStrategy>(),
            Err(DatasetError::UnknownStrategy(name)) if name == "closest"
        ));
    }

    #[test]
    fn partition_family_is_inferred_from_prefix() {
        assert_eq!(
            PartitionFamily::for_partition("replaced_by_hard_distance5").unwrap(),
            PartitionFamily::Substitution
        );
        assert_eq!(
            PartitionFamily::for_partition("FSN_SYN_easy_distance5").unwrap(),
            PartitionFamily::PreferredToAlternative
        );
        assert_eq!(
            PartitionFamily::for_partition("SYN_SYN_hard_distance5").unwrap(),
            PartitionFamily::Synonym
        );
        assert!(matches!(
            PartitionFamily::for_partition("is_a_easy_distance5"),
            Err(DatasetError::UnknownPartition(_))
        ));
    }

    #[test]
    fn default_order_covers_every_family() {
        let order = PartitionSpec::default_order();
        assert_eq!(order.len(), 2 * BASE_ORDER.len());
        assert_eq!(order[0].name, "possibly_equivalent_to_easy_distance5");
        assert_eq!(order[9].name, "SYN_SYN_hard_distance5");
        assert_eq!(order[0].family, PartitionFamily::Substitution);
        assert_eq!(order[6].family, PartitionFamily::PreferredToAlternative);
        assert_eq!(order[9].family, PartitionFamily::Synonym);
        assert!(!order[6].family.contributes_to_corpus());
        assert!(order[9].family.contributes_to_corpus());
    }

    #[test]
    fn ordered_without_split_uses_family_names() {
        let order = PartitionSpec::ordered(None);
        let names: Vec<&str> = order.iter().map(|spec| spec.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["possibly_equivalent_to", "replaced_by", "same_as", "FSN_SYN", "SYN_SYN"]
        );
        let order = PartitionSpec::ordered(Some(3));
        assert_eq!(order[3].name, "replaced_by_hard_distance3");
    }

    #[test]
    fn validate_rejects_mismatched_family_and_empty_lists() {
        let mut config = DatasetConfig::default();
        assert!(config.validate().is_ok());

        config.partitions[0].family = PartitionFamily::Synonym;
        assert!(matches!(
            config.validate(),
            Err(DatasetError::Configuration(_))
        ));

        let config = DatasetConfig {
            strategies: Vec::new(),
            ..DatasetConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
