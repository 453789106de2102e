//! Positive pair extraction from an ontology release.
//!
//! Two sources feed the positive partitions:
//!
//! - concept labels: the preferred label paired with every current alternative
//!   label (`FSN_SYN`), and every combination of a concept's labels (`SYN_SYN`);
//! - concept substitutions: the preferred labels of a retired concept and the
//!   concept that substitutes it, one partition per substitution kind.
//!
//! Partitions are deduplicated, optionally split into easy/hard tiers by edit
//! distance, and saved as `source\ttarget` tables.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{DatasetConfig, partition_names};
use crate::constants::labels::{DEPRECATED_MARKER, NAMESPACE_MARKER, SEMANTIC_TAG_OPEN};
use crate::constants::partitions::{FSN_SYN, SYN_SYN};
use crate::corpus::PairIndex;
use crate::dedup::dedup_pairs_with_report;
use crate::distance::DifficultyTier;
use crate::errors::DatasetError;
use crate::ontology::{AssociationTable, ConceptTable, DescriptionTable, SubstitutionKind};
use crate::pairs::{TermPair, same_term};
use crate::transport::tsv::{
    find_partition_files, partition_path, read_pair_table, write_pair_table,
};
use crate::types::Distance;

/// Strip a trailing semantic tag such as ` (disorder)` from a preferred label.
///
/// The tag is kept when it is part of the label text itself: when the text
/// before it ends in ` or` or `&`, or the parenthesis opens with `&`.
///
/// ```
/// use termpairs::positives::clean_preferred_term;
///
/// assert_eq!(clean_preferred_term("Asthma (disorder)"), "Asthma");
/// assert_eq!(clean_preferred_term("Pain (finding) or (disorder)"), "Pain (finding) or (disorder)");
/// assert_eq!(clean_preferred_term("Lactation: [problems] or [& obstetric breast disorders NOS])"),
///            "Lactation: [problems] or [& obstetric breast disorders NOS])");
/// ```
pub fn clean_preferred_term(label: &str) -> &str {
    if !label.ends_with(')') {
        return label;
    }
    match label.rsplit_once(SEMANTIC_TAG_OPEN) {
        Some((head, tag))
            if !(head.ends_with(" or") || head.ends_with('&')) && !tag.starts_with('&') =>
        {
            head
        }
        _ => label,
    }
}

/// [`clean_preferred_term`] plus removal of a leading or trailing deprecation
/// marker (`[D]`).
pub fn clean_substitution_term(label: &str) -> &str {
    let mut cleaned = clean_preferred_term(label);
    if let Some(rest) = cleaned.strip_prefix(DEPRECATED_MARKER) {
        cleaned = rest.trim();
    }
    if let Some(head) = cleaned.strip_suffix(DEPRECATED_MARKER) {
        cleaned = head.trim();
    }
    cleaned
}

/// Positive pairs of one partition family, split by difficulty.
///
/// Without a split distance every pair lands in `hard`, which is then saved
/// under the bare family name.
#[derive(Clone, Debug, Default)]
pub struct TieredPairs {
    split_distance: Option<Distance>,
    pub easy: Vec<TermPair>,
    pub hard: Vec<TermPair>,
}

impl TieredPairs {
    pub fn new(split_distance: Option<Distance>) -> Self {
        Self {
            split_distance,
            easy: Vec::new(),
            hard: Vec::new(),
        }
    }

    /// Add a pair to its tier. Same-term pairs are dropped (`false`).
    pub fn push(&mut self, source: &str, target: &str) -> bool {
        let Some(pair) = TermPair::new(source, target) else {
            return false;
        };
        let tier = match self.split_distance {
            Some(split) => DifficultyTier::classify(pair.distance(), split),
            None => DifficultyTier::Hard,
        };
        match tier {
            DifficultyTier::Easy => self.easy.push(pair),
            DifficultyTier::Hard => self.hard.push(pair),
        }
        true
    }

    pub fn len(&self) -> usize {
        self.easy.len() + self.hard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.easy.is_empty() && self.hard.is_empty()
    }

    /// Deduplicate each tier and write it under `base`; returns the written paths.
    pub fn save(&self, dataset_dir: &Path, base: &str) -> Result<Vec<PathBuf>, DatasetError> {
        let tiers: Vec<&[TermPair]> = match self.split_distance {
            Some(_) => vec![self.easy.as_slice(), self.hard.as_slice()],
            None => vec![self.hard.as_slice()],
        };
        let mut written = Vec::with_capacity(tiers.len());
        for (name, pairs) in partition_names(base, self.split_distance)
            .into_iter()
            .zip(tiers)
        {
            let (unique, report) = dedup_pairs_with_report(pairs.iter().cloned());
            let path = partition_path(dataset_dir, &name);
            write_pair_table(&path, &unique)?;
            info!(
                partition = %name,
                positives = unique.len(),
                exact_duplicates = report.exact_duplicates,
                reverse_duplicates = report.reverse_duplicates,
                "saved positive partition"
            );
            written.push(path);
        }
        Ok(written)
    }
}

/// Label-derived positive pairs.
#[derive(Clone, Debug)]
pub struct LabelPairs {
    /// Preferred label paired with each alternative label.
    pub fsn_syn: TieredPairs,
    /// Every two-label combination of a concept.
    pub syn_syn: TieredPairs,
}

/// Build `FSN_SYN` and `SYN_SYN` pairs for every active clinical concept.
pub fn extract_label_pairs(
    concepts: &ConceptTable,
    descriptions: &DescriptionTable,
    split_distance: Option<Distance>,
) -> Result<LabelPairs, DatasetError> {
    let mut pairs = LabelPairs {
        fsn_syn: TieredPairs::new(split_distance),
        syn_syn: TieredPairs::new(split_distance),
    };
    let mut used = 0usize;
    for concept in concepts.ids() {
        if !concepts.is_active_clinical(concept) {
            continue;
        }
        let labels = descriptions.current_labels(concept)?;
        let [preferred] = labels.preferred.as_slice() else {
            return Err(DatasetError::Ontology(format!(
                "concept {concept} has {} preferred labels, expected exactly one",
                labels.preferred.len()
            )));
        };
        let preferred = clean_preferred_term(preferred);
        if preferred.trim().is_empty() {
            return Err(DatasetError::Ontology(format!(
                "concept {concept} has an empty preferred label"
            )));
        }
        let alternatives: Vec<&str> = labels
            .alternatives
            .iter()
            .map(String::as_str)
            .filter(|alt| !same_term(alt, preferred))
            .collect();
        if let Some(blank) = alternatives.iter().find(|alt| alt.trim().is_empty()) {
            return Err(DatasetError::Ontology(format!(
                "concept {concept} has an empty alternative label '{blank}'"
            )));
        }

        for alt in &alternatives {
            pairs.fsn_syn.push(preferred, alt);
        }
        let group: Vec<&str> = std::iter::once(preferred)
            .chain(alternatives.iter().copied())
            .collect();
        for (idx, first) in group.iter().enumerate() {
            for second in &group[idx + 1..] {
                pairs.syn_syn.push(first, second);
            }
        }
        used += 1;
    }
    info!(
        concepts = used,
        fsn_syn = pairs.fsn_syn.len(),
        syn_syn = pairs.syn_syn.len(),
        "extracted label pairs"
    );
    Ok(pairs)
}

/// Substitution pairs, one tiered set per kind.
#[derive(Clone, Debug)]
pub struct SubstitutionPairs {
    pub by_kind: Vec<(SubstitutionKind, TieredPairs)>,
}

impl SubstitutionPairs {
    fn new(split_distance: Option<Distance>) -> Self {
        Self {
            by_kind: SubstitutionKind::ALL
                .into_iter()
                .map(|kind| (kind, TieredPairs::new(split_distance)))
                .collect(),
        }
    }

    pub fn get(&self, kind: SubstitutionKind) -> Option<&TieredPairs> {
        self.by_kind
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, pairs)| pairs)
    }

    fn get_mut(&mut self, kind: SubstitutionKind) -> Option<&mut TieredPairs> {
        self.by_kind
            .iter_mut()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, pairs)| pairs)
    }
}

/// Build substitution pairs from the association refsets.
///
/// Targets labeled as namespace concepts are skipped, as are same-term pairs
/// and pairs already present among the synonym pairs.
pub fn extract_substitution_pairs(
    associations: &AssociationTable,
    descriptions: &DescriptionTable,
    synonyms: &PairIndex,
    split_distance: Option<Distance>,
) -> Result<SubstitutionPairs, DatasetError> {
    let mut pairs = SubstitutionPairs::new(split_distance);
    let mut skipped_namespace = 0usize;
    let mut skipped_synonym = 0usize;
    for substitution in associations.substitutions() {
        let source_label = descriptions.preferred_label(substitution.source)?;
        let target_label = descriptions.preferred_label(substitution.target)?;
        if target_label.contains(NAMESPACE_MARKER) {
            skipped_namespace += 1;
            continue;
        }
        let source = clean_substitution_term(source_label);
        let target = clean_substitution_term(target_label);
        if same_term(source, target) {
            continue;
        }
        if synonyms.contains(source, target) {
            skipped_synonym += 1;
            continue;
        }
        if let Some(tiered) = pairs.get_mut(substitution.kind) {
            tiered.push(source, target);
        }
        debug!(
            source,
            target,
            refset = substitution.kind.refset().code(),
            "substitution pair"
        );
    }
    if skipped_namespace > 0 {
        warn!(
            skipped = skipped_namespace,
            "skipped substitutions targeting namespace concepts"
        );
    }
    info!(
        skipped_synonym,
        kinds = pairs.by_kind.len(),
        "extracted substitution pairs"
    );
    Ok(pairs)
}

/// Extract label pairs from the configured release files and save the
/// `SYN_SYN` and `FSN_SYN` partitions.
pub fn positives_from_labels(config: &DatasetConfig) -> Result<Vec<PathBuf>, DatasetError> {
    let concepts = ConceptTable::load(&config.ontology_dir.join(&config.files.concepts))?;
    let descriptions =
        DescriptionTable::load(&config.ontology_dir.join(&config.files.descriptions))?;
    info!(concepts = concepts.len(), "loaded concept table");

    let pairs = extract_label_pairs(&concepts, &descriptions, config.tier_split())?;
    let mut written = pairs.syn_syn.save(&config.dataset_dir, SYN_SYN)?;
    written.extend(pairs.fsn_syn.save(&config.dataset_dir, FSN_SYN)?);
    Ok(written)
}

/// Extract substitution pairs and save one partition family per kind.
///
/// Reads the `SYN_SYN` partitions already in the dataset directory so that
/// substitution pairs never repeat a synonym pair.
pub fn positives_from_substitutions(config: &DatasetConfig) -> Result<Vec<PathBuf>, DatasetError> {
    let descriptions =
        DescriptionTable::load(&config.ontology_dir.join(&config.files.descriptions))?;
    let associations =
        AssociationTable::load(&config.ontology_dir.join(&config.files.associations))?;
    info!(associations = associations.len(), "loaded association table");

    let mut synonyms = PairIndex::new();
    for path in find_partition_files(&config.dataset_dir, SYN_SYN) {
        synonyms.extend(&read_pair_table(&path)?);
    }

    let pairs =
        extract_substitution_pairs(&associations, &descriptions, &synonyms, config.tier_split())?;
    let mut written = Vec::new();
    for (kind, tiered) in &pairs.by_kind {
        written.extend(tiered.save(&config.dataset_dir, kind.partition_base())?);
    }
    Ok(written)
}
