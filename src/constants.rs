/// Constants used by negative sampling.
pub mod sampler {
    /// Seed used when no explicit seed is configured.
    pub const DEFAULT_SEED: u64 = 42;
    /// Per-row cap on random draws before the random strategy gives up.
    pub const RANDOM_DRAW_LIMIT: usize = 100_000;
}

/// Constants used when splitting positive pairs into difficulty tiers.
pub mod tiers {
    /// Max edit distance (inclusive) for a pair to count as "easy".
    pub const DEFAULT_SPLIT_DISTANCE: usize = 5;
    /// File-name fragment for the easy tier (followed by the distance).
    pub const EASY_SUFFIX: &str = "_easy_distance";
    /// File-name fragment for the hard tier (followed by the distance).
    pub const HARD_SUFFIX: &str = "_hard_distance";
}

/// Partition-name prefixes and the default processing order.
pub mod partitions {
    /// Prefix for `possibly equivalent to` association partitions.
    pub const POSSIBLY_EQUIVALENT_TO: &str = "possibly_equivalent_to";
    /// Prefix for `replaced by` association partitions.
    pub const REPLACED_BY: &str = "replaced_by";
    /// Prefix for `same as` association partitions.
    pub const SAME_AS: &str = "same_as";
    /// Prefix for preferred-to-alternative label partitions.
    pub const FSN_SYN: &str = "FSN_SYN";
    /// Prefix for synonym-to-synonym label partitions.
    pub const SYN_SYN: &str = "SYN_SYN";

    /// Partition families in processing order. Each partition's exclusions
    /// depend on the negatives generated for every partition before it.
    pub const BASE_ORDER: [&str; 5] =
        [POSSIBLY_EQUIVALENT_TO, REPLACED_BY, SAME_AS, FSN_SYN, SYN_SYN];
}

/// Constants used by TSV transport and output naming.
pub mod files {
    /// Extension used for every table written by this crate.
    pub const TABLE_EXTENSION: &str = "tsv";
    /// Header of the source column in positive partition tables.
    pub const SOURCE_COLUMN: &str = "source";
    /// Header of the target column in positive partition tables.
    pub const TARGET_COLUMN: &str = "target";
    /// Fragment inserted between the partition name and the strategy name.
    pub const WITH_NEGATIVES_INFIX: &str = "_with_neg_";
    /// Stem of the per-strategy statistics report.
    pub const STATISTICS_STEM: &str = "negative_sampling_statistics";
    /// Default RF2 description snapshot file.
    pub const DEFAULT_DESCRIPTION_FILE: &str = "sct2_Description_Full-en_INT_20190131.txt";
    /// Default RF2 concept file.
    pub const DEFAULT_CONCEPT_FILE: &str = "sct2_Concept_Full_INT_20190131.txt";
    /// Default RF2 association refset file.
    pub const DEFAULT_ASSOCIATION_FILE: &str = "der2_cRefset_AssociationFull_INT_20190131.txt";
    /// Default ontology input directory.
    pub const DEFAULT_ONTOLOGY_DIR: &str = "../SNOMED_files";
    /// Default dataset output directory.
    pub const DEFAULT_DATASET_DIR: &str = "SNOMED_datasets";
}

/// Constants used when cleaning ontology labels.
pub mod labels {
    /// Marker some deprecated concept labels carry at either end.
    pub const DEPRECATED_MARKER: &str = "[D]";
    /// Substring identifying namespace concepts that never form real pairs.
    pub const NAMESPACE_MARKER: &str = "namespace";
    /// Opening of a trailing semantic tag, e.g. ` (disorder)`.
    pub const SEMANTIC_TAG_OPEN: &str = " (";
}

/// Constants used by the statistics report.
pub mod statistics {
    pub const POSITIVE_COUNT_LABEL: &str = "Number of positive instances";
    pub const MEAN_LABEL: &str = "Mean Levenshtein Distance";
    pub const MEDIAN_LABEL: &str = "Median Levenshtein Distance";
    pub const MAX_LABEL: &str = "Max Levenshtein Distance";
    pub const MIN_LABEL: &str = "Min Levenshtein Distance";
}
