/// A term label as it appears in the ontology (original casing preserved).
/// Examples: `Diabetes mellitus`, `Myocardial infarction`
pub type Term = String;
/// Case-folded form of a term used for identity comparisons.
/// Example: `diabetes mellitus`
pub type FoldedTerm = String;
/// Name of a positive-pair partition (file stem without extension).
/// Examples: `replaced_by_easy_distance5`, `SYN_SYN_hard_distance5`
pub type PartitionName = String;
/// Numeric ontology component identifier (concept, description, or refset id).
/// Example: `22298006`
pub type ComponentId = u64;
/// File path strings used in transport helpers and tests.
/// Example: `SNOMED_datasets/FSN_SYN_easy_distance5.tsv`
pub type PathString = String;
/// Edit distance between two terms.
pub type Distance = usize;
