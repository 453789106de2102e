/// Tab-separated tables: positive partitions, labeled datasets, and RF2 release files.
pub mod tsv;
