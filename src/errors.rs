use std::io;

use thiserror::Error;

use crate::types::{PartitionName, PathString, Term};

/// Error type for configuration, sampling, ontology, and IO failures.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("unknown negative sampling strategy '{0}'")]
    UnknownStrategy(String),
    #[error("unknown partition '{0}'")]
    UnknownPartition(PartitionName),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("partition '{0}' has no positive instances")]
    EmptyPartition(PartitionName),
    #[error("data invariant violated: {0}")]
    InvariantViolation(String),
    #[error(
        "ran out of negative candidates for '{source_term}': produced {produced} of {requested}"
    )]
    Exhausted {
        source_term: Term,
        requested: usize,
        produced: usize,
    },
    #[error("ontology error: {0}")]
    Ontology(String),
    #[error("malformed row in '{path}' at line {line}: {details}")]
    Malformed {
        path: PathString,
        line: u64,
        details: String,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
