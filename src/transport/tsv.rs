use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use serde::de::DeserializeOwned;
use walkdir::WalkDir;

use crate::assembler::LabeledDataset;
use crate::config::NegativeStrategy;
use crate::constants::files::{
    SOURCE_COLUMN, STATISTICS_STEM, TABLE_EXTENSION, TARGET_COLUMN, WITH_NEGATIVES_INFIX,
};
use crate::errors::DatasetError;
use crate::metrics::StatisticsRecord;
use crate::pairs::TermPair;

/// Path of a positive partition table inside `dir`.
pub fn partition_path(dir: &Path, partition: &str) -> PathBuf {
    dir.join(format!("{partition}.{TABLE_EXTENSION}"))
}

/// Path of the labeled dataset for one partition and strategy.
pub fn dataset_path(dir: &Path, partition: &str, strategy: NegativeStrategy) -> PathBuf {
    dir.join(format!(
        "{partition}{WITH_NEGATIVES_INFIX}{}.{TABLE_EXTENSION}",
        strategy.as_str()
    ))
}

/// Path of the per-strategy statistics report.
pub fn statistics_path(dir: &Path, strategy: NegativeStrategy) -> PathBuf {
    dir.join(format!("{STATISTICS_STEM}_{}.txt", strategy.as_str()))
}

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .flexible(true);
    builder
}

/// Read a two-column `source\ttarget` table (header row skipped).
///
/// Rows are returned as-is; degenerate rows are left for the sampler to reject.
pub fn read_pair_table(path: &Path) -> Result<Vec<TermPair>, DatasetError> {
    let mut reader = reader_builder().from_path(path)?;
    let mut pairs = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        if record.len() != 2 {
            return Err(DatasetError::Malformed {
                path: path.display().to_string(),
                line: record.position().map(|pos| pos.line()).unwrap_or(0),
                details: format!("expected 2 columns, found {}", record.len()),
            });
        }
        pairs.push(TermPair {
            source: record[0].to_string(),
            target: record[1].to_string(),
        });
    }
    Ok(pairs)
}

/// Write a positive partition table with a `source\ttarget` header.
pub fn write_pair_table(path: &Path, pairs: &[TermPair]) -> Result<(), DatasetError> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .from_path(path)?;
    writer.write_record([SOURCE_COLUMN, TARGET_COLUMN])?;
    for pair in pairs {
        writer.write_record([pair.source.as_str(), pair.target.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `source\ttarget\tlabel` rows (no header) in dataset order.
pub fn write_labeled_dataset(path: &Path, dataset: &LabeledDataset) -> Result<(), DatasetError> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .has_headers(false)
        .from_path(path)?;
    for instance in &dataset.instances {
        let label = instance.label.as_score().to_string();
        writer.write_record([
            instance.pair.source.as_str(),
            instance.pair.target.as_str(),
            label.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Append one statistics block to the report at `path`.
pub fn append_statistics(path: &Path, record: &StatisticsRecord) -> Result<(), DatasetError> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(record.to_string().as_bytes())?;
    Ok(())
}

/// Deserialize every row of a tab-separated table with a header row.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let mut reader = reader_builder().flexible(false).from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}

/// Partition tables directly inside `dir` whose file name starts with `prefix`,
/// sorted by name. Resource-fork files (`._*`) are ignored.
pub fn find_partition_files(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            name.starts_with(prefix)
                && !name.starts_with("._")
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case(TABLE_EXTENSION))
                    .unwrap_or(false)
        })
        .collect();
    found.sort();
    found
}

fn ensure_parent(path: &Path) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
