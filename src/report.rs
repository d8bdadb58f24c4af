//! Report serialization (CSV/JSON) and prior-report hash loading.

use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::models::{PreviousHashIndex, ScanResult};

/// Category label written for files with no findings.
const NONE_CATEGORY: &str = "NONE";
const NONE_VALUE: &str = "No PII Detected";

/// Write results as CSV: one row per (file, category), `NONE` row for files
/// without findings, multi-values joined with ", ".
pub fn write_csv(results: &[ScanResult], path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["File Path", "SHA256 Hash", "PII Type", "Detected Values"])?;

    for result in results {
        if result.pii_data.is_empty() {
            writer.write_record([
                result.file_path.as_str(),
                result.file_hash.as_str(),
                NONE_CATEGORY,
                NONE_VALUE,
            ])?;
        } else {
            for (category, values) in &result.pii_data {
                writer.write_record([
                    result.file_path.as_str(),
                    result.file_hash.as_str(),
                    category.as_str(),
                    values.join(", ").as_str(),
                ])?;
            }
        }
    }

    writer.flush()?;
    tracing::info!("wrote CSV report to {}", path.display());
    Ok(())
}

/// Write results as a JSON array of `{file_path, file_hash, pii_data}`
/// objects; an empty finding becomes `{"NONE": ["No PII Detected"]}`.
pub fn write_json(results: &[ScanResult], path: &Path) -> anyhow::Result<()> {
    let rows: Vec<ScanResult> = results
        .iter()
        .cloned()
        .map(|mut result| {
            if result.pii_data.is_empty() {
                result
                    .pii_data
                    .insert(NONE_CATEGORY.to_string(), vec![NONE_VALUE.to_string()]);
            }
            result
        })
        .collect();

    serde_json::to_writer_pretty(File::create(path)?, &rows)?;
    tracing::info!("wrote JSON report to {}", path.display());
    Ok(())
}

/// Load the hash index from a prior CSV or JSON report.
///
/// Anything malformed (wrong extension, missing columns or keys, parse
/// failure) yields an empty index with a warning, and the scan runs as a
/// full scan.
pub fn load_previous_hashes(path: &Path) -> PreviousHashIndex {
    match try_load(path) {
        Ok(index) => {
            tracing::info!(
                "loaded {} previously scanned hashes from {}",
                index.len(),
                path.display()
            );
            index
        }
        Err(err) => {
            tracing::warn!(
                "could not load previous hashes from {}: {}",
                path.display(),
                err
            );
            PreviousHashIndex::new()
        }
    }
}

fn try_load(path: &Path) -> anyhow::Result<PreviousHashIndex> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        Some("csv") => load_csv(path),
        other => anyhow::bail!("unsupported prior-report format: {:?}", other),
    }
}

#[derive(Deserialize)]
struct PriorRecord {
    file_path: String,
    file_hash: String,
}

fn load_json(path: &Path) -> anyhow::Result<PreviousHashIndex> {
    let records: Vec<PriorRecord> = serde_json::from_reader(File::open(path)?)?;
    Ok(records
        .into_iter()
        .map(|r| (r.file_hash, r.file_path))
        .collect())
}

fn load_csv(path: &Path) -> anyhow::Result<PreviousHashIndex> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?;

    let path_idx = headers
        .iter()
        .position(|h| h == "File Path")
        .ok_or_else(|| anyhow::anyhow!("missing 'File Path' column"))?;
    let hash_idx = headers
        .iter()
        .position(|h| h == "SHA256 Hash")
        .ok_or_else(|| anyhow::anyhow!("missing 'SHA256 Hash' column"))?;

    let mut index = PreviousHashIndex::new();
    for record in reader.records() {
        let record = record?;
        if let (Some(file_path), Some(file_hash)) = (record.get(path_idx), record.get(hash_idx)) {
            index.insert(file_hash.to_string(), file_path.to_string());
        }
    }
    Ok(index)
}
