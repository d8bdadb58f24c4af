//! Core data model shared across the scan pipeline.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::mime::DocumentKind;

/// PII finding for a single file: category label mapped to the matched
/// values in discovery order. Duplicates are permitted.
pub type PiiFinding = BTreeMap<String, Vec<String>>;

/// Index of previously scanned content, keyed by content hash.
///
/// Used purely as a membership set for skip decisions; the mapped path is
/// informational only and never drives control flow.
pub type PreviousHashIndex = HashMap<String, String>;

/// A file discovered by the walker, already classified as a supported type.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    /// Canonical MIME-like label from magic-byte sniffing.
    pub content_type: String,
    /// Closed content category resolved once at classification time.
    pub kind: DocumentKind,
}

/// One processed (non-skipped) file, the unit persisted to reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub file_path: String,
    /// Lowercase hex SHA-256 digest, computed once per scan pass.
    pub file_hash: String,
    /// Empty when the file had no text or neither detector matched.
    pub pii_data: PiiFinding,
}

impl ScanResult {
    pub fn has_findings(&self) -> bool {
        !self.pii_data.is_empty()
    }
}
