//! Pattern-based PII detection from an external regex resource.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;

use crate::models::PiiFinding;

/// Immutable set of named PII patterns.
///
/// Constructed once during scan setup and passed into the analyzer; there
/// is no process-global pattern cache. A failed load yields an empty set (and a
/// warning) so the scan can still run with the entity detector alone.
pub struct PatternSet {
    patterns: Vec<(String, Regex)>,
}

impl PatternSet {
    /// Load named patterns from a JSON object file mapping category label
    /// to regex source, e.g. `{"email": "[\\w.]+@[\\w.]+"}`.
    ///
    /// Any failure (missing file, bad JSON, uncompilable pattern) degrades
    /// to an empty set.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(set) => {
                tracing::info!("loaded {} PII patterns from {}", set.len(), path.display());
                set
            }
            Err(err) => {
                tracing::warn!("failed to load patterns from {}: {}", path.display(), err);
                Self::empty()
            }
        }
    }

    fn try_load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        // Tolerate a UTF-8 BOM from Windows-edited pattern files.
        let raw = raw.trim_start_matches('\u{feff}');
        let named: BTreeMap<String, String> = serde_json::from_str(raw)?;
        Self::from_patterns(named.into_iter())
    }

    /// Compile patterns from (label, regex source) pairs.
    pub fn from_patterns(
        pairs: impl IntoIterator<Item = (String, String)>,
    ) -> anyhow::Result<Self> {
        let mut patterns = Vec::new();
        for (name, source) in pairs {
            let regex = Regex::new(&source)?;
            patterns.push((name, regex));
        }
        Ok(Self { patterns })
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Run every pattern over the text. Categories with no matches are
    /// absent; matched values keep discovery order, duplicates included.
    pub fn detect(&self, text: &str) -> PiiFinding {
        let mut findings = PiiFinding::new();
        for (name, regex) in &self.patterns {
            let values: Vec<String> = regex
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect();
            if !values.is_empty() {
                findings.insert(name.clone(), values);
            }
        }
        findings
    }
}
