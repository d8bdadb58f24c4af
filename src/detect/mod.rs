//! PII detection: independent pattern and entity detectors, merged.

mod entities;
mod patterns;

pub use entities::{EntityDetector, RegexEntityDetector};
pub use patterns::PatternSet;

use clap::ValueEnum;

use crate::models::PiiFinding;

/// How colliding category keys are combined when the two detectors emit
/// the same label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MergePolicy {
    /// Entity-detector categories replace same-named pattern-detector
    /// categories. Historical behavior, kept as the default.
    #[default]
    Overwrite,
    /// Colliding categories are concatenated, pattern matches first.
    Union,
}

/// Runs the pattern and entity detectors over the same text independently
/// and merges their findings under one key space.
pub struct PiiAnalyzer {
    patterns: PatternSet,
    entities: Box<dyn EntityDetector>,
    merge_policy: MergePolicy,
}

impl PiiAnalyzer {
    /// Build an analyzer from an already-loaded pattern set and the default
    /// regex entity detector.
    pub fn new(patterns: PatternSet) -> Self {
        Self {
            patterns,
            entities: Box::new(RegexEntityDetector::new()),
            merge_policy: MergePolicy::default(),
        }
    }

    pub fn with_entity_detector(mut self, entities: Box<dyn EntityDetector>) -> Self {
        self.entities = entities;
        self
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Analyze text for PII. Returns an empty mapping when neither detector
    /// finds anything; "file had no text" is indistinguishable here and
    /// disambiguated only by the caller's context.
    pub fn analyze(&self, text: &str) -> PiiFinding {
        let mut findings = self.patterns.detect(text);
        let entity_findings = self.entities.detect(text);

        for (category, mut values) in entity_findings {
            match self.merge_policy {
                MergePolicy::Overwrite => {
                    findings.insert(category, values);
                }
                MergePolicy::Union => {
                    findings.entry(category).or_default().append(&mut values);
                }
            }
        }

        findings
    }
}
