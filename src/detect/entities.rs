//! Entity-based PII detection behind a pluggable interface.
//!
//! Provides an `EntityDetector` trait and a built-in `RegexEntityDetector`
//! that extracts person names, dates, and organizations with pattern
//! matching. Model-backed detectors can implement the trait and be swapped
//! in without touching the analyzer.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::PiiFinding;

/// Category label for person names.
pub const CATEGORY_NAMES: &str = "names";
/// Category label for dates.
pub const CATEGORY_DATES: &str = "dates";
/// Category label for organizations.
pub const CATEGORY_ORGS: &str = "orgs";

/// Trait for entity-recognition detectors.
pub trait EntityDetector: Send + Sync {
    /// Short detector identifier (e.g. "regex").
    fn name(&self) -> &'static str;

    /// Extract entities from text, keyed by category. Only categories with
    /// at least one match appear in the result.
    fn detect(&self, text: &str) -> PiiFinding;
}

/// Built-in regex entity detector.
///
/// High precision on prose documents, no external models or runtime
/// dependencies.
pub struct RegexEntityDetector;

impl RegexEntityDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RegexEntityDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityDetector for RegexEntityDetector {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn detect(&self, text: &str) -> PiiFinding {
        let mut findings = PiiFinding::new();

        let names = extract_names(text);
        if !names.is_empty() {
            findings.insert(CATEGORY_NAMES.to_string(), names);
        }
        let dates = extract_dates(text);
        if !dates.is_empty() {
            findings.insert(CATEGORY_DATES.to_string(), dates);
        }
        let orgs = extract_orgs(text);
        if !orgs.is_empty() {
            findings.insert(CATEGORY_ORGS.to_string(), orgs);
        }

        findings
    }
}

static TITLED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:Mr|Mrs|Ms|Dr|Prof)\.?\s+([A-Z][a-z]+(?:\s+[A-Z]\.?)?\s+[A-Z][a-z]+)",
    )
    .expect("titled name pattern should compile")
});

static CAPITALIZED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]{2,}(?:\s+[A-Z]\.?\s+|\s+)[A-Z][a-z]{2,})\b")
        .expect("capitalized name pattern should compile")
});

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // March 5, 2021 / Mar 5 2021
        Regex::new(
            r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}\b",
        )
        .unwrap(),
        // 5 March 2021
        Regex::new(
            r"\b\d{1,2}\s+(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4}\b",
        )
        .unwrap(),
        // 03/05/2021, 3-5-21
        Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").unwrap(),
        // ISO 2021-03-05
        Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap(),
    ]
});

static ORG_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b((?:[A-Z][A-Za-z&]+\s+)+(?:Inc|LLC|Ltd|Corp|Corporation|Company|Co|Group|Partners|Associates|Agency|Bureau|Department|University|Institute)\.?)",
    )
    .expect("org suffix pattern should compile")
});

static ORG_ACRONYM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,5}\b").expect("acronym pattern should compile"));

static KNOWN_ORG_ACRONYMS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "IRS", "SSA", "DMV", "FBI", "CIA", "NSA", "HR", "IBM", "AWS", "NHS", "UN", "EU", "WHO",
        "FDA", "EPA", "SEC", "FTC", "NASA",
    ]
    .into_iter()
    .collect()
});

// Capitalized pairs that look like names but aren't.
static NAME_STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "United States",
        "New York",
        "New Jersey",
        "New Mexico",
        "New Hampshire",
        "North Carolina",
        "North Dakota",
        "South Carolina",
        "South Dakota",
        "West Virginia",
        "Social Security",
        "Dear Sir",
        "Best Regards",
        "Kind Regards",
        "Thank You",
    ]
    .into_iter()
    .collect()
});

fn extract_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut seen = HashSet::new();

    for cap in TITLED_NAME.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            let name = m.as_str().trim();
            if seen.insert(name.to_string()) {
                names.push(name.to_string());
            }
        }
    }

    for cap in CAPITALIZED_NAME.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            let name = m.as_str().trim();
            if is_plausible_name(name) && !NAME_STOPWORDS.contains(name) {
                if seen.insert(name.to_string()) {
                    names.push(name.to_string());
                }
            }
        }
    }

    names
}

fn extract_dates(text: &str) -> Vec<String> {
    let mut dates = Vec::new();
    let mut seen = HashSet::new();
    for pattern in DATE_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            let date = m.as_str().to_string();
            if seen.insert(date.clone()) {
                dates.push(date);
            }
        }
    }
    dates
}

fn extract_orgs(text: &str) -> Vec<String> {
    let mut orgs = Vec::new();
    let mut seen = HashSet::new();

    for cap in ORG_SUFFIX.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            let org = m.as_str().trim().to_string();
            if seen.insert(org.clone()) {
                orgs.push(org);
            }
        }
    }

    for m in ORG_ACRONYM.find_iter(text) {
        if KNOWN_ORG_ACRONYMS.contains(m.as_str()) {
            let org = m.as_str().to_string();
            if seen.insert(org.clone()) {
                orgs.push(org);
            }
        }
    }

    orgs
}

fn is_plausible_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() < 2 || parts.len() > 4 {
        return false;
    }
    parts.iter().all(|p| {
        let first = p.chars().next().unwrap_or('a');
        first.is_uppercase() && p.len() >= 2
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titled_names() {
        let findings =
            RegexEntityDetector::new().detect("Please forward this to Dr. Jane Smith today.");
        assert!(findings[CATEGORY_NAMES].contains(&"Jane Smith".to_string()));
    }

    #[test]
    fn test_capitalized_pair_names() {
        let findings = RegexEntityDetector::new().detect("Signed by Robert Johnson yesterday.");
        assert!(findings[CATEGORY_NAMES].contains(&"Robert Johnson".to_string()));
    }

    #[test]
    fn test_name_stopwords_excluded() {
        let findings = RegexEntityDetector::new().detect("Shipped from New York warehouses.");
        assert!(!findings.contains_key(CATEGORY_NAMES));
    }

    #[test]
    fn test_dates_multiple_formats() {
        let findings = RegexEntityDetector::new()
            .detect("Born March 5, 1980, hired 01/15/2020, reviewed 2023-11-02.");
        let dates = &findings[CATEGORY_DATES];
        assert!(dates.contains(&"March 5, 1980".to_string()));
        assert!(dates.contains(&"01/15/2020".to_string()));
        assert!(dates.contains(&"2023-11-02".to_string()));
    }

    #[test]
    fn test_org_suffixes_and_acronyms() {
        let findings =
            RegexEntityDetector::new().detect("Acme Widgets Inc filed with the IRS last year.");
        let orgs = &findings[CATEGORY_ORGS];
        assert!(orgs.iter().any(|o| o.starts_with("Acme Widgets")));
        assert!(orgs.contains(&"IRS".to_string()));
    }

    #[test]
    fn test_empty_text_empty_finding() {
        assert!(RegexEntityDetector::new().detect("").is_empty());
    }
}
