//! Scan orchestration: walk, then hash/skip/extract/detect per file on a
//! bounded worker pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::ScanConfig;
use crate::detect::PiiAnalyzer;
use crate::extract::ExtractionEngine;
use crate::models::{FileRecord, PreviousHashIndex, ScanResult};
use crate::{hash, walker};

/// Aggregate outcome of one scan invocation.
#[derive(Debug)]
pub struct ScanOutcome {
    /// One entry per processed (non-skipped, hashable) file. Order is
    /// worker completion order, not discovery order.
    pub results: Vec<ScanResult>,
    /// Files discovered by the walker.
    pub discovered: usize,
    /// Files whose hash was already in the previous-report index.
    pub skipped: usize,
    /// Files that could not be hashed and were excluded entirely.
    pub hash_failures: usize,
}

/// Drives a full scan: a single-threaded walk collects the file set, then
/// a bounded pool of blocking workers processes it. Workers share only the
/// read-only previous-hash index and the append-only results collection.
pub struct Scanner {
    config: ScanConfig,
    engine: Arc<ExtractionEngine>,
    analyzer: Arc<PiiAnalyzer>,
    previous: Arc<PreviousHashIndex>,
    workers: usize,
    show_progress: bool,
}

impl Scanner {
    pub fn new(
        config: ScanConfig,
        engine: ExtractionEngine,
        analyzer: PiiAnalyzer,
        previous: PreviousHashIndex,
    ) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
            analyzer: Arc::new(analyzer),
            previous: Arc::new(previous),
            workers: default_workers(),
            show_progress: false,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run the scan to completion. Never fails: every per-file error has
    /// already degraded to a skip or an empty result by the time it gets
    /// here. There is no cancellation and no per-file timeout.
    pub async fn run(&self) -> ScanOutcome {
        let records = walker::walk(&self.config);
        let discovered = records.len();
        tracing::info!("discovered {} candidate files", discovered);

        let progress = if self.show_progress {
            let pb = ProgressBar::new(discovered as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let queue = Arc::new(Mutex::new(records));
        let results: Arc<Mutex<Vec<ScanResult>>> = Arc::new(Mutex::new(Vec::new()));
        let skipped = Arc::new(AtomicUsize::new(0));
        let hash_failures = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(self.workers);
        for _ in 0..self.workers {
            let queue = queue.clone();
            let results = results.clone();
            let skipped = skipped.clone();
            let hash_failures = hash_failures.clone();
            let engine = self.engine.clone();
            let analyzer = self.analyzer.clone();
            let previous = self.previous.clone();
            let progress = progress.clone();

            // All per-file work (hashing, external tools, OCR) blocks on
            // I/O, so workers run on the blocking pool.
            handles.push(tokio::task::spawn_blocking(move || loop {
                let record = {
                    let mut queue = queue.lock().unwrap();
                    queue.pop()
                };
                let Some(record) = record else { break };

                progress.set_message(
                    record
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );

                match process_file(&engine, &analyzer, &previous, &record) {
                    FileOutcome::Done(result) => results.lock().unwrap().push(result),
                    FileOutcome::Skipped => {
                        skipped.fetch_add(1, Ordering::Relaxed);
                    }
                    FileOutcome::HashFailed => {
                        hash_failures.fetch_add(1, Ordering::Relaxed);
                    }
                }
                progress.inc(1);
            }));
        }

        for handle in handles {
            // Worker panics would be a bug; surface them loudly.
            handle.await.expect("scan worker panicked");
        }
        progress.finish_and_clear();

        let results = Arc::try_unwrap(results)
            .expect("workers have exited")
            .into_inner()
            .unwrap();

        ScanOutcome {
            results,
            discovered,
            skipped: skipped.load(Ordering::Relaxed),
            hash_failures: hash_failures.load(Ordering::Relaxed),
        }
    }
}

enum FileOutcome {
    Done(ScanResult),
    Skipped,
    HashFailed,
}

/// Hash → skip check → extract → detect for one file.
///
/// The hash is computed exactly once per scan pass and carried on the
/// result so the report writers never recompute it. Skipped files get no
/// extraction at all.
fn process_file(
    engine: &ExtractionEngine,
    analyzer: &PiiAnalyzer,
    previous: &PreviousHashIndex,
    record: &FileRecord,
) -> FileOutcome {
    let file_hash = match hash::hash_file(&record.path) {
        Ok(digest) => digest,
        Err(err) => {
            tracing::warn!("could not hash {}: {}", record.path.display(), err);
            return FileOutcome::HashFailed;
        }
    };

    if previous.contains_key(&file_hash) {
        tracing::info!("skipping {} (already scanned)", record.path.display());
        return FileOutcome::Skipped;
    }

    let text = engine.extract(&record.path, record.kind);
    let pii_data = if text.trim().is_empty() {
        Default::default()
    } else {
        analyzer.analyze(&text)
    };

    FileOutcome::Done(ScanResult {
        file_path: record.path.to_string_lossy().into_owned(),
        file_hash,
        pii_data,
    })
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::PatternSet;
    use std::fs;

    fn email_analyzer() -> PiiAnalyzer {
        PiiAnalyzer::new(
            PatternSet::from_patterns([(
                "email".to_string(),
                r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}".to_string(),
            )])
            .unwrap(),
        )
    }

    fn scan_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "contact me at a@b.com").unwrap();
        fs::write(dir.path().join("b.txt"), "no sensitive data").unwrap();
        fs::write(dir.path().join(".c.txt"), "hidden h@i.com").unwrap();
        dir
    }

    fn result_for<'a>(outcome: &'a ScanOutcome, name: &str) -> Option<&'a ScanResult> {
        outcome.results.iter().find(|r| r.file_path.ends_with(name))
    }

    #[tokio::test]
    async fn test_scan_detects_email_and_excludes_hidden() {
        let dir = scan_root();
        let config = ScanConfig::new(dir.path(), Some(0), false).unwrap();
        let scanner = Scanner::new(
            config,
            ExtractionEngine::new(),
            email_analyzer(),
            PreviousHashIndex::new(),
        )
        .with_workers(2);

        let outcome = scanner.run().await;
        assert_eq!(outcome.discovered, 2);
        assert_eq!(outcome.results.len(), 2);

        let a = result_for(&outcome, "a.txt").unwrap();
        assert_eq!(a.pii_data["email"], vec!["a@b.com"]);
        let b = result_for(&outcome, "b.txt").unwrap();
        assert!(b.pii_data.is_empty());
        assert!(result_for(&outcome, ".c.txt").is_none());
    }

    #[tokio::test]
    async fn test_previously_hashed_file_is_skipped() {
        let dir = scan_root();
        let a_path = dir.path().join("a.txt");
        let a_hash = hash::hash_file(&a_path).unwrap();

        let mut previous = PreviousHashIndex::new();
        // Path in the index is informational only; an old location must
        // still trigger the skip.
        previous.insert(a_hash, "/old/location/a.txt".to_string());

        let config = ScanConfig::new(dir.path(), Some(0), false).unwrap();
        let scanner = Scanner::new(config, ExtractionEngine::new(), email_analyzer(), previous);

        let outcome = scanner.run().await;
        assert_eq!(outcome.skipped, 1);
        assert!(result_for(&outcome, "a.txt").is_none());
        assert!(result_for(&outcome, "b.txt").is_some());
    }

    #[test]
    fn test_unhashable_file_excluded_and_siblings_still_processed() {
        use crate::mime::DocumentKind;

        let dir = scan_root();
        let engine = ExtractionEngine::new();
        let analyzer = email_analyzer();
        let previous = PreviousHashIndex::new();

        // A file that cannot be hashed is neither skipped nor reported.
        let bad = FileRecord {
            path: std::path::PathBuf::from("/nonexistent/unreadable.txt"),
            content_type: "text/plain".to_string(),
            kind: DocumentKind::Text,
        };
        assert!(matches!(
            process_file(&engine, &analyzer, &previous, &bad),
            FileOutcome::HashFailed
        ));

        // The failure is per-file: the next record processes normally.
        let good = FileRecord {
            path: dir.path().join("a.txt"),
            content_type: "text/plain".to_string(),
            kind: DocumentKind::Text,
        };
        let FileOutcome::Done(result) = process_file(&engine, &analyzer, &previous, &good) else {
            panic!("readable file should produce a result");
        };
        assert_eq!(result.pii_data["email"], vec!["a@b.com"]);
    }

    #[tokio::test]
    async fn test_hash_is_not_recomputed_for_results() {
        let dir = scan_root();
        let config = ScanConfig::new(dir.path(), Some(0), false).unwrap();
        let scanner = Scanner::new(
            config,
            ExtractionEngine::new(),
            email_analyzer(),
            PreviousHashIndex::new(),
        );

        let outcome = scanner.run().await;
        let a = result_for(&outcome, "a.txt").unwrap();
        assert_eq!(
            a.file_hash,
            hash::hash_file(&dir.path().join("a.txt")).unwrap()
        );
    }
}
