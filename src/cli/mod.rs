//! CLI parser and command implementations.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::ScanConfig;
use crate::detect::{MergePolicy, PatternSet, PiiAnalyzer};
use crate::extract::{ExtractionEngine, OcrBackend, TesseractBackend};
use crate::models::PreviousHashIndex;
use crate::report;
use crate::scan::{ScanOutcome, Scanner};

#[derive(Parser)]
#[command(name = "piiscan")]
#[command(about = "Scan a directory tree for documents containing PII")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory and write CSV/JSON reports of PII findings
    Scan {
        /// Directory to scan
        path: PathBuf,

        /// Maximum depth below the root (0 scans only the root's immediate
        /// children). Unlimited when omitted.
        #[arg(long)]
        max_depth: Option<usize>,

        /// Include hidden files and directories
        #[arg(long)]
        include_hidden: bool,

        /// Prior report (CSV or JSON) whose hashes are skipped this pass
        #[arg(long)]
        previous: Option<PathBuf>,

        /// JSON file of named regex patterns
        #[arg(long, default_value = "data/regex_patterns.json")]
        patterns: PathBuf,

        /// CSV report output path
        #[arg(long, default_value = "pii_results.csv")]
        csv: PathBuf,

        /// JSON report output path
        #[arg(long, default_value = "pii_results.json")]
        json: PathBuf,

        /// Worker count (defaults to available parallelism)
        #[arg(long)]
        workers: Option<usize>,

        /// How colliding detector categories are combined
        #[arg(long, value_enum, default_value = "overwrite")]
        merge_policy: MergePolicy,
    },
}

/// Peek at argv for the verbose flag before full parsing, so logging can
/// be initialized first.
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            path,
            max_depth,
            include_hidden,
            previous,
            patterns,
            csv,
            json,
            workers,
            merge_policy,
        } => {
            cmd_scan(ScanArgs {
                path,
                max_depth,
                include_hidden,
                previous,
                patterns,
                csv,
                json,
                workers,
                merge_policy,
            })
            .await
        }
    }
}

struct ScanArgs {
    path: PathBuf,
    max_depth: Option<usize>,
    include_hidden: bool,
    previous: Option<PathBuf>,
    patterns: PathBuf,
    csv: PathBuf,
    json: PathBuf,
    workers: Option<usize>,
    merge_policy: MergePolicy,
}

async fn cmd_scan(args: ScanArgs) -> anyhow::Result<()> {
    // Parameter validation happens before any file processing; this is the
    // only point where a scan can fail outright.
    let config = ScanConfig::new(args.path, args.max_depth, args.include_hidden)?;

    let previous = args
        .previous
        .as_deref()
        .map(report::load_previous_hashes)
        .unwrap_or_default();
    if !previous.is_empty() {
        println!(
            "{} Skipping {} previously scanned files by content hash",
            style("→").cyan(),
            previous.len()
        );
    }

    let pattern_set = PatternSet::load(&args.patterns);
    if pattern_set.is_empty() {
        println!(
            "{} No regex patterns loaded; relying on entity detection only",
            style("!").yellow()
        );
    }

    let tesseract = TesseractBackend::new();
    if !tesseract.is_available() {
        println!(
            "{} OCR unavailable: {}",
            style("!").yellow(),
            tesseract.availability_hint()
        );
    }

    let analyzer = PiiAnalyzer::new(pattern_set).with_merge_policy(args.merge_policy);
    let engine = ExtractionEngine::new();

    let mut scanner = Scanner::new(config, engine, analyzer, previous).with_progress(true);
    if let Some(workers) = args.workers {
        scanner = scanner.with_workers(workers);
    }

    let outcome = scanner.run().await;
    if outcome.discovered == 0 {
        println!("{} No valid files detected", style("!").yellow());
        return Ok(());
    }

    report::write_csv(&outcome.results, &args.csv)?;
    report::write_json(&outcome.results, &args.json)?;

    display_summary(&outcome);
    println!(
        "{} Reports written to {} and {}",
        style("✓").green(),
        args.csv.display(),
        args.json.display()
    );
    Ok(())
}

fn display_summary(outcome: &ScanOutcome) {
    println!("\n=== PII Detection Summary ===");
    for result in &outcome.results {
        if result.has_findings() {
            println!(
                "{} {}",
                style("[PII DETECTED]").red().bold(),
                result.file_path
            );
            for (category, values) in &result.pii_data {
                println!("  - {}: {}", category.to_uppercase(), values.join(", "));
            }
        } else {
            println!("{} {}", style("[NO PII FOUND]").green(), result.file_path);
        }
    }

    println!(
        "\n{} files discovered, {} processed, {} skipped, {} unreadable",
        outcome.discovered,
        outcome.results.len(),
        outcome.skipped,
        outcome.hash_failures
    );
}
