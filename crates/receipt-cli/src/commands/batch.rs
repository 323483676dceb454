//! Batch processing command for multiple receipt text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::StreamExt;
use futures_util::stream;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use receipt_core::{ParseOutcome, ReceiptParser, RuleReceiptParser};

use super::load_config;
use super::output::{OutputFormat, format_draft};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    outcome: Result<ParseOutcome, String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "txt" | "text")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(RuleReceiptParser::with_config(config.parser));

    // Parsing is CPU-bound; run it on the blocking pool, at most `jobs` at once.
    // `buffered` keeps results in input order.
    let mut pending = stream::iter(files)
        .map(|path| {
            let parser = Arc::clone(&parser);
            async move {
                let file_start = Instant::now();
                let task_path = path.clone();
                let outcome = tokio::task::spawn_blocking(move || parse_file(&task_path, parser.as_ref()))
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|r| r.map_err(|e| e.to_string()));

                FileResult {
                    path,
                    outcome,
                    processing_time_ms: file_start.elapsed().as_millis() as u64,
                }
            }
        })
        .buffered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(result) = pending.next().await {
        pb.inc(1);

        match &result.outcome {
            Ok(outcome) => {
                if let Some(output_dir) = &args.output_dir {
                    write_output(output_dir, &result.path, outcome, args.format)?;
                }
            }
            Err(error_msg) => {
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", result.path.display(), error_msg);
                } else {
                    pb.abandon();
                    error!("Failed to process {}: {}", result.path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        results.push(result);
    }

    pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<&FileResult> = results.iter().filter(|r| r.outcome.is_err()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(error_msg) = &result.outcome {
                println!("  - {}: {}", result.path.display(), error_msg);
            }
        }
    }

    Ok(())
}

fn parse_file(path: &Path, parser: &RuleReceiptParser) -> anyhow::Result<ParseOutcome> {
    // Blank files parse to an empty draft like any other unreadable text
    let text = fs::read_to_string(path)?;
    Ok(parser.parse(&text))
}

fn write_output(
    output_dir: &Path,
    source: &Path,
    outcome: &ParseOutcome,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let output_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("receipt");

    let output_path = output_dir.join(format!("{}.{}", output_name, format.extension()));
    fs::write(&output_path, format_draft(&outcome.draft, format, 0.0)?)?;
    debug!("Wrote output to {}", output_path.display());

    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "items",
        "subtotal",
        "tax",
        "total",
        "issues",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &result.outcome {
            Ok(outcome) => {
                let draft = &outcome.draft;
                let tax = draft
                    .tax
                    .map(|t| match draft.subtotal {
                        Some(subtotal) => t.amount_on(subtotal).round_dp(2).to_string(),
                        None => t.value.to_string(),
                    })
                    .unwrap_or_default();

                wtr.write_record([
                    filename,
                    "success",
                    &draft.items.len().to_string(),
                    &draft.subtotal.map(|d| d.to_string()).unwrap_or_default(),
                    &tax,
                    &draft.total.map(|d| d.to_string()).unwrap_or_default(),
                    &draft.check_consistency().join("; "),
                    &result.processing_time_ms.to_string(),
                    "",
                ])?;
            }
            Err(error_msg) => {
                wtr.write_record([
                    filename,
                    "error",
                    "",
                    "",
                    "",
                    "",
                    "",
                    &result.processing_time_ms.to_string(),
                    error_msg,
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
