//! Scan command - OCR a receipt photo and parse the text.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use receipt_core::{OcrSession, PureOcrRecognizer, RuleReceiptParser};

use super::load_config;
use super::output::{OutputFormat, format_draft, format_line_confidence};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Receipt image (PNG, JPEG, ...)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory (overrides config)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Print the raw OCR text before the parsed result
    #[arg(long)]
    show_text: bool,

    /// Show OCR and per-line confidence
    #[arg(long)]
    show_confidence: bool,

    /// Cross-check items, subtotal, tax and total
    #[arg(long)]
    validate: bool,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let models = match &args.model_dir {
        Some(dir) => config.models.with_model_dir(dir),
        None => config.models.clone(),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);

    pb.set_message("Loading OCR models...");
    let recognizer = PureOcrRecognizer::from_models(&models, config.ocr.clone())
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;
    let mut session = OcrSession::open(recognizer);

    pb.set_message("Running OCR...");
    let parser = RuleReceiptParser::with_config(config.parser);
    let result = session.scan_path(&args.input, &parser);
    session.close();

    pb.finish_and_clear();
    let result = result?;

    info!(
        "Scanned {}: {} items",
        args.input.display(),
        result.outcome.draft.items.len()
    );

    if result.ocr.text.trim().is_empty() {
        anyhow::bail!("No text detected in image");
    }

    if args.show_text {
        println!("{}", style("OCR text:").bold());
        println!("{}", result.ocr.text);
        println!();
    }

    if args.validate {
        let issues = result.outcome.draft.check_consistency();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_draft(&result.outcome.draft, args.format, 0.0)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} OCR confidence: {:.1}%",
            style("ℹ").blue(),
            result.ocr.confidence * 100.0
        );
        print!("{}", format_line_confidence(&result.outcome));
    }

    Ok(())
}
