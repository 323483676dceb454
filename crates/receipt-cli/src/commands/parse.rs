//! Parse command - turn receipt text into a bill draft.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use receipt_core::{ReceiptParser, RuleReceiptParser};

use super::load_config;
use super::output::{OutputFormat, format_draft, format_line_confidence};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input text file, or "-" for stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show per-line classification and confidence
    #[arg(long)]
    show_confidence: bool,

    /// Cross-check items, subtotal, tax and total
    #[arg(long)]
    validate: bool,

    /// Hide items below this confidence in CSV and text output
    #[arg(long, default_value = "0.0")]
    min_confidence: f32,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let text = read_input(&args.input)?;
    info!("Parsing {} bytes of receipt text", text.len());

    let parser = RuleReceiptParser::with_config(config.parser);
    let outcome = parser.parse(&text);

    for warning in &outcome.warnings {
        debug!("{}", warning);
    }

    if args.validate {
        let issues = outcome.draft.check_consistency();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_draft(&outcome.draft, args.format, args.min_confidence)?;

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
        println!("{} Line classification:", style("ℹ").blue());
        print!("{}", format_line_confidence(&outcome));
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    Ok(fs::read_to_string(input)?)
}
