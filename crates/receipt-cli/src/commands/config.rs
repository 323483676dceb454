//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use receipt_core::ReceiptConfig;

use super::{config_path, read_config};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "parser.max_price")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_override: Option<&str>) -> anyhow::Result<()> {
    let path = config_path(config_override);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

/// Stored config as a JSON tree, defaults when no file exists yet.
fn config_tree(path: &Path) -> anyhow::Result<(serde_json::Value, bool)> {
    let stored = read_config(path)?;
    let exists = stored.is_some();
    Ok((serde_json::to_value(stored.unwrap_or_default())?, exists))
}

fn key_not_found(key: &str) -> anyhow::Error {
    anyhow::anyhow!("Configuration key not found: {}", key)
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    let (tree, exists) = config_tree(path)?;
    if !exists {
        eprintln!("{} No config file at {}, showing defaults.", style("ℹ").blue(), path.display());
    }

    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}

fn init_config(args: InitArgs, default_path: PathBuf) -> anyhow::Result<()> {
    let target = args.output.unwrap_or(default_path);

    if target.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            target.display()
        );
    }
    if let Some(dir) = target.parent() {
        fs::create_dir_all(dir)?;
    }

    ReceiptConfig::default().save(&target)?;
    println!("{} Created configuration file at {}", style("✓").green(), target.display());
    Ok(())
}

fn get_config(path: &Path, key: &str) -> anyhow::Result<()> {
    let (tree, _) = config_tree(path)?;

    let value = key
        .split('.')
        .try_fold(&tree, |node, part| node.get(part))
        .ok_or_else(|| key_not_found(key))?;

    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn set_config(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let (mut tree, _) = config_tree(path)?;

    // Anything that is not valid JSON is stored as a string
    let value = serde_json::from_str(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));

    let (section, field) = match key.rsplit_once('.') {
        Some((section, field)) => (Some(section), field),
        None => (None, key),
    };

    let node = section
        .into_iter()
        .flat_map(|s| s.split('.'))
        .try_fold(&mut tree, |node, part| node.get_mut(part))
        .and_then(|node| node.as_object_mut())
        .ok_or_else(|| key_not_found(key))?;

    // Only existing keys can be set; the config has no free-form fields
    let slot = node.get_mut(field).ok_or_else(|| key_not_found(key))?;
    *slot = value.clone();

    let config: ReceiptConfig = serde_json::from_value(tree)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    config.save(path)?;

    println!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!("\nRun 'receipt config init' to create it.");
    }
    Ok(())
}
