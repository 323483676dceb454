//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod output;
pub mod parse;
#[cfg(feature = "native")]
pub mod scan;

use std::path::{Path, PathBuf};

use tracing::debug;

use receipt_core::ReceiptConfig;

/// Config file location: `--config` if given, else the per-user default.
pub fn config_path(config_override: Option<&str>) -> PathBuf {
    match config_override {
        Some(path) => PathBuf::from(path),
        None => dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("receipt")
            .join("config.json"),
    }
}

/// Read the config file at `path`, `None` when there is no file.
pub fn read_config(path: &Path) -> anyhow::Result<Option<ReceiptConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    debug!("Loading config from {}", path.display());
    Ok(Some(ReceiptConfig::from_file(path)?))
}

/// Load the config file, falling back to defaults when it does not exist.
///
/// An explicit `--config` that does not exist is an error.
pub fn load_config(config_override: Option<&str>) -> anyhow::Result<ReceiptConfig> {
    let path = config_path(config_override);

    match read_config(&path)? {
        Some(config) => Ok(config),
        None if config_override.is_some() => {
            anyhow::bail!("Config file not found: {}", path.display())
        }
        None => Ok(ReceiptConfig::default()),
    }
}
