//! Configuration structures for the receipt pipeline.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ReceiptError, Result};

/// Main configuration for the receipt pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptConfig {
    /// Line parser configuration.
    pub parser: ParserConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// Tunables for the line parser.
///
/// The defaults are the values the heuristics were calibrated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Amounts at or above this are rejected as implausible.
    #[serde(with = "rust_decimal::serde::float")]
    pub max_price: Decimal,

    /// Lowest implied tax rate (percent) read as a percentage.
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate_min: Decimal,

    /// Highest implied tax rate (percent) read as a percentage.
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate_max: Decimal,

    /// Reinterpret the tax amount as a rate when it fits the range above.
    pub reclassify_tax: bool,

    /// Name used for item lines whose name could not be recovered.
    pub placeholder_name: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_price: Decimal::new(10_000, 0),
            tax_rate_min: Decimal::new(5, 0),
            tax_rate_max: Decimal::new(20, 0),
            reclassify_tax: true,
            placeholder_name: "Unknown Item".to_string(),
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Keep `[UNK]` tokens emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,

    /// Drop recognized regions below this confidence (0.0 - 1.0).
    pub min_region_confidence: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            keep_unk: false,
            min_region_confidence: 0.0, // CTC scores are low on thermal paper
        }
    }
}

/// Model file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl ModelConfig {
    /// Copy of this config pointing at another model directory.
    pub fn with_model_dir(&self, model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..self.clone()
        }
    }

    pub fn detection_path(&self) -> PathBuf {
        self.model_dir.join(&self.detection_model)
    }

    pub fn recognition_path(&self) -> PathBuf {
        self.model_dir.join(&self.recognition_model)
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.model_dir.join(&self.dictionary)
    }

    /// Whether all model files are present on disk.
    pub fn is_available(&self) -> bool {
        self.detection_path().exists()
            && self.recognition_path().exists()
            && self.dictionary_path().exists()
    }
}

impl ReceiptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ReceiptError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ReceiptError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
