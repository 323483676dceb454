//! Pure Rust OCR backend using `pure-onnx-ocr`.

use image::DynamicImage;
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

use super::{ROW_HEIGHT, RecognizedText, TextRecognizer, TextRegion, assemble_text};

/// Recognizer backed by `pure-onnx-ocr` (no external ONNX Runtime).
pub struct PureOcrRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrRecognizer {
    /// Load detection and recognition models from disk.
    pub fn from_models(models: &ModelConfig, config: OcrConfig) -> Result<Self, OcrError> {
        if !models.is_available() {
            return Err(OcrError::ModelLoad(format!(
                "model files not found in {} (expected {}, {}, {})",
                models.model_dir.display(),
                models.detection_model,
                models.recognition_model,
                models.dictionary
            )));
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&models.detection_path())
            .rec_model_path(&models.recognition_path())
            .dictionary_path(&models.dictionary_path())
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", models.model_dir.display());

        Ok(Self { engine, config })
    }
}

impl TextRecognizer for PureOcrRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<RecognizedText, OcrError> {
        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let regions: Vec<TextRegion> = results
            .iter()
            .filter(|r| r.confidence >= self.config.min_region_confidence)
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                TextRegion {
                    text: if self.config.keep_unk {
                        r.text.clone()
                    } else {
                        r.text.replace("[UNK]", " ")
                    },
                    confidence: r.confidence,
                    x,
                    y,
                }
            })
            .collect();

        Ok(assemble_text(regions, ROW_HEIGHT))
    }
}

/// Top-left corner of a detection polygon.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .fold((f32::INFINITY, f32::INFINITY), |(x, y), c| {
            (x.min(c.x as f32), y.min(c.y as f32))
        })
}
