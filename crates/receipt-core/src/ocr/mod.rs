//! Boundary to the OCR engine that turns receipt photos into text.
//!
//! The engine itself lives outside this crate. Callers plug one in through
//! [`TextRecognizer`] and drive it inside an explicitly scoped
//! [`OcrSession`].

#[cfg(feature = "native")]
mod pure_engine;
mod regions;
mod session;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrRecognizer;
pub use regions::{ROW_HEIGHT, TextRegion, assemble_text};
pub use session::{OcrSession, ScanResult, scan_receipt};

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Text read from one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedText {
    /// Recognized text, one receipt row per line.
    pub text: String,

    /// Overall recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

/// An OCR engine that can read text from an image.
pub trait TextRecognizer {
    /// Recognize the text in an image.
    fn recognize(&self, image: &DynamicImage) -> Result<RecognizedText, OcrError>;

    /// Release engine resources. Called once when the owning session closes.
    fn shutdown(&mut self) {}
}
