//! Explicitly scoped OCR sessions.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{OcrError, Result};
use crate::models::receipt::ParseOutcome;
use crate::receipt::ReceiptParser;

use super::{RecognizedText, TextRecognizer};

/// OCR text of one image plus what the parser made of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Raw recognizer output.
    pub ocr: RecognizedText,

    /// Parsed receipt.
    pub outcome: ParseOutcome,
}

/// An open OCR engine.
///
/// The session owns its recognizer from [`open`](Self::open) until
/// [`close`](Self::close) (or drop). Calls after closing fail with
/// [`OcrError::SessionClosed`].
pub struct OcrSession<R: TextRecognizer> {
    recognizer: Option<R>,
}

impl<R: TextRecognizer> OcrSession<R> {
    /// Open a session around a ready recognizer.
    pub fn open(recognizer: R) -> Self {
        info!("OCR session opened");
        Self {
            recognizer: Some(recognizer),
        }
    }

    pub fn is_open(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Recognize the text in an image.
    pub fn recognize(&self, image: &DynamicImage) -> std::result::Result<RecognizedText, OcrError> {
        let recognizer = self.recognizer.as_ref().ok_or(OcrError::SessionClosed)?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        let start = Instant::now();
        let result = recognizer.recognize(image)?;
        debug!(
            "Recognized {} lines from {}x{} image in {}ms (confidence {:.2})",
            result.text.lines().count(),
            width,
            height,
            start.elapsed().as_millis(),
            result.confidence
        );

        Ok(result)
    }

    /// Recognize an image and parse the text as a receipt.
    pub fn scan<P: ReceiptParser + ?Sized>(
        &self,
        image: &DynamicImage,
        parser: &P,
    ) -> std::result::Result<ScanResult, OcrError> {
        let ocr = self.recognize(image)?;
        let outcome = parser.parse(&ocr.text);
        Ok(ScanResult { ocr, outcome })
    }

    /// Load an image file and scan it.
    pub fn scan_path<P: ReceiptParser + ?Sized>(&self, path: &Path, parser: &P) -> Result<ScanResult> {
        let image = image::open(path)?;
        Ok(self.scan(&image, parser)?)
    }

    /// Close the session and release the recognizer. Closing twice is a no-op.
    pub fn close(&mut self) {
        if let Some(mut recognizer) = self.recognizer.take() {
            recognizer.shutdown();
            info!("OCR session closed");
        }
    }
}

impl<R: TextRecognizer> Drop for OcrSession<R> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Scan one image through an open session.
pub fn scan_receipt<R: TextRecognizer, P: ReceiptParser + ?Sized>(
    session: &OcrSession<R>,
    image: &DynamicImage,
    parser: &P,
) -> std::result::Result<ScanResult, OcrError> {
    session.scan(image, parser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReceiptError;
    use crate::receipt::RuleReceiptParser;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRecognizer {
        text: &'static str,
        shutdowns: Arc<AtomicUsize>,
    }

    impl FixedRecognizer {
        fn new(text: &'static str) -> (Self, Arc<AtomicUsize>) {
            let shutdowns = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    text,
                    shutdowns: shutdowns.clone(),
                },
                shutdowns,
            )
        }
    }

    impl TextRecognizer for FixedRecognizer {
        fn recognize(&self, _image: &DynamicImage) -> std::result::Result<RecognizedText, OcrError> {
            Ok(RecognizedText {
                text: self.text.to_string(),
                confidence: 0.9,
            })
        }

        fn shutdown(&mut self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FailingRecognizer;

    impl TextRecognizer for FailingRecognizer {
        fn recognize(&self, _image: &DynamicImage) -> std::result::Result<RecognizedText, OcrError> {
            Err(OcrError::Recognition("engine crashed".to_string()))
        }
    }

    fn image() -> DynamicImage {
        DynamicImage::new_rgb8(4, 4)
    }

    #[test]
    fn test_scan_parses_recognized_text() {
        let (recognizer, _) = FixedRecognizer::new("Burger 12.99\nFries 4.50\nTotal 17.49");
        let session = OcrSession::open(recognizer);

        let result = scan_receipt(&session, &image(), &RuleReceiptParser::new()).unwrap();

        assert_eq!(result.ocr.confidence, 0.9);
        assert_eq!(result.outcome.draft.items.len(), 2);
        assert_eq!(result.outcome.draft.total, Some("17.49".parse().unwrap()));
    }

    #[test]
    fn test_closed_session_rejects_calls() {
        let (recognizer, shutdowns) = FixedRecognizer::new("Burger 12.99");
        let mut session = OcrSession::open(recognizer);
        assert!(session.is_open());

        session.close();
        session.close();

        assert!(!session.is_open());
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
        assert!(matches!(session.recognize(&image()), Err(OcrError::SessionClosed)));
    }

    #[test]
    fn test_drop_closes_session() {
        let (recognizer, shutdowns) = FixedRecognizer::new("");
        {
            let _session = OcrSession::open(recognizer);
        }
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_image_is_invalid() {
        let (recognizer, _) = FixedRecognizer::new("Burger 12.99");
        let session = OcrSession::open(recognizer);

        let err = session.recognize(&DynamicImage::new_rgb8(0, 0)).unwrap_err();
        assert!(matches!(err, OcrError::InvalidImage(_)));
    }

    #[test]
    fn test_recognizer_errors_propagate() {
        let session = OcrSession::open(FailingRecognizer);
        let err = session.scan(&image(), &RuleReceiptParser::new()).unwrap_err();
        assert!(matches!(err, OcrError::Recognition(_)));
    }

    #[test]
    fn test_scan_path_missing_file() {
        let (recognizer, _) = FixedRecognizer::new("");
        let session = OcrSession::open(recognizer);

        let err = session
            .scan_path(Path::new("/nonexistent/receipt.png"), &RuleReceiptParser::new())
            .unwrap_err();
        assert!(matches!(err, ReceiptError::Image(_) | ReceiptError::Io(_)));
    }
}
