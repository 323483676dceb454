//! Error types for the receipt-core library.
//!
//! Parsing itself never fails; these cover the fallible edges around it
//! (OCR sessions, configuration files, image decoding).

use thiserror::Error;

/// Main error type for the receipt library.
#[derive(Error, Debug)]
pub enum ReceiptError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The session was closed before the call.
    #[error("OCR session is closed")]
    SessionClosed,
}

/// Result type for the receipt library.
pub type Result<T> = std::result::Result<T, ReceiptError>;
