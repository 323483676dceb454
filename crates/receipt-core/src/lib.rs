//! Core library for receipt OCR text parsing.
//!
//! This crate provides:
//! - Line classification of OCR receipt text (item, tax, subtotal, total)
//! - Price, quantity and item name extraction tolerant of OCR noise
//! - Aggregation into a [`ParsedBillDraft`] with tax rate disambiguation
//! - An explicitly scoped OCR session boundary for image scanning

pub mod error;
pub mod models;
pub mod ocr;
pub mod receipt;

pub use error::{OcrError, ReceiptError, Result};
pub use models::config::{ParserConfig, ReceiptConfig};
pub use models::receipt::{
    ClassifiedLine, DetectedTax, ItemDraft, LineKind, ParseOutcome, ParsedBillDraft, TaxKind,
};
pub use ocr::{OcrSession, RecognizedText, ScanResult, TextRecognizer, scan_receipt};
#[cfg(feature = "native")]
pub use ocr::PureOcrRecognizer;
pub use receipt::{ReceiptParser, RuleReceiptParser, parse_receipt_text};
pub use rust_decimal::Decimal;
