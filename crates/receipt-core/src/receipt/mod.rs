//! Receipt text parsing: line classification and aggregation.

mod aggregate;
mod parser;
pub mod rules;

pub use aggregate::{aggregate, reinterpret_tax};
pub use parser::{RuleReceiptParser, confidence};

use crate::models::receipt::{ClassifiedLine, ParseOutcome, ParsedBillDraft};

/// Trait for receipt text parsers.
///
/// Implementations are pure: the same text always yields the same outcome,
/// and a parser can be shared across threads without locking.
pub trait ReceiptParser {
    /// Classify a single line of OCR text.
    fn classify_line(&self, line: &str) -> ClassifiedLine;

    /// Parse full OCR text into a draft plus per-line detail.
    fn parse(&self, text: &str) -> ParseOutcome;

    /// Parse full OCR text, keeping only the draft.
    fn parse_draft(&self, text: &str) -> ParsedBillDraft {
        self.parse(text).draft
    }
}

/// Parse OCR text with the default rule set.
pub fn parse_receipt_text(text: &str) -> ParsedBillDraft {
    RuleReceiptParser::new().parse_draft(text)
}

/// Split OCR text into trimmed, non-blank lines.
pub(crate) fn receipt_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}
