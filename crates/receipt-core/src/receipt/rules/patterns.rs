//! Common regex patterns for receipt line extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Summary line keywords, whole words only
    pub static ref TAX_KEYWORDS: Regex = Regex::new(
        r"(?i)\b(?:tax|gst|vat|hst|sales tax)\b"
    ).unwrap();

    pub static ref SUBTOTAL_KEYWORDS: Regex = Regex::new(
        r"(?i)\b(?:subtotal|sub total|sub-total)\b"
    ).unwrap();

    pub static ref TOTAL_KEYWORDS: Regex = Regex::new(
        r"(?i)\b(?:total|amount due|balance due|grand total)\b"
    ).unwrap();

    // Price patterns ($12.99, 12,99 EUR, 1,234.56, 12 . 99)
    pub static ref PRICE_WITH_SYMBOL: Regex = Regex::new(
        r"[$€£]\s*(\d{1,2},\d{3}\.\d{2}|\d{1,2}\.\d{3},\d{2}|\d{1,5}[.,]\d{2})"
    ).unwrap();

    pub static ref PRICE_BARE: Regex = Regex::new(
        r"(\d{1,2},\d{3}\.\d{2}|\d{1,2}\.\d{3},\d{2}|\d{1,5}[.,]\d{2})(?:\s*(?:(?i:usd|eur|gbp)\b|[$€£]))?"
    ).unwrap();

    pub static ref PRICE_SPACED: Regex = Regex::new(
        r"(\d{1,5})\s*\.\s*(\d{2})"
    ).unwrap();

    // Quantity markers (2x Pizza, 3 Beers, Salad x2)
    pub static ref QTY_LEADING_MULTIPLIER: Regex = Regex::new(
        r"(?i)^(\d+)\s*x\s+(.+)$"
    ).unwrap();

    pub static ref QTY_LEADING_COUNT: Regex = Regex::new(
        r"^(\d+)\s+(.+)$"
    ).unwrap();

    pub static ref QTY_TRAILING_MULTIPLIER: Regex = Regex::new(
        r"(?i)^(.+)\s+x\s*(\d+)$"
    ).unwrap();

    // Dot/dash leaders between name and price column
    pub static ref LEADER_TAIL: Regex = Regex::new(
        r"(?:\.{2,}|-{2,})[\s.\-]*$"
    ).unwrap();
}

/// Currency symbols recognized in front of (or after) an amount.
pub const CURRENCY_SYMBOLS: [char; 3] = ['$', '€', '£'];
