//! Price extraction for receipt lines.

use std::ops::Range;
use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::trace;

use super::FieldExtractor;
use super::patterns::{PRICE_BARE, PRICE_SPACED, PRICE_WITH_SYMBOL};

/// Candidate price notations, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceFamily {
    /// `$12.99`, `€ 12,99`
    CurrencySymbol,
    /// `12.99`, `12,99 EUR`, `1,234.56`
    Bare,
    /// `12 . 99` (OCR dropped whitespace around the decimal point)
    Spaced,
}

impl PriceFamily {
    pub const ORDER: [PriceFamily; 3] = [
        PriceFamily::CurrencySymbol,
        PriceFamily::Bare,
        PriceFamily::Spaced,
    ];

    fn pattern(&self) -> &'static Regex {
        match self {
            PriceFamily::CurrencySymbol => &*PRICE_WITH_SYMBOL,
            PriceFamily::Bare => &*PRICE_BARE,
            PriceFamily::Spaced => &*PRICE_SPACED,
        }
    }

    /// Leftmost occurrence of this family, not yet checked against bounds.
    fn candidate(&self, line: &str) -> Option<PriceMatch> {
        let caps = self.pattern().captures(line)?;
        let whole = caps.get(0)?;

        let amount = match self {
            PriceFamily::Spaced => Decimal::from_str(&format!("{}.{}", &caps[1], &caps[2])).ok()?,
            _ => normalize_amount(&caps[1])?,
        };

        Some(PriceMatch {
            amount,
            family: *self,
            start: whole.start(),
            end: whole.end(),
        })
    }
}

/// A validated amount and where it sits in the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceMatch {
    /// Parsed amount, `0 < amount < max_price`.
    pub amount: Decimal,
    /// Which notation matched.
    pub family: PriceFamily,
    /// Byte offset where the match (including any currency symbol) starts.
    pub start: usize,
    /// Byte offset just past the match.
    pub end: usize,
}

/// Price extractor.
pub struct PriceExtractor {
    max_price: Decimal,
}

impl PriceExtractor {
    pub fn new() -> Self {
        Self {
            max_price: Decimal::new(10_000, 0),
        }
    }

    /// Set the exclusive upper bound for plausible amounts.
    pub fn with_max_price(mut self, max_price: Decimal) -> Self {
        self.max_price = max_price;
        self
    }
}

impl Default for PriceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PriceExtractor {
    type Output = PriceMatch;

    fn extract(&self, line: &str) -> Option<PriceMatch> {
        // Text already read as an out-of-range amount stays out of range;
        // later families must not pick a fragment of it.
        let mut rejected: Vec<Range<usize>> = Vec::new();

        for family in PriceFamily::ORDER {
            let Some(found) = family.candidate(line) else {
                continue;
            };

            if rejected.iter().any(|r| found.start < r.end && r.start < found.end) {
                trace!("Skipped {:?} match inside rejected amount in {:?}", family, line);
                continue;
            }

            if found.amount <= Decimal::ZERO || found.amount >= self.max_price {
                trace!("Rejected {:?} amount {} in {:?}", family, found.amount, line);
                rejected.push(found.start..found.end);
                continue;
            }

            return Some(found);
        }

        None
    }
}

/// Extract the most plausible amount from a line using default bounds.
pub fn extract_price(line: &str) -> Option<Decimal> {
    PriceExtractor::new().extract(line).map(|m| m.amount)
}

/// Parse an amount written with `.` or `,` as the decimal separator,
/// optionally grouped (`1,234.56` or `1.234,56`).
pub fn normalize_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    // Whichever separator comes last is the decimal one
    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}
