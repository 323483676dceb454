//! Keyword classification of summary lines (tax, subtotal, total).

use regex::Regex;

use crate::models::receipt::LineKind;

use super::FieldExtractor;
use super::patterns::{SUBTOTAL_KEYWORDS, TAX_KEYWORDS, TOTAL_KEYWORDS};

/// Matches summary keywords in priority order: tax, subtotal, total.
///
/// Tax comes first so "Total Tax" is a tax line, and subtotal precedes total
/// so "Sub-Total" is never read as a grand total.
pub struct KeywordClassifier {
    rules: [(LineKind, &'static Regex); 3],
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self {
            rules: [
                (LineKind::Tax, &*TAX_KEYWORDS),
                (LineKind::Subtotal, &*SUBTOTAL_KEYWORDS),
                (LineKind::Total, &*TOTAL_KEYWORDS),
            ],
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for KeywordClassifier {
    type Output = LineKind;

    fn extract(&self, line: &str) -> Option<LineKind> {
        self.rules
            .iter()
            .find(|(_, pattern)| pattern.is_match(line))
            .map(|(kind, _)| *kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> Option<LineKind> {
        KeywordClassifier::new().extract(line)
    }

    #[test]
    fn test_tax_keywords() {
        assert_eq!(classify("Tax 1.64"), Some(LineKind::Tax));
        assert_eq!(classify("GST 5%"), Some(LineKind::Tax));
        assert_eq!(classify("vat 2.00"), Some(LineKind::Tax));
        assert_eq!(classify("HST"), Some(LineKind::Tax));
        assert_eq!(classify("Sales Tax 3.10"), Some(LineKind::Tax));
        assert_eq!(classify("TAX (8%)   5.03"), Some(LineKind::Tax));
    }

    #[test]
    fn test_subtotal_keywords() {
        assert_eq!(classify("Subtotal 20.48"), Some(LineKind::Subtotal));
        assert_eq!(classify("SUB TOTAL 20.48"), Some(LineKind::Subtotal));
        assert_eq!(classify("Sub-Total 20.48"), Some(LineKind::Subtotal));
    }

    #[test]
    fn test_total_keywords() {
        assert_eq!(classify("Total 22.12"), Some(LineKind::Total));
        assert_eq!(classify("Grand Total 22.12"), Some(LineKind::Total));
        assert_eq!(classify("AMOUNT DUE 22.12"), Some(LineKind::Total));
        assert_eq!(classify("Balance due: $22.12"), Some(LineKind::Total));
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(classify("Total Tax 3.00"), Some(LineKind::Tax));
        assert_eq!(classify("Subtotal before tax 20.00"), Some(LineKind::Tax));
        assert_eq!(classify("2x Total Burger 25.98"), Some(LineKind::Total));
    }

    #[test]
    fn test_whole_words_only() {
        assert_eq!(classify("Taxi voucher 12.00"), None);
        assert_eq!(classify("Totally Nuts 3.50"), None);
        assert_eq!(classify("Vatican Pizza 9.99"), None);
        assert_eq!(classify("Burger 12.99"), None);
    }
}
