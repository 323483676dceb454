//! Rule-based receipt parser.

use tracing::{debug, trace};

use crate::models::config::ParserConfig;
use crate::models::receipt::{ClassifiedLine, LineKind, ParseOutcome};

use super::aggregate::aggregate;
use super::rules::{FieldExtractor, ItemExtractor, KeywordClassifier, PriceExtractor};
use super::{ReceiptParser, receipt_lines};

/// Per-line confidence weights.
///
/// These are heuristic weights reflecting how many fallbacks fired, not
/// probabilities.
pub mod confidence {
    /// Summary keyword and an amount.
    pub const SUMMARY_WITH_PRICE: f32 = 0.8;
    /// Item with a name taken from the line.
    pub const ITEM: f32 = 0.7;
    /// Item whose name fell back to the placeholder.
    pub const ITEM_PLACEHOLDER_NAME: f32 = 0.4;
    /// Summary keyword without an amount.
    pub const SUMMARY_WITHOUT_PRICE: f32 = 0.3;
    /// Nothing matched.
    pub const UNKNOWN: f32 = 0.1;
}

/// Parser that classifies each line independently with keyword and shape rules.
pub struct RuleReceiptParser {
    keywords: KeywordClassifier,
    prices: PriceExtractor,
    items: ItemExtractor,
    config: ParserConfig,
}

impl RuleReceiptParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a parser from configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            keywords: KeywordClassifier::new(),
            prices: PriceExtractor::new().with_max_price(config.max_price),
            items: ItemExtractor::new()
                .with_max_price(config.max_price)
                .with_placeholder_name(config.placeholder_name.clone()),
            config,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

impl Default for RuleReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptParser for RuleReceiptParser {
    fn classify_line(&self, line: &str) -> ClassifiedLine {
        let text = line.trim();

        // Summary keywords win over item shape: "Grand Total 22.12" is not an item
        if let Some(kind) = self.keywords.extract(text) {
            let price = self.prices.extract(text).map(|m| m.amount);
            trace!("{:?} -> {} (price {:?})", text, kind.label(), price);
            return ClassifiedLine {
                text: text.to_string(),
                kind,
                price,
                quantity: None,
                name: None,
                confidence: if price.is_some() {
                    confidence::SUMMARY_WITH_PRICE
                } else {
                    confidence::SUMMARY_WITHOUT_PRICE
                },
            };
        }

        if let Some(item) = self.items.extract(text) {
            trace!("{:?} -> item {:?} x{} @ {}", text, item.name, item.quantity, item.price);
            return ClassifiedLine {
                text: text.to_string(),
                kind: LineKind::Item,
                price: Some(item.price),
                quantity: Some(item.quantity),
                name: Some(item.name),
                confidence: if item.placeholder {
                    confidence::ITEM_PLACEHOLDER_NAME
                } else {
                    confidence::ITEM
                },
            };
        }

        trace!("{:?} -> unknown", text);
        ClassifiedLine {
            text: text.to_string(),
            kind: LineKind::Unknown,
            price: None,
            quantity: None,
            name: None,
            confidence: confidence::UNKNOWN,
        }
    }

    fn parse(&self, text: &str) -> ParseOutcome {
        let lines: Vec<ClassifiedLine> = receipt_lines(text)
            .map(|line| self.classify_line(line))
            .collect();

        let (draft, warnings) = aggregate(&lines, &self.config);

        debug!(
            "Parsed {} lines into {} items (tax: {}, subtotal: {}, total: {})",
            lines.len(),
            draft.items.len(),
            draft.tax.is_some(),
            draft.subtotal.is_some(),
            draft.total.is_some()
        );

        ParseOutcome {
            draft,
            lines,
            warnings,
        }
    }
}
