//! Receipt data models handed to the item store and cost-splitting code.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of a single receipt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Purchased item with a price.
    Item,
    /// Tax line (TAX, GST, VAT, HST).
    Tax,
    /// Subtotal before tax.
    Subtotal,
    /// Grand total / amount due.
    Total,
    /// Anything else (headers, addresses, footers).
    Unknown,
}

impl LineKind {
    /// Whether this kind is one of the summary lines (tax, subtotal, total).
    pub fn is_summary(&self) -> bool {
        matches!(self, LineKind::Tax | LineKind::Subtotal | LineKind::Total)
    }

    /// Lowercase label used in text output and warnings.
    pub fn label(&self) -> &'static str {
        match self {
            LineKind::Item => "item",
            LineKind::Tax => "tax",
            LineKind::Subtotal => "subtotal",
            LineKind::Total => "total",
            LineKind::Unknown => "unknown",
        }
    }
}

/// Result of classifying one trimmed, non-empty line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedLine {
    /// The trimmed source line.
    pub text: String,

    /// Line classification.
    pub kind: LineKind,

    /// Extracted amount, always within the plausible price range.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,

    /// Extracted quantity (item lines only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    /// Derived item name (item lines only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Heuristic extraction weight (0.0 - 1.0).
    pub confidence: f32,
}

/// How a detected tax value should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxKind {
    /// Value is a rate in percent of the subtotal.
    Percentage,
    /// Value is a currency amount.
    Absolute,
}

/// Tax detected on the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedTax {
    /// Percentage or absolute amount.
    pub kind: TaxKind,

    /// Rate (percent) or amount, depending on `kind`.
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

impl DetectedTax {
    pub fn absolute(value: Decimal) -> Self {
        Self {
            kind: TaxKind::Absolute,
            value,
        }
    }

    pub fn percentage(value: Decimal) -> Self {
        Self {
            kind: TaxKind::Percentage,
            value,
        }
    }

    /// Tax as a currency amount for the given subtotal.
    pub fn amount_on(&self, subtotal: Decimal) -> Decimal {
        match self.kind {
            TaxKind::Absolute => self.value,
            TaxKind::Percentage => subtotal * self.value / Decimal::ONE_HUNDRED,
        }
    }
}

/// An item extracted from the receipt, not yet assigned an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    /// Item name as printed (or the placeholder name).
    pub name: String,

    /// Quantity, at least 1.
    pub quantity: u32,

    /// Price per unit (line price divided by quantity).
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,

    /// Confidence of the line the item came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl ItemDraft {
    /// Price of the whole line (unit price times quantity).
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Structured result of parsing one receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedBillDraft {
    /// Items in source line order.
    pub items: Vec<ItemDraft>,

    /// Detected tax.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<DetectedTax>,

    /// Detected subtotal.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub subtotal: Option<Decimal>,

    /// Detected total.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub total: Option<Decimal>,
}

impl ParsedBillDraft {
    /// True when nothing at all was recognized.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.tax.is_none() && self.subtotal.is_none() && self.total.is_none()
    }

    /// Sum of all item line totals.
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(ItemDraft::line_total).sum()
    }

    /// Cross-check the detected amounts and return any issues found.
    ///
    /// Mismatches are reported, never corrected: a receipt may carry tips,
    /// discounts or lines the parser skipped.
    pub fn check_consistency(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let tolerance = Decimal::new(1, 2);

        if self.items.is_empty() {
            issues.push("No items recognized".to_string());
        }

        if let Some(subtotal) = self.subtotal {
            let items_total = self.items_total();
            if !self.items.is_empty() && (items_total - subtotal).abs() > tolerance {
                issues.push(format!(
                    "Item total ({}) differs from subtotal ({})",
                    items_total.round_dp(2),
                    subtotal
                ));
            }

            if let Some(total) = self.total {
                let tax_amount = self.tax.map(|t| t.amount_on(subtotal)).unwrap_or_default();
                // A percentage rate is stored rounded to 2 places; allow for it.
                let slack = match self.tax {
                    Some(DetectedTax {
                        kind: TaxKind::Percentage,
                        ..
                    }) => subtotal * Decimal::new(5, 5),
                    _ => Decimal::ZERO,
                };
                let expected = subtotal + tax_amount;
                if (expected - total).abs() > tolerance + slack {
                    issues.push(format!(
                        "Subtotal plus tax ({}) differs from total ({})",
                        expected.round_dp(2),
                        total
                    ));
                }
            }
        } else if let Some(total) = self.total {
            let items_total = self.items_total();
            if !self.items.is_empty() && items_total > total + tolerance {
                issues.push(format!(
                    "Item total ({}) exceeds receipt total ({})",
                    items_total.round_dp(2),
                    total
                ));
            }
        }

        issues
    }
}

/// Draft plus the per-line detail it was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    /// The aggregated draft.
    pub draft: ParsedBillDraft,

    /// Every non-blank line with its classification, in source order.
    pub lines: Vec<ClassifiedLine>,

    /// Oddities noticed while aggregating (duplicate summary lines, etc.).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
