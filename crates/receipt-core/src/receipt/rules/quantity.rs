//! Quantity marker detection and item name derivation.

use regex::Regex;
use rust_decimal::Decimal;

use super::FieldExtractor;
use super::patterns::{
    CURRENCY_SYMBOLS, LEADER_TAIL, QTY_LEADING_COUNT, QTY_LEADING_MULTIPLIER,
    QTY_TRAILING_MULTIPLIER,
};
use super::prices::PriceExtractor;

/// Quantity notations, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityMarker {
    /// `2x Pizza 30.00`
    LeadingMultiplier,
    /// `3 Beers 15.00`
    LeadingCount,
    /// `Salad 16.00 x2`
    TrailingMultiplier,
}

impl QuantityMarker {
    pub const ORDER: [QuantityMarker; 3] = [
        QuantityMarker::LeadingMultiplier,
        QuantityMarker::LeadingCount,
        QuantityMarker::TrailingMultiplier,
    ];

    fn pattern(&self) -> &'static Regex {
        match self {
            QuantityMarker::LeadingMultiplier => &*QTY_LEADING_MULTIPLIER,
            QuantityMarker::LeadingCount => &*QTY_LEADING_COUNT,
            QuantityMarker::TrailingMultiplier => &*QTY_TRAILING_MULTIPLIER,
        }
    }

    fn try_match<'a>(&self, line: &'a str) -> Option<QuantityMatch<'a>> {
        let caps = self.pattern().captures(line)?;
        let (count, rest) = match self {
            QuantityMarker::TrailingMultiplier => (caps.get(2)?, caps.get(1)?),
            _ => (caps.get(1)?, caps.get(2)?),
        };

        // Counts too long for u32 are not markers; a zero count still
        // strips the marker but reads as a single unit
        let quantity = count.as_str().parse::<u32>().ok()?.max(1);

        Some(QuantityMatch {
            quantity,
            marker: Some(*self),
            remainder: rest.as_str(),
        })
    }
}

/// Detected quantity and the text left once the marker is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityMatch<'a> {
    /// Quantity, 1 when no marker was found.
    pub quantity: u32,
    /// Marker that matched, if any.
    pub marker: Option<QuantityMarker>,
    /// Line text without the marker.
    pub remainder: &'a str,
}

/// Detect a quantity marker, defaulting to a quantity of 1.
pub fn detect_quantity(line: &str) -> QuantityMatch<'_> {
    QuantityMarker::ORDER
        .iter()
        .find_map(|marker| marker.try_match(line))
        .unwrap_or(QuantityMatch {
            quantity: 1,
            marker: None,
            remainder: line,
        })
}

/// Clean the text in front of a price into an item name.
///
/// Drops a dangling currency symbol and any dot/dash leader run. Returns
/// `None` when nothing is left.
pub fn derive_name(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim_end_matches(|c: char| c.is_whitespace() || CURRENCY_SYMBOLS.contains(&c));
    let name = LEADER_TAIL.replace(trimmed, "");
    let name = name.trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// A line successfully read as an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMatch {
    /// Item name, or the placeholder when none could be derived.
    pub name: String,
    /// Quantity, at least 1.
    pub quantity: u32,
    /// Amount printed on the line (the line total).
    pub price: Decimal,
    /// Quantity marker that matched, if any.
    pub marker: Option<QuantityMarker>,
    /// Whether `name` is the placeholder.
    pub placeholder: bool,
}

impl ItemMatch {
    /// Line total divided by quantity.
    pub fn unit_price(&self) -> Decimal {
        self.price / Decimal::from(self.quantity)
    }
}

/// Reads a line as `[quantity] name [leaders] price [quantity]`.
pub struct ItemExtractor {
    prices: PriceExtractor,
    placeholder_name: String,
}

impl ItemExtractor {
    pub fn new() -> Self {
        Self {
            prices: PriceExtractor::new(),
            placeholder_name: "Unknown Item".to_string(),
        }
    }

    /// Set the exclusive upper bound for plausible amounts.
    pub fn with_max_price(mut self, max_price: Decimal) -> Self {
        self.prices = self.prices.with_max_price(max_price);
        self
    }

    /// Set the name used when no name can be derived.
    pub fn with_placeholder_name(mut self, name: impl Into<String>) -> Self {
        self.placeholder_name = name.into();
        self
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ItemExtractor {
    type Output = ItemMatch;

    fn extract(&self, line: &str) -> Option<ItemMatch> {
        let qty = detect_quantity(line);
        let price = self.prices.extract(qty.remainder)?;

        let (name, placeholder) = match derive_name(&qty.remainder[..price.start]) {
            Some(name) => (name, false),
            None => (self.placeholder_name.clone(), true),
        };

        Some(ItemMatch {
            name,
            quantity: qty.quantity,
            price: price.amount,
            marker: qty.marker,
            placeholder,
        })
    }
}
