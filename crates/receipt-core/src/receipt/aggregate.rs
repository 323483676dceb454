//! Folds classified lines into a bill draft.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::models::config::ParserConfig;
use crate::models::receipt::{
    ClassifiedLine, DetectedTax, ItemDraft, LineKind, ParsedBillDraft, TaxKind,
};

/// Build a draft from classified lines, in source order.
///
/// Summary lines are last-wins; every repeat adds a warning. Returns the
/// draft together with the warnings collected along the way.
pub fn aggregate(lines: &[ClassifiedLine], config: &ParserConfig) -> (ParsedBillDraft, Vec<String>) {
    let mut draft = ParsedBillDraft::default();
    let mut warnings = Vec::new();

    for line in lines {
        match (line.kind, line.price) {
            (LineKind::Item, Some(price)) => {
                let Some(name) = &line.name else { continue };
                let quantity = line.quantity.unwrap_or(1).max(1);
                draft.items.push(ItemDraft {
                    name: name.clone(),
                    quantity,
                    unit_price: price / Decimal::from(quantity),
                    confidence: Some(line.confidence),
                });
            }
            (LineKind::Tax, Some(price)) => {
                if let Some(previous) = draft.tax {
                    warnings.push(replaced(line, previous.value, price));
                }
                draft.tax = Some(DetectedTax::absolute(price));
            }
            (LineKind::Subtotal, Some(price)) => {
                if let Some(previous) = draft.subtotal {
                    warnings.push(replaced(line, previous, price));
                }
                draft.subtotal = Some(price);
            }
            (LineKind::Total, Some(price)) => {
                if let Some(previous) = draft.total {
                    warnings.push(replaced(line, previous, price));
                }
                draft.total = Some(price);
            }
            (kind, None) if kind.is_summary() => {
                warnings.push(format!("{} line without an amount: {:?}", kind.label(), line.text));
            }
            _ => {}
        }
    }

    if config.reclassify_tax {
        reinterpret_tax(&mut draft, config.tax_rate_min, config.tax_rate_max);
    }

    if draft.items.is_empty() {
        warnings.push("No items recognized".to_string());
    }

    (draft, warnings)
}

fn replaced(line: &ClassifiedLine, previous: Decimal, current: Decimal) -> String {
    format!(
        "Repeated {} line {:?}: {} replaces {}",
        line.kind.label(),
        line.text,
        current,
        previous
    )
}

/// Turn an absolute tax into a rate when the implied rate is plausible.
///
/// The implied rate is `tax / subtotal * 100`. When it lies within
/// `[min, max]` (inclusive) the tax becomes a percentage, rounded to two
/// decimal places. Otherwise the draft is left untouched.
pub fn reinterpret_tax(draft: &mut ParsedBillDraft, min: Decimal, max: Decimal) {
    let (Some(subtotal), Some(tax)) = (draft.subtotal, draft.tax) else {
        return;
    };
    if tax.kind != TaxKind::Absolute || subtotal <= Decimal::ZERO {
        return;
    }

    let rate = tax.value / subtotal * Decimal::ONE_HUNDRED;
    if rate >= min && rate <= max {
        let rate = rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        debug!("Tax {} on subtotal {} read as {}%", tax.value, subtotal, rate);
        draft.tax = Some(DetectedTax::percentage(rate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(kind: LineKind, price: Option<&str>) -> ClassifiedLine {
        ClassifiedLine {
            text: format!("{} line", kind.label()),
            kind,
            price: price.map(dec),
            quantity: None,
            name: None,
            confidence: 0.8,
        }
    }

    fn item_line(name: &str, quantity: u32, price: &str) -> ClassifiedLine {
        ClassifiedLine {
            text: format!("{} {}", name, price),
            kind: LineKind::Item,
            price: Some(dec(price)),
            quantity: Some(quantity),
            name: Some(name.to_string()),
            confidence: 0.7,
        }
    }

    fn draft_with(subtotal: &str, tax: &str) -> ParsedBillDraft {
        ParsedBillDraft {
            tax: Some(DetectedTax::absolute(dec(tax))),
            subtotal: Some(dec(subtotal)),
            ..ParsedBillDraft::default()
        }
    }

    #[test]
    fn test_items_keep_source_order() {
        let lines = vec![
            item_line("Pizza", 2, "30.00"),
            line(LineKind::Unknown, None),
            item_line("Soda", 1, "2.99"),
        ];

        let (draft, warnings) = aggregate(&lines, &ParserConfig::default());

        let names: Vec<&str> = draft.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Pizza", "Soda"]);
        assert_eq!(draft.items[0].unit_price, dec("15.00"));
        assert_eq!(draft.items[0].confidence, Some(0.7));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_repeated_summary_lines_last_wins() {
        let lines = vec![
            item_line("Burger", 1, "12.99"),
            line(LineKind::Total, Some("10.00")),
            line(LineKind::Total, Some("12.99")),
        ];

        let (draft, warnings) = aggregate(&lines, &ParserConfig::default());

        assert_eq!(draft.total, Some(dec("12.99")));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("total"));
        assert!(warnings[0].contains("12.99 replaces 10.00"));
    }

    #[test]
    fn test_summary_without_amount_is_warned() {
        let lines = vec![item_line("Burger", 1, "12.99"), line(LineKind::Tax, None)];

        let (draft, warnings) = aggregate(&lines, &ParserConfig::default());

        assert_eq!(draft.tax, None);
        assert_eq!(warnings, vec!["tax line without an amount: \"tax line\"".to_string()]);
    }

    #[test]
    fn test_no_items_is_warned() {
        let lines = vec![line(LineKind::Total, Some("5.00"))];

        let (draft, warnings) = aggregate(&lines, &ParserConfig::default());

        assert_eq!(draft.total, Some(dec("5.00")));
        assert_eq!(warnings, vec!["No items recognized".to_string()]);
    }

    #[test]
    fn test_tax_stays_absolute_without_subtotal() {
        let lines = vec![item_line("Burger", 1, "12.99"), line(LineKind::Tax, Some("1.04"))];

        let (draft, _) = aggregate(&lines, &ParserConfig::default());

        assert_eq!(draft.tax, Some(DetectedTax::absolute(dec("1.04"))));
    }

    #[test]
    fn test_reclassify_can_be_disabled() {
        let lines = vec![
            item_line("Item", 1, "100.00"),
            line(LineKind::Subtotal, Some("100.00")),
            line(LineKind::Tax, Some("8.00")),
        ];
        let config = ParserConfig {
            reclassify_tax: false,
            ..ParserConfig::default()
        };

        let (draft, _) = aggregate(&lines, &config);

        assert_eq!(draft.tax, Some(DetectedTax::absolute(dec("8.00"))));
    }

    #[test]
    fn test_reinterpret_tax_rounds_rate() {
        let mut draft = draft_with("20.48", "1.64");
        reinterpret_tax(&mut draft, dec("5"), dec("20"));
        assert_eq!(draft.tax, Some(DetectedTax::percentage(dec("8.01"))));
    }

    #[test]
    fn test_reinterpret_tax_bounds_are_inclusive() {
        let mut low = draft_with("100.00", "5.00");
        reinterpret_tax(&mut low, dec("5"), dec("20"));
        assert_eq!(low.tax.unwrap().kind, TaxKind::Percentage);

        let mut high = draft_with("100.00", "20.00");
        reinterpret_tax(&mut high, dec("5"), dec("20"));
        assert_eq!(high.tax.unwrap().kind, TaxKind::Percentage);

        let mut above = draft_with("100.00", "20.01");
        reinterpret_tax(&mut above, dec("5"), dec("20"));
        assert_eq!(above.tax, Some(DetectedTax::absolute(dec("20.01"))));
    }

    #[test]
    fn test_reinterpret_tax_is_monotonic_in_range() {
        for cents in (100..=3000).step_by(50) {
            let tax = Decimal::new(cents, 2);
            let mut draft = draft_with("100.00", &tax.to_string());
            reinterpret_tax(&mut draft, dec("5"), dec("20"));

            let in_range = tax >= dec("5") && tax <= dec("20");
            let kind = draft.tax.unwrap().kind;
            assert_eq!(kind == TaxKind::Percentage, in_range, "tax {}", tax);
        }
    }

    #[test]
    fn test_reinterpret_tax_ignores_zero_subtotal() {
        let mut draft = ParsedBillDraft {
            tax: Some(DetectedTax::absolute(dec("1.00"))),
            subtotal: Some(Decimal::ZERO),
            ..ParsedBillDraft::default()
        };
        reinterpret_tax(&mut draft, dec("5"), dec("20"));
        assert_eq!(draft.tax.unwrap().kind, TaxKind::Absolute);
    }
}
