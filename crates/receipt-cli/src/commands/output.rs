//! Output formatting shared by the parse, scan and batch commands.

use receipt_core::{ItemDraft, ParseOutcome, ParsedBillDraft, TaxKind};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for per-file outputs.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Format a parsed receipt.
///
/// `min_confidence` hides low-confidence items from the CSV and text
/// outputs; JSON always carries the full draft.
pub fn format_draft(
    draft: &ParsedBillDraft,
    format: OutputFormat,
    min_confidence: f32,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(draft)?),
        OutputFormat::Csv => format_csv(draft, min_confidence),
        OutputFormat::Text => Ok(format_text(draft, min_confidence)),
    }
}

fn visible_items(draft: &ParsedBillDraft, min_confidence: f32) -> Vec<&ItemDraft> {
    draft
        .items
        .iter()
        .filter(|item| item.confidence.unwrap_or(1.0) >= min_confidence)
        .collect()
}

fn format_csv(draft: &ParsedBillDraft, min_confidence: f32) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["kind", "name", "quantity", "unit_price", "amount", "confidence"])?;

    for item in visible_items(draft, min_confidence) {
        wtr.write_record([
            "item",
            &item.name,
            &item.quantity.to_string(),
            &item.unit_price.round_dp(2).to_string(),
            &item.line_total().round_dp(2).to_string(),
            &item.confidence.map(|c| format!("{:.2}", c)).unwrap_or_default(),
        ])?;
    }

    if let Some(subtotal) = draft.subtotal {
        wtr.write_record(["subtotal", "", "", "", &subtotal.to_string(), ""])?;
    }
    if let Some(tax) = draft.tax {
        let kind = match tax.kind {
            TaxKind::Percentage => "percentage",
            TaxKind::Absolute => "absolute",
        };
        wtr.write_record(["tax", kind, "", "", &tax.value.to_string(), ""])?;
    }
    if let Some(total) = draft.total {
        wtr.write_record(["total", "", "", "", &total.to_string(), ""])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(draft: &ParsedBillDraft, min_confidence: f32) -> String {
    let mut output = String::new();
    let items = visible_items(draft, min_confidence);

    output.push_str(&format!("Items ({}):\n", items.len()));
    if items.is_empty() {
        output.push_str("  (none)\n");
    }
    for item in &items {
        output.push_str(&format!(
            "  {:>3} x {:<30} {:>10}\n",
            item.quantity,
            item.name,
            item.line_total().round_dp(2)
        ));
    }
    output.push('\n');

    if let Some(subtotal) = draft.subtotal {
        output.push_str(&format!("Subtotal: {}\n", subtotal));
    }
    if let Some(tax) = draft.tax {
        match tax.kind {
            TaxKind::Percentage => output.push_str(&format!(
                "Tax:      {}% ({})\n",
                tax.value,
                draft
                    .subtotal
                    .map(|s| tax.amount_on(s).round_dp(2).to_string())
                    .unwrap_or_default()
            )),
            TaxKind::Absolute => output.push_str(&format!("Tax:      {}\n", tax.value)),
        }
    }
    if let Some(total) = draft.total {
        output.push_str(&format!("Total:    {}\n", total));
    }

    output
}

/// Per-line classification table for `--show-confidence`.
pub fn format_line_confidence(outcome: &ParseOutcome) -> String {
    let mut output = String::new();

    for line in &outcome.lines {
        output.push_str(&format!(
            "  {:<9} {:>5.1}%  {}\n",
            line.kind.label(),
            line.confidence * 100.0,
            line.text
        ));
    }

    let items = &outcome.draft.items;
    if !items.is_empty() {
        let mean = items.iter().filter_map(|i| i.confidence).sum::<f32>() / items.len() as f32;
        output.push_str(&format!("  Mean item confidence: {:.1}%\n", mean * 100.0));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use receipt_core::parse_receipt_text;

    const FIXTURE: &str = "Burger 12.99\nFries 4.50\nSoda 2.99\nSubtotal 20.48\nTax 1.64\nTotal 22.12";

    #[test]
    fn test_csv_output() {
        let draft = parse_receipt_text(FIXTURE);
        let csv = format_draft(&draft, OutputFormat::Csv, 0.0).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "kind,name,quantity,unit_price,amount,confidence");
        assert_eq!(lines[1], "item,Burger,1,12.99,12.99,0.70");
        assert_eq!(lines[4], "subtotal,,,,20.48,");
        assert_eq!(lines[5], "tax,percentage,,,8.01,");
        assert_eq!(lines[6], "total,,,,22.12,");
    }

    #[test]
    fn test_text_output() {
        let draft = parse_receipt_text(FIXTURE);
        let text = format_draft(&draft, OutputFormat::Text, 0.0).unwrap();

        assert!(text.starts_with("Items (3):\n"));
        assert!(text.contains("Tax:      8.01% (1.64)"));
        assert!(text.contains("Total:    22.12"));
    }

    #[test]
    fn test_min_confidence_hides_placeholder_items() {
        let draft = parse_receipt_text("Burger 12.99\n4.00");
        assert_eq!(draft.items.len(), 2);

        let text = format_draft(&draft, OutputFormat::Text, 0.5).unwrap();
        assert!(text.starts_with("Items (1):\n"));
        assert!(!text.contains("Unknown Item"));
    }
}
