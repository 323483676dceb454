//! Reassembling detected text regions into receipt rows.

use super::RecognizedText;

/// Vertical bucket size (pixels) for grouping regions into one row.
pub const ROW_HEIGHT: f32 = 20.0;

/// A piece of text found somewhere on the image.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRegion {
    pub text: String,
    pub confidence: f32,
    /// Left edge of the region.
    pub x: f32,
    /// Top edge of the region.
    pub y: f32,
}

/// Join regions into newline-separated rows in reading order.
///
/// Detectors usually return the item name and its price as separate
/// regions; regions in the same row bucket are joined with a space so the
/// line parser sees `Burger 12.99` on one line. Confidence is the mean over
/// all regions, 0.0 when there are none.
pub fn assemble_text(mut regions: Vec<TextRegion>, row_height: f32) -> RecognizedText {
    let row = |r: &TextRegion| (r.y / row_height) as i32;

    regions.sort_by(|a, b| {
        row(a)
            .cmp(&row(b))
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut rows: Vec<(i32, Vec<&str>)> = Vec::new();
    for region in &regions {
        let text = region.text.trim();
        if text.is_empty() {
            continue;
        }
        let bucket = row(region);
        if let Some((_, parts)) = rows.last_mut().filter(|(b, _)| *b == bucket) {
            parts.push(text);
        } else {
            rows.push((bucket, vec![text]));
        }
    }

    let text = rows
        .iter()
        .map(|(_, parts)| parts.join(" "))
        .collect::<Vec<_>>()
        .join("\n");

    let confidence = if regions.is_empty() {
        0.0
    } else {
        regions.iter().map(|r| r.confidence).sum::<f32>() / regions.len() as f32
    };

    RecognizedText { text, confidence }
}
