//! Rule-based extractors for receipt lines.
//!
//! Each extractor tries an ordered list of candidate matchers and keeps the
//! first one that succeeds. Nothing here fails: "no match" is `None`.

pub mod keywords;
pub mod patterns;
pub mod prices;
pub mod quantity;

pub use keywords::KeywordClassifier;
pub use prices::{PriceExtractor, PriceFamily, PriceMatch, extract_price};
pub use quantity::{ItemExtractor, ItemMatch, QuantityMarker, QuantityMatch, detect_quantity};

/// Trait for single-line field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from a trimmed line.
    fn extract(&self, line: &str) -> Option<Self::Output>;
}
