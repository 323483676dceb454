//! WASM bindings for receipt OCR text parsing.
//!
//! OCR runs in the browser (e.g. tesseract.js); this crate turns the
//! recognized text into a bill draft.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use receipt_core::receipt::rules::extract_price as core_extract_price;
use receipt_core::{
    ClassifiedLine, Decimal, ParseOutcome, ParsedBillDraft, ParserConfig, ReceiptParser,
    RecognizedText, RuleReceiptParser,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_decimal(value: f64) -> Result<Decimal, JsValue> {
    Decimal::try_from(value).map_err(|e| JsValue::from_str(&format!("invalid amount {}: {}", value, e)))
}

/// Parse receipt text into `{items, tax?, subtotal?, total?}`.
#[wasm_bindgen]
pub fn parse_receipt_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&receipt_core::parse_receipt_text(text))
}

/// Parse receipt text and include per-line classification, warnings and
/// consistency issues.
#[wasm_bindgen]
pub fn parse_receipt_detailed(text: &str) -> Result<JsValue, JsValue> {
    to_js(&DetailedResult::from(RuleReceiptParser::new().parse(text)))
}

/// Extract the most plausible price from a single line.
#[wasm_bindgen]
pub fn extract_price(line: &str) -> Option<f64> {
    core_extract_price(line).and_then(|d| d.to_f64())
}

/// Pull `{text, confidence}` out of a tesseract.js recognize result.
///
/// Accepts either the full result (`{data: {text, confidence}}`) or its
/// `data` object. Confidence is scaled from 0-100 to 0-1.
#[wasm_bindgen]
pub fn text_from_tesseract_result(value: JsValue) -> Result<JsValue, JsValue> {
    to_js(&recognized_from_js(value)?)
}

#[derive(Deserialize)]
struct TesseractData {
    #[serde(default)]
    text: String,
    #[serde(default)]
    confidence: Option<f32>,
}

// Named fields only: tesseract.js results hold cyclic word/line references,
// which must be skipped rather than buffered.
#[derive(Deserialize)]
struct TesseractResult {
    #[serde(default)]
    data: Option<TesseractData>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    confidence: Option<f32>,
}

impl From<TesseractData> for RecognizedText {
    fn from(data: TesseractData) -> Self {
        Self {
            text: data.text,
            confidence: (data.confidence.unwrap_or(0.0) / 100.0).clamp(0.0, 1.0),
        }
    }
}

fn recognized_from_js(value: JsValue) -> Result<RecognizedText, JsValue> {
    let result: TesseractResult = serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("not a tesseract result: {}", e)))?;

    let data = result.data.unwrap_or(TesseractData {
        text: result.text,
        confidence: result.confidence,
    });
    Ok(data.into())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailedResult {
    draft: ParsedBillDraft,
    lines: Vec<ClassifiedLine>,
    warnings: Vec<String>,
    issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ocr_confidence: Option<f32>,
}

impl From<ParseOutcome> for DetailedResult {
    fn from(outcome: ParseOutcome) -> Self {
        Self {
            issues: outcome.draft.check_consistency(),
            draft: outcome.draft,
            lines: outcome.lines,
            warnings: outcome.warnings,
            ocr_confidence: None,
        }
    }
}

/// Configurable receipt parser for browser use.
#[wasm_bindgen]
pub struct ReceiptScanner {
    config: ParserConfig,
    parser: RuleReceiptParser,
}

#[wasm_bindgen]
impl ReceiptScanner {
    /// Create a scanner with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a scanner from a JSON parser config (missing keys use defaults).
    #[wasm_bindgen]
    pub fn from_config_json(json: &str) -> Result<ReceiptScanner, JsValue> {
        let config: ParserConfig =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::with_config(config))
    }

    /// Current parser config as JSON.
    #[wasm_bindgen]
    pub fn config_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Amounts at or above this are ignored.
    #[wasm_bindgen]
    pub fn set_max_price(&mut self, max_price: f64) -> Result<(), JsValue> {
        self.config.max_price = to_decimal(max_price)?;
        self.rebuild();
        Ok(())
    }

    /// Implied tax rates (percent) in `[min, max]` are read as percentages.
    #[wasm_bindgen]
    pub fn set_tax_rate_range(&mut self, min: f64, max: f64) -> Result<(), JsValue> {
        if min > max {
            return Err(JsValue::from_str("tax rate minimum exceeds maximum"));
        }
        self.config.tax_rate_min = to_decimal(min)?;
        self.config.tax_rate_max = to_decimal(max)?;
        self.rebuild();
        Ok(())
    }

    /// Enable or disable reading the tax amount as a rate.
    #[wasm_bindgen]
    pub fn set_reclassify_tax(&mut self, enabled: bool) {
        self.config.reclassify_tax = enabled;
        self.rebuild();
    }

    /// Name used for items whose name could not be read.
    #[wasm_bindgen]
    pub fn set_placeholder_name(&mut self, name: &str) {
        self.config.placeholder_name = name.to_string();
        self.rebuild();
    }

    /// Parse receipt text into a bill draft.
    #[wasm_bindgen]
    pub fn parse(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.parse_draft(text))
    }

    /// Parse receipt text with per-line detail.
    #[wasm_bindgen]
    pub fn parse_detailed(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&DetailedResult::from(self.parser.parse(text)))
    }

    /// Classify a single line.
    #[wasm_bindgen]
    pub fn classify_line(&self, line: &str) -> Result<JsValue, JsValue> {
        let classified: ClassifiedLine = self.parser.classify_line(line);
        to_js(&classified)
    }

    /// Parse the text of a tesseract.js result, keeping its confidence.
    #[wasm_bindgen]
    pub fn scan_tesseract_result(&self, value: JsValue) -> Result<JsValue, JsValue> {
        let ocr = recognized_from_js(value)?;
        let mut result = DetailedResult::from(self.parser.parse(&ocr.text));
        result.ocr_confidence = Some(ocr.confidence);
        to_js(&result)
    }
}

impl ReceiptScanner {
    fn with_config(config: ParserConfig) -> Self {
        Self {
            parser: RuleReceiptParser::with_config(config.clone()),
            config,
        }
    }

    fn rebuild(&mut self) {
        self.parser = RuleReceiptParser::with_config(self.config.clone());
    }
}

impl Default for ReceiptScanner {
    fn default() -> Self {
        Self::new()
    }
}
