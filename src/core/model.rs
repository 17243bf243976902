use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel written in place of a field value that could not be located.
pub const MISSING: &str = "missing";

/// An uploaded document. The caller owns it; nothing in the crate persists it.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TextStageKind {
    Structured,
    ContentStream,
    Ocr,
}

impl fmt::Display for TextStageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextStageKind::Structured => "structured",
            TextStageKind::ContentStream => "content_stream",
            TextStageKind::Ocr => "ocr",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    /// Stage whose output was accepted, `None` when every stage came up short.
    pub stage: Option<TextStageKind>,
}

impl ExtractedText {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentType {
    #[serde(rename = "W-2")]
    WageStatement,
    #[serde(rename = "1099-INT")]
    InterestStatement,
    #[serde(rename = "1099-NEC")]
    CompensationStatement,
}

impl DocumentType {
    pub fn form_code(&self) -> &'static str {
        match self {
            DocumentType::WageStatement => "W-2",
            DocumentType::InterestStatement => "1099-INT",
            DocumentType::CompensationStatement => "1099-NEC",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Value(String),
    Missing,
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Value(v) => v,
            FieldValue::Missing => MISSING,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            FieldValue::Value(v) => Some(v),
            FieldValue::Missing => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(raw: &str) -> Self {
        if raw == MISSING {
            FieldValue::Missing
        } else {
            FieldValue::Value(raw.to_string())
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(FieldValue::from(raw.as_str()))
    }
}

/// Field map for one document. Every schema key is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    entries: Vec<(&'static str, FieldValue)>,
}

impl FieldRecord {
    pub fn from_schema(schema: &[&'static str]) -> Self {
        Self {
            entries: schema
                .iter()
                .map(|name| (*name, FieldValue::Missing))
                .collect(),
        }
    }

    /// Returns `false` when `name` is not part of the schema. The `missing`
    /// sentinel stores `FieldValue::Missing`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => {
                *slot = FieldValue::from(value.into().as_str());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn is_missing(&self, name: &str) -> bool {
        self.get(name).map(FieldValue::is_missing).unwrap_or(true)
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|(_, value)| value.is_missing())
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(key, value)| (key, value)))
    }
}

/// How well the document matched its layout profile.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LayoutCheck {
    Complete,
    Partial { found: usize, expected: usize },
    NotApplicable,
    /// Static demo values, not read from the document.
    Fixture,
}

impl LayoutCheck {
    pub fn is_degraded(&self) -> bool {
        matches!(self, LayoutCheck::Partial { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub filename: String,
    pub form_type: DocumentType,
    pub fields: FieldRecord,
    pub notes: Vec<String>,
    pub layout: LayoutCheck,
}

impl ParsedDocument {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields.missing_fields()
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

impl Serialize for ParsedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ParsedDocument", 6)?;
        state.serialize_field("filename", &self.filename)?;
        state.serialize_field("form_type", &self.form_type)?;
        state.serialize_field("parsed_fields", &self.fields)?;
        state.serialize_field("missing_fields", &self.fields.missing_fields())?;
        state.serialize_field("notes", &self.notes)?;
        state.serialize_field("layout", &self.layout)?;
        state.end()
    }
}

fn accepts(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct IncomeSummary {
    pub w2_wages: f64,
    pub int_interest: f64,
    pub nec_nonemployee_comp: f64,
}

impl IncomeSummary {
    pub fn add_wages(&mut self, amount: f64) {
        if accepts(amount) {
            self.w2_wages += amount;
        }
    }

    pub fn add_interest(&mut self, amount: f64) {
        if accepts(amount) {
            self.int_interest += amount;
        }
    }

    pub fn add_nonemployee_comp(&mut self, amount: f64) {
        if accepts(amount) {
            self.nec_nonemployee_comp += amount;
        }
    }

    pub fn total(&self) -> f64 {
        self.w2_wages + self.int_interest + self.nec_nonemployee_comp
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct WithholdingSummary {
    pub federal: f64,
}

impl WithholdingSummary {
    pub fn add_federal(&mut self, amount: f64) {
        if accepts(amount) {
            self.federal += amount;
        }
    }
}

/// A field value that could not be turned into a number during aggregation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConversionFault {
    pub filename: String,
    pub field: &'static str,
    pub raw: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Summary {
    pub income: IncomeSummary,
    pub withholding: WithholdingSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<ConversionFault>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct IncomeComponents {
    pub w2_wages: f64,
    pub interest: f64,
    pub nec: f64,
}

impl From<&IncomeSummary> for IncomeComponents {
    fn from(summary: &IncomeSummary) -> Self {
        Self {
            w2_wages: summary.w2_wages,
            interest: summary.int_interest,
            nec: summary.nec_nonemployee_comp,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TaxResult {
    pub wages: f64,
    pub interest: f64,
    pub nec: f64,
    pub agi: f64,
    pub standard_deduction: f64,
    pub taxable_income: f64,
    pub estimated_tax: f64,
    pub withholding: f64,
    pub balance_due: f64,
    pub refund: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCHEMA: &[&str] = &["a", "b", "c"];

    #[test]
    fn record_starts_all_missing() {
        let record = FieldRecord::from_schema(SCHEMA);
        assert_eq!(record.missing_fields(), vec!["a", "b", "c"]);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn missing_fields_follow_the_map() {
        let mut record = FieldRecord::from_schema(SCHEMA);
        assert!(record.set("b", "10.00"));
        assert!(!record.set("zzz", "1.00"));
        assert_eq!(record.missing_fields(), vec!["a", "c"]);
        assert_eq!(record.get("b"), Some(&FieldValue::Value("10.00".into())));
        assert!(record.get("zzz").is_none());
    }

    #[test]
    fn setting_sentinel_text_keeps_field_missing() {
        let mut record = FieldRecord::from_schema(&["a", "b"]);
        assert!(record.set("a", MISSING));
        assert_eq!(record.get("a"), Some(&FieldValue::Missing));
        assert_eq!(record.missing_fields(), vec!["a", "b"]);

        let json = serde_json::to_value(&record).unwrap();
        let round_trip: FieldValue = serde_json::from_value(json["a"].clone()).unwrap();
        assert_eq!(Some(&round_trip), record.get("a"));
    }

    #[test]
    fn serializes_missing_sentinel() {
        let mut record = FieldRecord::from_schema(SCHEMA);
        record.set("a", "1.00");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"a":"1.00","b":"missing","c":"missing"}"#);
    }

    #[test]
    fn parsed_document_serializes_missing_fields() {
        let doc = ParsedDocument {
            filename: "w2.pdf".into(),
            form_type: DocumentType::WageStatement,
            fields: FieldRecord::from_schema(SCHEMA),
            notes: vec![],
            layout: LayoutCheck::NotApplicable,
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["form_type"], "W-2");
        assert_eq!(json["missing_fields"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn summaries_ignore_negative_and_non_finite() {
        let mut income = IncomeSummary::default();
        income.add_wages(100.0);
        income.add_wages(-5.0);
        income.add_wages(f64::NAN);
        income.add_interest(f64::INFINITY);
        assert_eq!(income.w2_wages, 100.0);
        assert_eq!(income.int_interest, 0.0);
    }
}
