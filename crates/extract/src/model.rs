use std::collections::BTreeMap;

use holdex_ident::Identifier;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A table detected by the upstream document processor. Headers may be
/// missing and rows may be ragged; short rows are scanned with the missing
/// cells treated as absent.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

/// One document's worth of collaborator output: extracted plain text plus
/// detected tables.
#[derive(Debug, Clone, Default)]
pub struct ExtractInput {
    pub text: String,
    pub tables: Vec<Table>,
}

// ---------------------------------------------------------------------------
// Mentions
// ---------------------------------------------------------------------------

/// Where a mention was found. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSpan {
    /// Byte offset of the token in the document text.
    Text { offset: usize },
    /// Zero-based indices; `table` counts across every table the session
    /// has ingested, in ingest order.
    TableCell { table: usize, row: usize, col: usize },
}

/// The material around a mention that attribute parsing may draw from.
#[derive(Debug, Clone)]
pub enum MentionContext {
    /// Symmetric window of surrounding free text. `token_start` is the
    /// token's byte offset inside `window`.
    FreeText { window: String, token_start: usize },
    /// The full table row; the identifier cell itself is excluded from
    /// attribute parsing.
    TableRow {
        headers: Option<Vec<String>>,
        cells: Vec<String>,
        ident_col: usize,
    },
}

impl MentionContext {
    pub fn is_table_row(&self) -> bool {
        matches!(self, Self::TableRow { .. })
    }
}

/// One occurrence of a validated identifier in the source material.
/// Created once per scan pass, immutable, owned by the session until
/// consumed by reconciliation.
#[derive(Debug, Clone)]
pub struct Mention {
    /// Ordinal in session scan order. Reconciliation folds in this order.
    pub id: usize,
    pub raw_token: String,
    pub identifier: Identifier,
    pub span: SourceSpan,
    pub context: MentionContext,
}

// ---------------------------------------------------------------------------
// Parsed attributes
// ---------------------------------------------------------------------------

/// Typed fields recovered from one mention's context. Absent is `None`;
/// a present zero is meaningful and distinct from absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAttributes {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
    pub value: Option<f64>,
    pub currency: Option<String>,
}

impl ParsedAttributes {
    /// Error of `value ≈ quantity × price` for this mention alone.
    /// `None` when the triple is incomplete.
    pub fn consistency_error(&self) -> Option<f64> {
        Some(triple_error(self.quantity?, self.price?, self.value?))
    }
}

/// Relative error of a quantity/price/value triple; absolute when the
/// stated value is zero (a legitimate value with no relative scale).
pub fn triple_error(quantity: f64, price: f64, value: f64) -> f64 {
    let diff = (value - quantity * price).abs();
    if value == 0.0 {
        diff
    } else {
        diff / value.abs()
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// The fixed required-field set: completeness denominator and provenance
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Quantity,
    Price,
    Value,
    Currency,
}

pub const REQUIRED_FIELDS: [Field; 5] = [
    Field::Name,
    Field::Quantity,
    Field::Price,
    Field::Value,
    Field::Currency,
];

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Quantity => write!(f, "quantity"),
            Self::Price => write!(f, "price"),
            Self::Value => write!(f, "value"),
            Self::Currency => write!(f, "currency"),
        }
    }
}

// ---------------------------------------------------------------------------
// Security records
// ---------------------------------------------------------------------------

/// The reconciled, externally visible entity. Mutated only while its
/// session folds mentions in; immutable once the session finishes.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityRecord {
    pub identifier: Identifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// How many mentions merged into this record.
    pub mention_count: usize,
    /// Fraction of the required-field set that is present, in [0, 1].
    pub completeness: f64,
    /// Raised when quantity × price materially disagrees with the stated
    /// value. Orthogonal to completeness.
    #[serde(skip_serializing_if = "is_false")]
    pub consistency_flag: bool,
    /// Every mention that supplied a non-absent value per field, in supply
    /// order, overwritten suppliers included. Audit trail, not ownership.
    pub provenance: BTreeMap<Field, Vec<usize>>,
}

fn is_false(flag: &bool) -> bool {
    !flag
}

impl SecurityRecord {
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            name: None,
            quantity: None,
            price: None,
            value: None,
            currency: None,
            mention_count: 0,
            completeness: 0.0,
            consistency_flag: false,
            provenance: BTreeMap::new(),
        }
    }

    pub fn present_field_count(&self) -> usize {
        [
            self.name.is_some(),
            self.quantity.is_some(),
            self.price.is_some(),
            self.value.is_some(),
            self.currency.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// Error of the record's own quantity/price/value triple, if complete.
    pub fn consistency_error(&self) -> Option<f64> {
        Some(triple_error(self.quantity?, self.price?, self.value?))
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ExtractSummary {
    pub total_securities: usize,
    /// Unweighted mean of per-record completeness; 0.0 for an empty set.
    pub document_score: f64,
    /// Total mentions folded into records; equals the number of validated
    /// mentions the session scanned.
    pub mentions_merged: usize,
    pub complete_records: usize,
    pub flagged_records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub meta: ExtractMeta,
    pub summary: ExtractSummary,
    pub securities: Vec<SecurityRecord>,
}

impl ExtractionResult {
    /// JSON in the shape downstream consumers store and render.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("result models serialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdex_ident::{Identifier, IdentifierKind};

    fn record() -> SecurityRecord {
        SecurityRecord::new(Identifier {
            kind: IdentifierKind::Isin,
            value: "US0378331005".into(),
        })
    }

    #[test]
    fn present_field_count_zero_is_present() {
        let mut r = record();
        assert_eq!(r.present_field_count(), 0);
        r.value = Some(0.0);
        assert_eq!(r.present_field_count(), 1);
        r.name = Some("Apple Inc.".into());
        r.currency = Some("USD".into());
        assert_eq!(r.present_field_count(), 3);
    }

    #[test]
    fn triple_error_relative_and_absolute() {
        assert_eq!(triple_error(100.0, 190.5, 19050.0), 0.0);
        assert!((triple_error(100.0, 190.5, 19240.5) - 0.009900).abs() < 1e-4);
        // zero stated value falls back to absolute error
        assert_eq!(triple_error(10.0, 2.0, 0.0), 20.0);
    }

    #[test]
    fn consistency_error_requires_full_triple() {
        let mut r = record();
        r.quantity = Some(100.0);
        r.price = Some(190.5);
        assert_eq!(r.consistency_error(), None);
        r.value = Some(19050.0);
        assert_eq!(r.consistency_error(), Some(0.0));
    }

    #[test]
    fn record_json_skips_absent_fields() {
        let mut r = record();
        r.quantity = Some(100.0);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"kind\":\"isin\""));
        assert!(json.contains("\"quantity\":100.0"));
        assert!(!json.contains("\"price\""));
        assert!(!json.contains("consistency_flag"));
    }

    #[test]
    fn flag_serialized_when_raised() {
        let mut r = record();
        r.consistency_flag = true;
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"consistency_flag\":true"));
    }
}
