//! Completeness scoring and the document-level roll-up.
//!
//! Completeness is purely structural: the fraction of the required-field
//! set that is present. Numeric consistency is reported on a separate
//! flag so the two signals stay independently testable.

use crate::model::{ExtractSummary, SecurityRecord, REQUIRED_FIELDS};

/// Set `completeness` and `consistency_flag` on a reconciled record.
pub fn score_record(record: &mut SecurityRecord, value_tolerance: f64) {
    record.completeness = record.present_field_count() as f64 / REQUIRED_FIELDS.len() as f64;
    record.consistency_flag =
        matches!(record.consistency_error(), Some(error) if error > value_tolerance);
}

/// Summarize scored records. Every record weighs the same in the document
/// score regardless of how many mentions corroborated it.
pub fn compute_summary(records: &[SecurityRecord]) -> ExtractSummary {
    let total = records.len();
    let document_score = if total == 0 {
        0.0
    } else {
        records.iter().map(|r| r.completeness).sum::<f64>() / total as f64
    };
    ExtractSummary {
        total_securities: total,
        document_score,
        mentions_merged: records.iter().map(|r| r.mention_count).sum(),
        complete_records: records.iter().filter(|r| r.completeness == 1.0).count(),
        flagged_records: records.iter().filter(|r| r.consistency_flag).count(),
    }
}
