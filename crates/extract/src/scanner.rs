//! Candidate scanning.
//!
//! Finds identifier-shaped tokens in free text and table cells, validates
//! them immediately, and emits a `Mention` per validated hit. Invalid
//! lookalikes are dropped here and never reach reconciliation.

use regex::Regex;

use crate::model::{Mention, MentionContext, SourceSpan, Table};

/// Shape-only candidate pattern: length and charset. Checksum validation
/// decides membership; the regex just proposes windows.
fn candidate_re() -> Regex {
    Regex::new(r"\b[0-9A-Z]{7,12}\b").unwrap()
}

/// Scan free text in document order. Mention ids start at `base_id`.
pub fn scan_text(text: &str, window_chars: usize, base_id: usize) -> Vec<Mention> {
    let re = candidate_re();
    let mut mentions = Vec::new();
    for m in re.find_iter(text) {
        let Some(identifier) = holdex_ident::validate(m.as_str()) else {
            continue;
        };
        let (window, token_start) = window_around(text, m.start(), m.end(), window_chars);
        mentions.push(Mention {
            id: base_id + mentions.len(),
            raw_token: m.as_str().to_string(),
            identifier,
            span: SourceSpan::Text { offset: m.start() },
            context: MentionContext::FreeText {
                window,
                token_start,
            },
        });
    }
    mentions
}

/// Scan tables in provided order, rows top-to-bottom, cells left-to-right.
/// A cell must validate as a whole (after canonicalization) to count; the
/// rest of its row becomes the mention context. `table_offset` numbers the
/// tables across a whole session.
pub fn scan_tables(tables: &[Table], table_offset: usize, base_id: usize) -> Vec<Mention> {
    let mut mentions = Vec::new();
    for (t, table) in tables.iter().enumerate() {
        for (r, row) in table.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let Some(identifier) = holdex_ident::validate(cell) else {
                    continue;
                };
                mentions.push(Mention {
                    id: base_id + mentions.len(),
                    raw_token: cell.trim().to_string(),
                    identifier,
                    span: SourceSpan::TableCell {
                        table: table_offset + t,
                        row: r,
                        col: c,
                    },
                    context: MentionContext::TableRow {
                        headers: table.headers.clone(),
                        cells: row.clone(),
                        ident_col: c,
                    },
                });
            }
        }
    }
    mentions
}

/// Symmetric window of `window_chars` characters on each side of the
/// token, clamped to char boundaries. Returns the window and the token's
/// byte offset inside it. Deterministic for identical input.
fn window_around(
    text: &str,
    start: usize,
    end: usize,
    window_chars: usize,
) -> (String, usize) {
    let mut w_start = start;
    for c in text[..start].chars().rev().take(window_chars) {
        w_start -= c.len_utf8();
    }
    let mut w_end = end;
    for c in text[end..].chars().take(window_chars) {
        w_end += c.len_utf8();
    }
    (text[w_start..w_end].to_string(), start - w_start)
}
