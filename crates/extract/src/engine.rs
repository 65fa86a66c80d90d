//! Extraction session: scan → parse → reconcile → score for one document.
//!
//! The session is the only stateful unit in the crate and is scoped to a
//! single document. Sessions share no mutable state, so a deployment can
//! run one per document on independent worker threads. Within a session
//! the pipeline is strictly sequential: reconciliation's determinism
//! depends on mention order. Cancelling a session is just dropping it;
//! there is no partial or resumable reconciliation.

use tracing::{debug, info};

use crate::attributes;
use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::model::{ExtractInput, ExtractMeta, ExtractionResult, Mention, ParsedAttributes, Table};
use crate::reconcile::reconcile;
use crate::scanner::{scan_tables, scan_text};
use crate::score::{compute_summary, score_record};

pub struct ExtractSession {
    config: ExtractConfig,
    mentions: Vec<Mention>,
    tables_seen: usize,
}

impl ExtractSession {
    pub fn new(config: ExtractConfig) -> Result<Self, ExtractError> {
        config.validate()?;
        Ok(Self {
            config,
            mentions: Vec::new(),
            tables_seen: 0,
        })
    }

    /// Scan a document: free text first, then tables in provided order.
    pub fn ingest(&mut self, input: &ExtractInput) {
        let base = self.mentions.len();
        let text_mentions = scan_text(&input.text, self.config.window_chars, base);
        debug!(mentions = text_mentions.len(), "scanned document text");
        self.mentions.extend(text_mentions);
        self.ingest_tables(&input.tables);
    }

    /// Incremental re-scan: fold in tables that arrived after the first
    /// pass. Table numbering continues across ingests.
    pub fn ingest_tables(&mut self, tables: &[Table]) {
        let base = self.mentions.len();
        let table_mentions = scan_tables(tables, self.tables_seen, base);
        debug!(
            tables = tables.len(),
            mentions = table_mentions.len(),
            "scanned tables"
        );
        self.tables_seen += tables.len();
        self.mentions.extend(table_mentions);
    }

    /// Validated mentions accumulated so far.
    pub fn mention_count(&self) -> usize {
        self.mentions.len()
    }

    /// Parse → reconcile → score over the full accumulated mention list.
    /// Always recomputed from scratch; calling it again after more tables
    /// were ingested reflects the new mentions.
    pub fn results(&self) -> ExtractionResult {
        let parsed: Vec<ParsedAttributes> = self.mentions.iter().map(attributes::parse).collect();
        let mut records = reconcile(&self.mentions, &parsed);
        for record in &mut records {
            score_record(record, self.config.value_tolerance);
        }
        let summary = compute_summary(&records);
        info!(
            securities = summary.total_securities,
            document_score = summary.document_score,
            "extraction scored"
        );
        ExtractionResult {
            meta: ExtractMeta {
                config_name: self.config.name.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            summary,
            securities: records,
        }
    }

    /// Final scoring pass. Consumes the session; the returned records are
    /// immutable from here on and owned by the caller.
    pub fn finish(self) -> ExtractionResult {
        self.results()
    }
}

/// One-shot extraction over a document.
pub fn run(config: &ExtractConfig, input: &ExtractInput) -> Result<ExtractionResult, ExtractError> {
    let mut session = ExtractSession::new(config.clone())?;
    session.ingest(input);
    Ok(session.finish())
}

/// Load a detected table from CSV data. Upstream collaborators often hand
/// tables over as CSV exports; ragged rows are kept as-is and handled by
/// the scanner.
pub fn table_from_csv(data: &str, has_headers: bool) -> Result<Table, ExtractError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers = if has_headers {
        Some(
            reader
                .headers()
                .map_err(|e| ExtractError::Csv(e.to_string()))?
                .iter()
                .map(String::from)
                .collect(),
        )
    } else {
        None
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ExtractError::Csv(e.to_string()))?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(Table { headers, rows })
}
