use billsheet_core::StatementReport;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One extracted table: rows of cells, `None` where the extractor found no text
pub type RawTable = Vec<Vec<Option<String>>>;

/// What the PDF extraction collaborator hands the parser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedStatement {
    /// All pages' text, newline-joined
    pub full_text: String,
    /// One grid per detected table, in page order
    #[serde(default)]
    pub tables: Vec<RawTable>,
}

/// Which extraction path produced (or rejected) a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordSource {
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "text")]
    Text,
}

/// Why a row or text line did not become a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowRejection {
    #[error("row has {cells} cells, need at least 3")]
    TooShort { cells: usize },
    #[error("header text in data position")]
    HeaderLeak,
    #[error("amount {raw:?} parses to zero")]
    ZeroAmount { raw: String },
    #[error("amount {raw:?} is out of range")]
    AmountOutOfRange { raw: String },
    #[error("empty description")]
    EmptyDescription,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowDiagnostic {
    pub source: RecordSource,
    /// The offending row or line, as text
    pub raw: String,
    pub reason: RowRejection,
}

/// Bookkeeping for one parse run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseStats {
    pub tables_seen: usize,
    pub header_tables: usize,
    pub table_records: usize,
    /// Text lines matching the transaction pattern
    pub text_matches: usize,
    /// Text records that were not already found in the tables
    pub text_added: usize,
    pub rejections: Vec<RowDiagnostic>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub report: StatementReport,
    pub stats: ParseStats,
}

/// Cells of a raw table row as plain strings (missing cells become empty)
pub fn row_cells(row: &[Option<String>]) -> Vec<String> {
    row.iter().map(|c| c.clone().unwrap_or_default()).collect()
}
