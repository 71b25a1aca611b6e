//! billsheet-ingest: statement parsing engine (bill info, table rows, text
//! fallback, reconciliation) and the PDF extraction seam.

pub mod format;
pub mod normalize;
pub mod parser;
pub mod parsers;
pub mod reconcile;
pub mod source;
pub mod types;

pub use format::{BillFieldPattern, ClassifyRules, HeaderRules, StatementFormat};
pub use normalize::{checked_amount, parse_amount, parse_date_context, DateContext};
pub use parser::{FormatError, StatementParser};
pub use reconcile::merge;
pub use source::{load_statement, DumpSource, PdfSource, StatementSource};
pub use types::{ExtractedStatement, ParseOutcome, ParseStats, RawTable, RecordSource, RowDiagnostic, RowRejection};
