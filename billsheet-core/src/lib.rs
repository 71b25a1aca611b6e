//! billsheet-core: record, bill-info and summary types shared by the parser,
//! the exporters and the server.

pub mod bill_info;
pub mod record;
pub mod report;
pub mod summary;

pub use bill_info::{BillField, BillInfo};
pub use record::{FlowKind, NaturalKey, TransactionRecord, TransactionType, DEFAULT_CURRENCY};
pub use report::StatementReport;
pub use summary::{summarize, SummaryTotals};
