//! billsheet-export: CSV spreadsheet export and record statistics

pub mod sheet;
pub mod stats;

pub use sheet::{export_report, write_bill_info, write_transactions, ExportPaths};
pub use stats::{type_stats, TypeStats};
