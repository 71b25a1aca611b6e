//! The combined result handed to export and serving layers

use serde::{Deserialize, Serialize};

use crate::bill_info::BillInfo;
use crate::record::TransactionRecord;
use crate::summary::{summarize, SummaryTotals};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementReport {
    pub bill_info: BillInfo,
    pub summary: SummaryTotals,
    pub transactions: Vec<TransactionRecord>,
}

impl StatementReport {
    /// Build a report; the summary is always derived from `transactions`.
    pub fn new(bill_info: BillInfo, transactions: Vec<TransactionRecord>) -> Self {
        let summary = summarize(&transactions);
        Self {
            bill_info,
            summary,
            transactions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_serializes_all_sections() {
        let report = StatementReport::new(BillInfo::default(), Vec::new());
        assert!(report.is_empty());
        let v = serde_json::to_value(&report).unwrap();
        assert!(v["bill_info"].as_object().unwrap().is_empty());
        assert_eq!(v["summary"]["transaction_count"], 0);
        assert_eq!(v["summary"]["net_amount"], serde_json::json!(0.0));
        assert!(v["transactions"].as_array().unwrap().is_empty());
    }
}
