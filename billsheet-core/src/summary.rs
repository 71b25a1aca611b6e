//! Summary totals derived from the final transaction list

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::record::{FlowKind, TransactionRecord};

/// Totals over a statement. Expense and repayment totals are reported as
/// negative (or zero) numbers; `net_amount` leaves repayments out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_repayment: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_amount: Decimal,
    pub transaction_count: usize,
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Recompute the totals from scratch.
pub fn summarize(records: &[TransactionRecord]) -> SummaryTotals {
    let mut expense = Decimal::ZERO;
    let mut income = Decimal::ZERO;
    let mut repayment = Decimal::ZERO;

    for r in records {
        match r.flow_kind {
            FlowKind::Expense => expense -= r.amount,
            FlowKind::Income => income += r.amount,
            FlowKind::Repayment => repayment -= r.amount,
        }
    }

    SummaryTotals {
        total_expense: round2(expense),
        total_income: round2(income),
        total_repayment: round2(repayment),
        net_amount: round2(income + expense),
        transaction_count: records.len(),
    }
}
