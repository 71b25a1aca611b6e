//! Canonical transaction record produced by statement parsing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency assigned when the statement does not say otherwise
pub const DEFAULT_CURRENCY: &str = "CNY";

/// One normalized statement transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    /// `YYYY-MM-DD`, or the raw text when the date could not be normalized
    pub transaction_date: String,
    /// Same format; equals `transaction_date` when the row has no posting date
    pub posting_date: String,
    pub description: String,
    /// Always non-negative; direction lives in `flow_kind`
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub flow_kind: FlowKind,
    pub card_last4: String,
    pub currency: String,
}

/// What the transaction is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransactionType {
    #[serde(rename = "purchase")]
    Purchase,
    #[serde(rename = "refund")]
    Refund,
    #[serde(rename = "repayment")]
    Repayment,
}

impl TransactionType {
    /// Label used on the exported sheet
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "消费",
            TransactionType::Refund => "退款",
            TransactionType::Repayment => "还款",
        }
    }
}

/// Which summary bucket the transaction counts toward
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlowKind {
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "income")]
    Income,
    /// Paying down the balance; kept out of the net amount
    #[serde(rename = "repayment")]
    Repayment,
}

impl FlowKind {
    /// Label used on the exported sheet
    pub fn label(&self) -> &'static str {
        match self {
            FlowKind::Expense => "支出",
            FlowKind::Income => "收入",
            FlowKind::Repayment => "还款",
        }
    }
}

/// `(transaction_date, description, amount)`: two records with the same key
/// are the same real-world transaction, whichever extraction path found them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub transaction_date: String,
    pub description: String,
    pub amount: Decimal,
}

impl TransactionRecord {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            transaction_date: self.transaction_date.clone(),
            description: self.description.clone(),
            // 25.2 and 25.20 must collide
            amount: self.amount.normalize(),
        }
    }

    /// Amount as it reads on a ledger: expenses negative, everything else positive
    pub fn signed_amount(&self) -> Decimal {
        match self.flow_kind {
            FlowKind::Expense => -self.amount,
            FlowKind::Income | FlowKind::Repayment => self.amount,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.flow_kind == FlowKind::Expense
    }

    pub fn is_repayment(&self) -> bool {
        self.flow_kind == FlowKind::Repayment
    }
}
