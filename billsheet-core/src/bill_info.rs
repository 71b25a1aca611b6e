//! Statement-level metadata (billing month, limits, due dates)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields the bill-info extractor knows how to find
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BillField {
    /// `YYYY-MM`
    #[serde(rename = "billing_month")]
    BillingMonth,
    #[serde(rename = "statement_date")]
    StatementDate,
    #[serde(rename = "credit_limit")]
    CreditLimit,
    #[serde(rename = "amount_due")]
    AmountDue,
    #[serde(rename = "minimum_payment")]
    MinimumPayment,
    #[serde(rename = "due_date")]
    DueDate,
}

impl BillField {
    pub const ALL: [BillField; 6] = [
        BillField::BillingMonth,
        BillField::StatementDate,
        BillField::CreditLimit,
        BillField::AmountDue,
        BillField::MinimumPayment,
        BillField::DueDate,
    ];

    /// Label used on the exported sheet
    pub fn label(&self) -> &'static str {
        match self {
            BillField::BillingMonth => "账单月份",
            BillField::StatementDate => "账单日",
            BillField::CreditLimit => "信用额度",
            BillField::AmountDue => "本期应还",
            BillField::MinimumPayment => "最低还款",
            BillField::DueDate => "到期还款日",
        }
    }
}

/// Fields found in the statement text. Absent fields were not found; there
/// are no required fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillInfo(BTreeMap<BillField, String>);

impl BillInfo {
    pub fn get(&self, field: BillField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BillField, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn billing_month(&self) -> Option<&str> {
        self.get(BillField::BillingMonth)
    }

    /// Year of the billing month, used to date `MM/DD` transactions
    pub fn billing_year(&self) -> Option<i32> {
        let (year, _) = self.billing_month()?.split_once('-')?;
        year.trim().parse().ok()
    }

    /// Two-digit month of the billing month (`"01"`..`"12"`)
    pub fn billing_month_number(&self) -> Option<&str> {
        let (_, month) = self.billing_month()?.split_once('-')?;
        Some(month.trim())
    }
}

impl FromIterator<(BillField, String)> for BillInfo {
    fn from_iter<I: IntoIterator<Item = (BillField, String)>>(iter: I) -> Self {
        let mut map = BTreeMap::new();
        for (field, value) in iter {
            // first occurrence wins
            map.entry(field).or_insert(value);
        }
        BillInfo(map)
    }
}
