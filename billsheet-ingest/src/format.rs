//! Per-bank statement format: the keyword and pattern tables the parser runs on.
//!
//! Everything bank-specific lives here as data so a new layout is a new
//! `StatementFormat`, not new control flow. `StatementFormat::default()` is the
//! China Merchants Bank credit-card statement.

use billsheet_core::{BillField, FlowKind, TransactionType, DEFAULT_CURRENCY};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementFormat {
    pub name: String,
    /// Currency stamped on every record
    pub currency: String,
    /// Tokens in an amount cell that mark it as an outflow (besides `-`)
    pub outflow_markers: Vec<String>,
    /// Positional pattern for one transaction line of page text. Must define
    /// the named groups `trans`, `post`, `desc`, `amount` and `card`.
    pub text_line_pattern: String,
    pub header: HeaderRules,
    pub classify: ClassifyRules,
    /// Labeled patterns for bill-level fields, tried in order
    pub bill_fields: Vec<BillFieldPattern>,
}

/// Keyword-overlap rules for spotting column-header rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderRules {
    /// Matched case-sensitively
    pub native_keywords: Vec<String>,
    /// Matched case-insensitively
    pub latin_keywords: Vec<String>,
    pub threshold: usize,
    /// A date cell containing one of these is header text, not data
    pub markers: Vec<String>,
}

/// Description keywords deciding transaction semantics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyRules {
    pub repayment_keywords: Vec<String>,
    pub refund_keywords: Vec<String>,
}

/// One bill-info label. For `billing_month` the pattern must capture the
/// named groups `year` and `month`; for every other field, group 1 is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillFieldPattern {
    pub field: BillField,
    pub pattern: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for StatementFormat {
    fn default() -> Self {
        Self {
            name: "cmb-credit".to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            outflow_markers: strings(&["支出"]),
            header: HeaderRules::default(),
            classify: ClassifyRules::default(),
            bill_fields: vec![
                BillFieldPattern {
                    field: BillField::BillingMonth,
                    pattern: r"(?:账单|Statement).*?(?P<year>\d{4})[年\s]*(?P<month>\d{1,2})[月\s]"
                        .to_string(),
                },
                BillFieldPattern {
                    field: BillField::StatementDate,
                    pattern: r"账单日[：:\s]*(\d{4}年\d{1,2}月\d{1,2}日)".to_string(),
                },
                BillFieldPattern {
                    field: BillField::CreditLimit,
                    pattern: r"信用额度[：:\s]*[¥￥]?\s*([\d,]+\.?\d*)".to_string(),
                },
                BillFieldPattern {
                    field: BillField::AmountDue,
                    pattern: r"本期应还(?:金额)?[：:\s]*[¥￥]?\s*([\d,]+\.?\d*)".to_string(),
                },
                BillFieldPattern {
                    field: BillField::MinimumPayment,
                    pattern: r"本期最低还款额[：:\s]*[¥￥]?\s*([\d,]+\.?\d*)".to_string(),
                },
                BillFieldPattern {
                    field: BillField::DueDate,
                    pattern: r"到期还款日[：:\s]*(\d{4}年\d{1,2}月\d{1,2}日)".to_string(),
                },
            ],
            // 11/23 11/24 支付宝-拼多多平台商户 25.20 3686 25.20(CN)
            text_line_pattern: concat!(
                r"(?P<trans>\d{2}/\d{2})\s+",
                r"(?P<post>\d{2}/\d{2})\s+",
                r"(?P<desc>.+?)\s+",
                r"(?P<amount>-?[\d,]+\.?\d*)\s+",
                r"(?P<card>\d{4})\s+",
                r"(?P<foreign>-?[\d,]+\.?\d*)"
            )
            .to_string(),
        }
    }
}

impl Default for HeaderRules {
    fn default() -> Self {
        Self {
            native_keywords: strings(&[
                "交易日",
                "记账日",
                "交易摘要",
                "金额/币种",
                "卡号末四位",
                "交易地金额",
            ]),
            latin_keywords: strings(&["Trans", "Post", "Description", "Amount", "Card Number"]),
            threshold: 3,
            markers: strings(&["交易日", "Trans"]),
        }
    }
}

impl Default for ClassifyRules {
    fn default() -> Self {
        Self {
            repayment_keywords: strings(&["还款", "payment"]),
            refund_keywords: strings(&["退款", "refund"]),
        }
    }
}

impl ClassifyRules {
    /// Classify by description keywords, falling back to the amount's sign.
    ///
    /// Repayment keywords win over everything; a refund keyword or a negative
    /// amount makes a refund (income); anything else is a purchase (expense).
    pub fn classify(&self, description: &str, signed_amount: Decimal) -> (TransactionType, FlowKind) {
        let desc = description.to_lowercase();
        let has = |keywords: &[String]| keywords.iter().any(|k| desc.contains(&k.to_lowercase()));

        if has(&self.repayment_keywords) {
            (TransactionType::Repayment, FlowKind::Repayment)
        } else if has(&self.refund_keywords) || signed_amount.is_sign_negative() {
            (TransactionType::Refund, FlowKind::Income)
        } else {
            (TransactionType::Purchase, FlowKind::Expense)
        }
    }
}

impl HeaderRules {
    pub fn is_marker(&self, cell: &str) -> bool {
        self.markers.iter().any(|m| cell.contains(m.as_str()))
    }
}
