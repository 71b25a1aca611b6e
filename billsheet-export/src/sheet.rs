//! Write a parsed statement as spreadsheet-ready CSV sheets.
//!
//! Transactions sheet:
//!   序号,交易日期,记账日期,交易说明,金额,收支,类型,卡号末四位,币种
//! followed by summary rows (net, expense, income, repayment) in the
//! description/amount columns. Expenses are shown negative.
//!
//! Bill-info sheet:
//!   字段,值

use anyhow::{Context, Result};
use billsheet_core::{BillInfo, StatementReport};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const TRANSACTION_HEADERS: [&str; 9] = [
    "序号",
    "交易日期",
    "记账日期",
    "交易说明",
    "金额",
    "收支",
    "类型",
    "卡号末四位",
    "币种",
];

pub const BILL_INFO_HEADERS: [&str; 2] = ["字段", "值"];

/// Files written by `export_report`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPaths {
    pub transactions: PathBuf,
    /// Only written when the statement had bill fields
    pub bill_info: Option<PathBuf>,
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

pub fn write_transactions<W: Write>(w: W, report: &StatementReport) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(TRANSACTION_HEADERS)?;

    for (i, t) in report.transactions.iter().enumerate() {
        let seq = (i + 1).to_string();
        let amount = money(t.signed_amount());
        wtr.write_record([
            seq.as_str(),
            t.transaction_date.as_str(),
            t.posting_date.as_str(),
            t.description.as_str(),
            amount.as_str(),
            t.flow_kind.label(),
            t.transaction_type.label(),
            t.card_last4.as_str(),
            t.currency.as_str(),
        ])?;
    }

    let s = &report.summary;
    let totals = [
        ("合计:", s.net_amount),
        ("总支出:", s.total_expense),
        ("总收入:", s.total_income),
        ("还款金额:", s.total_repayment),
    ];
    for (label, value) in totals {
        let amount = money(value);
        wtr.write_record(["", "", "", label, amount.as_str(), "", "", "", ""])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_bill_info<W: Write>(w: W, info: &BillInfo) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(BILL_INFO_HEADERS)?;
    for (field, value) in info.iter() {
        wtr.write_record([field.label(), value])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `<stem>_transactions.csv` (and `<stem>_bill_info.csv` when there is
/// bill info) into `out_dir`.
pub fn export_report(report: &StatementReport, out_dir: impl AsRef<Path>, stem: &str) -> Result<ExportPaths> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;

    let transactions = out_dir.join(format!("{stem}_transactions.csv"));
    let file = File::create(&transactions).with_context(|| format!("create {}", transactions.display()))?;
    write_transactions(file, report).with_context(|| format!("write {}", transactions.display()))?;

    let bill_info = if report.bill_info.is_empty() {
        None
    } else {
        let p = out_dir.join(format!("{stem}_bill_info.csv"));
        let file = File::create(&p).with_context(|| format!("create {}", p.display()))?;
        write_bill_info(file, &report.bill_info).with_context(|| format!("write {}", p.display()))?;
        Some(p)
    };

    Ok(ExportPaths {
        transactions,
        bill_info,
    })
}
