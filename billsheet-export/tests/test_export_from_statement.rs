use billsheet_core::{FlowKind, TransactionType};
use billsheet_export::{export_report, type_stats, write_transactions};
use billsheet_ingest::{ExtractedStatement, RawTable, StatementParser};
use rust_decimal_macros::dec;
use std::path::PathBuf;

const HEADER: [&str; 6] = ["交易日", "记账日", "交易摘要", "人民币金额", "卡号末四位", "交易地金额"];

fn table(rows: &[&[&str]]) -> RawTable {
    rows.iter()
        .map(|r| {
            r.iter()
                .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                .collect()
        })
        .collect()
}

/// A January statement whose table extraction dropped two rows that the
/// page text still carries.
fn january_statement() -> ExtractedStatement {
    let full_text = "\
招商银行信用卡 Statement 2026年01月
账单日：2026年1月13日
信用额度：¥30,000.00
本期应还金额：¥2,104.70
本期最低还款额：¥105.24
到期还款日：2026年2月1日
交易日 记账日 交易摘要 人民币金额 卡号末四位 交易地金额
12/20 12/21 京东商城 199.00 3686 199.00(CN)
12/28 12/29 支付宝-拼多多平台商户 -25.20 3686 -25.20(CN)
01/03 01/04 财付通-瑞幸咖啡 19.90 3686 19.90(CN)
01/05 01/06 滴滴出行 32.00 3686 32.00(CN)
"
    .to_string();

    let tables = vec![table(&[
        &HEADER,
        &["12/20", "12/21", "京东商城", "199.00", "3686", "199.00(CN)"],
        &["", "12/30", "自动还款", "-1,878.00", "3686", "-1,878.00"],
        &["01/03", "01/04", "财付通-瑞幸咖啡", "19.90", "3686", "19.90(CN)"],
    ])];

    ExtractedStatement { full_text, tables }
}

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("billsheet-{}-{}", name, std::process::id()))
}

/// Text recovery fills in what the tables missed, with December rows dated
/// into the previous year.
#[test]
fn test_january_statement_end_to_end() {
    let parser = StatementParser::cmb_credit().unwrap();
    let outcome = parser.parse(&january_statement());
    let report = &outcome.report;

    assert_eq!(report.bill_info.billing_month(), Some("2026-01"));
    assert_eq!(report.transactions.len(), 5);
    assert_eq!(outcome.stats.table_records, 3);
    assert_eq!(outcome.stats.text_added, 2);

    let jd = &report.transactions[0];
    assert_eq!(jd.transaction_date, "2025-12-20");
    assert_eq!(jd.posting_date, "2025-12-21");

    let repayment = &report.transactions[1];
    assert_eq!(repayment.transaction_type, TransactionType::Repayment);
    assert_eq!(repayment.transaction_date, "2025-12-30");
    assert_eq!(repayment.amount, dec!(1878.00));

    let refund = &report.transactions[3];
    assert_eq!(refund.description, "支付宝-拼多多平台商户");
    assert_eq!(refund.flow_kind, FlowKind::Income);
    assert_eq!(refund.transaction_date, "2025-12-28");

    let didi = &report.transactions[4];
    assert_eq!(didi.transaction_date, "2026-01-05");

    assert!(report.transactions.iter().all(|t| t.amount >= dec!(0)));

    let s = &report.summary;
    assert_eq!(s.total_expense, dec!(-250.90));
    assert_eq!(s.total_income, dec!(25.20));
    assert_eq!(s.total_repayment, dec!(-1878.00));
    assert_eq!(s.net_amount, dec!(-225.70));
}

#[test]
fn test_stats_over_parsed_statement() {
    let parser = StatementParser::cmb_credit().unwrap();
    let report = parser.parse(&january_statement()).report;
    let stats = type_stats(&report.transactions);

    assert_eq!(stats.by_type[&TransactionType::Purchase], 3);
    assert_eq!(stats.by_type[&TransactionType::Refund], 1);
    assert_eq!(stats.by_type[&TransactionType::Repayment], 1);
    assert_eq!(stats.by_flow[&FlowKind::Expense], 3);
    assert_eq!(stats.total(), report.transactions.len());
}

#[test]
fn test_export_writes_both_sheets() {
    let parser = StatementParser::cmb_credit().unwrap();
    let report = parser.parse(&january_statement()).report;

    let dir = scratch_dir("export");
    let paths = export_report(&report, &dir, "jan").unwrap();

    assert_eq!(paths.transactions, dir.join("jan_transactions.csv"));
    let info_path = paths.bill_info.clone().expect("bill info sheet");

    let mut rdr = csv::Reader::from_path(&paths.transactions).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    // five records plus four summary rows
    assert_eq!(rows.len(), 9);
    assert_eq!(&rows[0][4], "-199.00");
    assert_eq!(&rows[5][3], "合计:");
    assert_eq!(&rows[5][4], "-225.70");

    let info = std::fs::read_to_string(&info_path).unwrap();
    assert!(info.contains("账单月份,2026-01"));
    assert!(info.contains("信用额度,\"30,000.00\""));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_empty_statement_exports_only_totals() {
    let parser = StatementParser::cmb_credit().unwrap();
    let report = parser.parse(&ExtractedStatement::default()).report;
    assert!(report.is_empty());

    let mut buf = Vec::new();
    write_transactions(&mut buf, &report).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.lines().count(), 5);
    assert!(text.contains("合计:,0.00"));
}
