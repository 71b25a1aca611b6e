//! Statement parser: bill info, header detection, table rows, text fallback.
//!
//! One `StatementParser` holds a compiled `StatementFormat` and is read-only
//! after construction; every call to `parse` owns its own record list and
//! bill info, so a parser can be shared between concurrent requests.

use billsheet_core::{BillField, BillInfo, StatementReport, TransactionRecord};
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::format::StatementFormat;
use crate::normalize::{checked_amount, parse_amount, DateContext};
use crate::parsers::cmb_credit::{self, RowFields};
use crate::reconcile::merge;
use crate::types::{
    row_cells, ExtractedStatement, ParseOutcome, ParseStats, RawTable, RecordSource, RowDiagnostic,
    RowRejection,
};

const TEXT_LINE_GROUPS: [&str; 5] = ["trans", "post", "desc", "amount", "card"];

/// A `StatementFormat` whose patterns do not compile or lack required groups
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("pattern for {field:?} does not compile")]
    BillPattern {
        field: BillField,
        #[source]
        source: regex::Error,
    },
    #[error("text line pattern does not compile")]
    TextLine(#[source] regex::Error),
    #[error("{pattern} pattern is missing the named group `{group}`")]
    MissingGroup {
        pattern: &'static str,
        group: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct StatementParser {
    format: StatementFormat,
    bill_patterns: Vec<(BillField, Regex)>,
    text_line: Regex,
}

fn require_groups(re: &Regex, pattern: &'static str, groups: &[&'static str]) -> Result<(), FormatError> {
    for group in groups {
        if !re.capture_names().any(|n| n == Some(*group)) {
            return Err(FormatError::MissingGroup { pattern, group });
        }
    }
    Ok(())
}

impl StatementParser {
    pub fn new(format: StatementFormat) -> Result<Self, FormatError> {
        let mut bill_patterns = Vec::with_capacity(format.bill_fields.len());
        for p in &format.bill_fields {
            let re = Regex::new(&p.pattern).map_err(|source| FormatError::BillPattern {
                field: p.field,
                source,
            })?;
            if p.field == BillField::BillingMonth {
                require_groups(&re, "billing month", &["year", "month"])?;
            }
            bill_patterns.push((p.field, re));
        }

        let text_line = Regex::new(&format.text_line_pattern).map_err(FormatError::TextLine)?;
        require_groups(&text_line, "text line", &TEXT_LINE_GROUPS)?;

        Ok(Self {
            format,
            bill_patterns,
            text_line,
        })
    }

    /// Parser for the built-in China Merchants Bank credit-card format
    pub fn cmb_credit() -> Result<Self, FormatError> {
        Self::new(StatementFormat::default())
    }

    pub fn format(&self) -> &StatementFormat {
        &self.format
    }

    /// Scan statement text for the labeled bill fields. First match per label
    /// wins; labels that never match are simply absent.
    pub fn extract_bill_info(&self, text: &str) -> BillInfo {
        self.bill_patterns
            .iter()
            .filter_map(|(field, re)| {
                let caps = re.captures(text)?;
                let value = match field {
                    BillField::BillingMonth => {
                        let year = caps.name("year")?.as_str();
                        let month = caps.name("month")?.as_str();
                        format!("{}-{:0>2}", year, month)
                    }
                    _ => caps.get(1)?.as_str().trim().to_string(),
                };
                Some((*field, value))
            })
            .collect()
    }

    /// True when the row reads like the transaction table's column headers.
    pub fn is_header_row(&self, row: &[String]) -> bool {
        let rules = &self.format.header;
        let joined: String = row
            .iter()
            .filter(|c| !c.is_empty())
            .map(String::as_str)
            .collect();
        let lower = joined.to_lowercase();

        let native = rules
            .native_keywords
            .iter()
            .filter(|k| joined.contains(k.as_str()))
            .count();
        let latin = rules
            .latin_keywords
            .iter()
            .filter(|k| lower.contains(&k.to_lowercase()))
            .count();

        native >= rules.threshold || latin >= rules.threshold
    }

    /// Signed amount of a currency cell, zero when unreadable
    pub fn parse_amount(&self, raw: &str) -> Decimal {
        parse_amount(raw, &self.format.outflow_markers)
    }

    /// Parse one table row into a record, or `None` if the row is rejected.
    pub fn parse_row(&self, row: &[String], bill_info: &BillInfo) -> Option<TransactionRecord> {
        let ctx = DateContext::from_bill_info(bill_info);
        match self.try_parse_row(row, &ctx) {
            Ok(record) => Some(record),
            Err(reason) => {
                debug!(?row, %reason, "table row rejected");
                None
            }
        }
    }

    /// Recover transactions from page text, line by line.
    pub fn extract_from_text(&self, text: &str, bill_info: &BillInfo) -> Vec<TransactionRecord> {
        let ctx = DateContext::from_bill_info(bill_info);
        self.scan_text(text, &ctx, &mut ParseStats::default())
    }

    /// Walk extracted tables and parse every data row under a header.
    pub fn parse_tables(&self, tables: &[RawTable], bill_info: &BillInfo) -> Vec<TransactionRecord> {
        let ctx = DateContext::from_bill_info(bill_info);
        self.walk_tables(tables, &ctx, &mut ParseStats::default())
    }

    /// Full run: bill info, table rows, text fallback, reconciliation, summary.
    pub fn parse(&self, statement: &ExtractedStatement) -> ParseOutcome {
        let bill_info = self.extract_bill_info(&statement.full_text);
        let ctx = DateContext::from_bill_info(&bill_info);
        let mut stats = ParseStats::default();

        let table_records = self.walk_tables(&statement.tables, &ctx, &mut stats);
        info!(
            tables = stats.tables_seen,
            header_tables = stats.header_tables,
            records = table_records.len(),
            "parsed transaction tables"
        );

        let text_records = self.scan_text(&statement.full_text, &ctx, &mut stats);
        let from_tables = table_records.len();
        let transactions = merge(table_records, text_records);
        stats.text_added = transactions.len() - from_tables;
        if stats.text_added > 0 {
            info!(added = stats.text_added, "recovered records missing from tables");
        }

        info!(
            format = %self.format.name,
            records = transactions.len(),
            rejected = stats.rejections.len(),
            "statement parsed"
        );

        ParseOutcome {
            report: StatementReport::new(bill_info, transactions),
            stats,
        }
    }

    fn try_parse_row(&self, row: &[String], ctx: &DateContext) -> Result<TransactionRecord, RowRejection> {
        let fields = cmb_credit::row_fields(row)?;
        if self.format.header.is_marker(fields.trans_date) {
            return Err(RowRejection::HeaderLeak);
        }
        self.build_record(&fields, ctx)
    }

    fn build_record(&self, f: &RowFields<'_>, ctx: &DateContext) -> Result<TransactionRecord, RowRejection> {
        let signed = checked_amount(f.amount, &self.format.outflow_markers).map_err(|_| {
            RowRejection::AmountOutOfRange {
                raw: f.amount.to_string(),
            }
        })?;
        if signed.is_zero() {
            return Err(RowRejection::ZeroAmount {
                raw: f.amount.to_string(),
            });
        }

        let description = f.description.trim();
        if description.is_empty() {
            return Err(RowRejection::EmptyDescription);
        }

        let (transaction_type, flow_kind) = self.format.classify.classify(description, signed);

        Ok(TransactionRecord {
            transaction_date: ctx.normalize(f.trans_date),
            posting_date: ctx.normalize(f.post_date),
            description: description.to_string(),
            amount: signed.abs(),
            transaction_type,
            flow_kind,
            card_last4: f.card.trim().to_string(),
            currency: self.format.currency.clone(),
        })
    }

    fn collect_row(
        &self,
        row: &[String],
        ctx: &DateContext,
        stats: &mut ParseStats,
        out: &mut Vec<TransactionRecord>,
    ) {
        match self.try_parse_row(row, ctx) {
            Ok(record) => out.push(record),
            Err(reason) => {
                debug!(?row, %reason, "table row rejected");
                stats.rejections.push(RowDiagnostic {
                    source: RecordSource::Table,
                    raw: format!("{:?}", row),
                    reason,
                });
            }
        }
    }

    fn walk_tables(&self, tables: &[RawTable], ctx: &DateContext, stats: &mut ParseStats) -> Vec<TransactionRecord> {
        let mut out = Vec::new();
        let mut header_seen = false;

        for table in tables {
            let Some(first) = table.first() else {
                continue;
            };
            stats.tables_seen += 1;
            let first = row_cells(first);

            if self.is_header_row(&first) {
                header_seen = true;
                stats.header_tables += 1;
                debug!(header = ?first, "found transaction table header");

                // Repeated headers inside the table are rejected as header leaks
                for row in &table[1..] {
                    self.collect_row(&row_cells(row), ctx, stats, &mut out);
                }
            } else if header_seen && table.len() == 1 {
                // Tables split across pages come back as one-row fragments
                self.collect_row(&first, ctx, stats, &mut out);
            }
        }

        stats.table_records = out.len();
        out
    }

    fn scan_text(&self, text: &str, ctx: &DateContext, stats: &mut ParseStats) -> Vec<TransactionRecord> {
        let mut out = Vec::new();

        for line in text.lines() {
            let Some(caps) = self.text_line.captures(line) else {
                continue;
            };
            stats.text_matches += 1;

            let fields = cmb_credit::line_fields(&caps);
            let result = if self.format.header.is_marker(fields.description) {
                Err(RowRejection::HeaderLeak)
            } else {
                self.build_record(&fields, ctx)
            };

            match result {
                Ok(record) => out.push(record),
                Err(reason) => {
                    debug!(line, %reason, "text line rejected");
                    stats.rejections.push(RowDiagnostic {
                        source: RecordSource::Text,
                        raw: line.trim().to_string(),
                        reason,
                    });
                }
            }
        }

        out
    }
}
