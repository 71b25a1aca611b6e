//! China Merchants Bank credit-card statement layout.
//!
//! Table rows come in three observed shapes:
//!   ['11/23', '11/24', '支付宝-拼多多平台商户', '25.20', '3686', '25.20(CN)']   purchase
//!   ['',      '11/27', '自动还款', '-1,731.52', '3686', '-1,731.52']           repayment
//!   ['11/23', '支付宝-拼多多平台商户', '25.20', '3686']                        split/merged cells
//!
//! Page text lines look like:
//!   11/23 11/24 支付宝-拼多多平台商户 25.20 3686 25.20(CN)
//!   12/02 12/03 财付通-Lovelycup -16.00 3686 -16.00(CN)

use regex::Captures;

use crate::types::RowRejection;

/// Cells of one transaction, located but not yet normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowFields<'a> {
    pub trans_date: &'a str,
    pub post_date: &'a str,
    pub description: &'a str,
    pub amount: &'a str,
    pub card: &'a str,
    pub foreign_amount: &'a str,
}

fn cell(row: &[String], i: usize) -> &str {
    row.get(i).map(String::as_str).unwrap_or("")
}

/// Locate the fields of a table row by its shape.
pub fn row_fields(row: &[String]) -> Result<RowFields<'_>, RowRejection> {
    if row.len() < 3 {
        return Err(RowRejection::TooShort { cells: row.len() });
    }

    let fields = if row[0].trim().is_empty() {
        // Repayments leave the first column blank and carry a single date
        let trans_date = cell(row, 1);
        let amount = row.get(3).map(String::as_str).unwrap_or("0");
        RowFields {
            trans_date,
            post_date: trans_date,
            description: cell(row, 2),
            amount,
            card: cell(row, 4),
            foreign_amount: row.get(5).map(String::as_str).unwrap_or(amount),
        }
    } else if row.len() == 6 {
        RowFields {
            trans_date: &row[0],
            post_date: &row[1],
            description: &row[2],
            amount: &row[3],
            card: &row[4],
            foreign_amount: &row[5],
        }
    } else {
        let trans_date = cell(row, 0);
        let amount = cell(row, 2);
        RowFields {
            trans_date,
            post_date: trans_date,
            description: cell(row, 1),
            amount,
            card: cell(row, 3),
            foreign_amount: amount,
        }
    };

    Ok(fields)
}

/// Fields of a page-text line matched by the format's line pattern.
pub fn line_fields<'a>(caps: &Captures<'a>) -> RowFields<'a> {
    let group = |name: &str| caps.name(name).map_or("", |m| m.as_str());
    RowFields {
        trans_date: group("trans"),
        post_date: group("post"),
        description: group("desc"),
        amount: group("amount"),
        card: group("card"),
        foreign_amount: group("foreign"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_standard_shape() {
        let r = row(&["11/23", "11/24", "支付宝-拼多多平台商户", "25.20", "3686", "25.20(CN)"]);
        let f = row_fields(&r).unwrap();
        assert_eq!(f.trans_date, "11/23");
        assert_eq!(f.post_date, "11/24");
        assert_eq!(f.amount, "25.20");
        assert_eq!(f.card, "3686");
        assert_eq!(f.foreign_amount, "25.20(CN)");
    }

    #[test]
    fn test_repayment_shape_reuses_date() {
        let r = row(&["", "11/27", "自动还款", "-1,731.52", "3686", "-1,731.52"]);
        let f = row_fields(&r).unwrap();
        assert_eq!(f.trans_date, "11/27");
        assert_eq!(f.post_date, "11/27");
        assert_eq!(f.description, "自动还款");
        assert_eq!(f.amount, "-1,731.52");
    }

    #[test]
    fn test_short_repayment_row_defaults_amount() {
        let r = row(&["  ", "11/27", "自动还款"]);
        let f = row_fields(&r).unwrap();
        assert_eq!(f.amount, "0");
        assert_eq!(f.card, "");
    }

    #[test]
    fn test_best_effort_shape() {
        let r = row(&["11/23", "美团外卖", "45.00", "3686"]);
        let f = row_fields(&r).unwrap();
        assert_eq!(f.post_date, "11/23");
        assert_eq!(f.description, "美团外卖");
        assert_eq!(f.amount, "45.00");
        assert_eq!(f.card, "3686");
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            row_fields(&row(&["11/23", "x"])),
            Err(RowRejection::TooShort { cells: 2 })
        );
    }
}
