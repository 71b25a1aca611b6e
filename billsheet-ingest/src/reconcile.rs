//! Merge table-derived and text-derived records.

use billsheet_core::{NaturalKey, TransactionRecord};
use std::collections::HashSet;

/// Table records first, untouched and in order; then every text record whose
/// `(date, description, amount)` key has not been seen yet, in order.
///
/// Duplicates inside the table list are kept (two identical purchases on the
/// same day are real); duplicates among text records are dropped.
pub fn merge(
    table_records: Vec<TransactionRecord>,
    text_records: Vec<TransactionRecord>,
) -> Vec<TransactionRecord> {
    let mut seen: HashSet<NaturalKey> = table_records.iter().map(|t| t.natural_key()).collect();
    let mut out = table_records;

    for t in text_records {
        if seen.insert(t.natural_key()) {
            out.push(t);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use billsheet_core::{FlowKind, TransactionType, DEFAULT_CURRENCY};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn rec(date: &str, desc: &str, amount: Decimal, card: &str) -> TransactionRecord {
        TransactionRecord {
            transaction_date: date.to_string(),
            posting_date: date.to_string(),
            description: desc.to_string(),
            amount,
            transaction_type: TransactionType::Purchase,
            flow_kind: FlowKind::Expense,
            card_last4: card.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    fn sample() -> (Vec<TransactionRecord>, Vec<TransactionRecord>) {
        let table = vec![
            rec("2025-11-23", "支付宝-拼多多平台商户", dec!(25.20), "3686"),
            rec("2025-11-23", "支付宝-拼多多平台商户", dec!(25.20), "3686"),
            rec("2025-11-25", "美团外卖", dec!(45.00), "3686"),
        ];
        let text = vec![
            // same key as a table record, different card: still a duplicate
            rec("2025-11-23", "支付宝-拼多多平台商户", dec!(25.2), "0000"),
            rec("2025-12-02", "财付通-Lovelycup", dec!(16.00), "3686"),
            rec("2025-12-02", "财付通-Lovelycup", dec!(16.00), "3686"),
            rec("2025-12-03", "滴滴出行", dec!(18.50), "3686"),
        ];
        (table, text)
    }

    #[test]
    fn test_table_records_win_and_come_first() {
        let (table, text) = sample();
        let merged = merge(table.clone(), text);

        assert_eq!(merged.len(), 5);
        assert_eq!(&merged[..3], &table[..]);
        assert_eq!(merged[0].card_last4, "3686");
        assert_eq!(merged[3].description, "财付通-Lovelycup");
        assert_eq!(merged[4].description, "滴滴出行");
    }

    #[test]
    fn test_merge_is_deterministic_and_idempotent() {
        let (table, text) = sample();
        let once = merge(table.clone(), text.clone());
        assert_eq!(once, merge(table, text.clone()));
        assert_eq!(merge(once.clone(), text), once);
    }

    #[test]
    fn test_empty_sides() {
        let (table, text) = sample();
        assert_eq!(merge(table.clone(), Vec::new()), table);
        assert_eq!(merge(Vec::new(), text).len(), 3);
    }
}
