//! Per-type and per-flow record counts

use billsheet_core::{FlowKind, TransactionRecord, TransactionType};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeStats {
    pub by_type: BTreeMap<TransactionType, usize>,
    pub by_flow: BTreeMap<FlowKind, usize>,
}

impl TypeStats {
    pub fn total(&self) -> usize {
        self.by_type.values().sum()
    }
}

pub fn type_stats(records: &[TransactionRecord]) -> TypeStats {
    let mut stats = TypeStats::default();
    for r in records {
        *stats.by_type.entry(r.transaction_type).or_insert(0) += 1;
        *stats.by_flow.entry(r.flow_kind).or_insert(0) += 1;
    }
    stats
}
