use std::collections::HashSet;

use crate::mapping::{ColumnMapping, Field};
use crate::model::RawRow;
use crate::normalize::{compare_labels, normalize_cycle};

/// Distinct billing cycles in the master rows, most recent first.
pub fn extract_cycles(rows: &[RawRow], mapping: &ColumnMapping) -> Vec<String> {
    let Some(col) = mapping.column(Field::CicloFaturamento) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut cycles: Vec<String> = rows
        .iter()
        .map(|row| normalize_cycle(row.get(col)))
        .filter(|c| !c.is_empty() && seen.insert(c.clone()))
        .collect();

    cycles.sort_by(|a, b| compare_labels(b, a));
    cycles
}
