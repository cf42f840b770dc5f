//! Sale-membership extraction from a single brand ledger.

use std::collections::HashSet;

use crate::mapping::{ColumnMapping, Field};
use crate::model::{CycleSelector, RawRow};
use crate::normalize::{normalize_code, normalize_cycle, normalize_name, normalize_type, SALE_TYPE};

/// Accounts that bought from one brand, keyed two ways.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrandPurchases {
    pub by_code: HashSet<String>,
    pub by_name: HashSet<String>,
}

impl BrandPurchases {
    /// Keep only codes and names that exist in the master roster.
    pub fn retain_roster(&mut self, valid_codes: &HashSet<&str>, valid_names: &HashSet<&str>) {
        self.by_code.retain(|c| valid_codes.contains(c.as_str()));
        self.by_name.retain(|n| valid_names.contains(n.as_str()));
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.by_code.contains(code)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.by_name.contains(name)
    }
}

/// Codes and names of every sale row in the selected cycle.
///
/// The cycle column is billing cycle if mapped, else capture cycle. With
/// neither mapped no cycle filtering happens. Not filtered against the
/// roster; see [`BrandPurchases::retain_roster`].
pub fn extract_brand_purchases(
    rows: &[RawRow],
    mapping: &ColumnMapping,
    selector: &CycleSelector,
) -> BrandPurchases {
    let cycle_col = mapping.cycle_column();
    let type_col = mapping.column(Field::Tipo);
    let code_col = mapping.column(Field::CodigoRevendedora);
    let name_col = mapping.column(Field::NomeRevendedora);

    let mut purchases = BrandPurchases::default();

    for row in rows {
        if let (CycleSelector::Cycle(_), Some(col)) = (selector, cycle_col) {
            if !selector.accepts(&normalize_cycle(row.get(col))) {
                continue;
            }
        }

        if normalize_type(row.get_mapped(type_col)) != SALE_TYPE {
            continue;
        }

        let code = normalize_code(row.get_mapped(code_col));
        let name = normalize_name(row.get_mapped(name_col));
        if !code.is_empty() {
            purchases.by_code.insert(code);
        }
        if !name.is_empty() {
            purchases.by_name.insert(name);
        }
    }

    purchases
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(fat: Option<&str>, cap: Option<&str>) -> ColumnMapping {
        ColumnMapping {
            codigo_revendedora: "Cod".into(),
            nome_revendedora: "Nome".into(),
            tipo: Some("Tipo".into()),
            ciclo_faturamento: fat.map(Into::into),
            ciclo_captacao: cap.map(Into::into),
            ..Default::default()
        }
    }

    fn row(code: &str, name: &str, kind: &str, fat: &str, cap: &str) -> RawRow {
        RawRow::from_pairs([
            ("Cod", code),
            ("Nome", name),
            ("Tipo", kind),
            ("Fat", fat),
            ("Cap", cap),
        ])
    }

    #[test]
    fn only_sale_rows_count() {
        let rows = vec![
            row("1", "Ana", " VENDA ", "202401", ""),
            row("2", "Bia", "Devolução", "202401", ""),
            row("3", "Cris", "", "202401", ""),
        ];
        let p = extract_brand_purchases(&rows, &mapping(Some("Fat"), None), &CycleSelector::All);
        assert_eq!(p.by_code, HashSet::from(["1".to_string()]));
        assert_eq!(p.by_name, HashSet::from(["ana".to_string()]));
    }

    #[test]
    fn code_and_name_contribute_independently() {
        let rows = vec![
            row("10", "", "Venda", "202401", ""),
            row("", "Bruno", "Venda", "202401", ""),
        ];
        let p = extract_brand_purchases(&rows, &mapping(Some("Fat"), None), &CycleSelector::All);
        assert!(p.has_code("10"));
        assert!(p.has_name("bruno"));
        assert_eq!(p.by_code.len(), 1);
        assert_eq!(p.by_name.len(), 1);
    }

    #[test]
    fn billing_cycle_wins_over_capture_cycle() {
        let rows = vec![
            row("1", "A", "Venda", "202401", "202402"),
            row("2", "B", "Venda", "202402", "202401"),
        ];
        let p = extract_brand_purchases(
            &rows,
            &mapping(Some("Fat"), Some("Cap")),
            &CycleSelector::parse("202401"),
        );
        assert_eq!(p.by_code, HashSet::from(["1".to_string()]));
    }

    #[test]
    fn capture_cycle_fallback() {
        let rows = vec![
            row("1", "A", "Venda", "", "202401"),
            row("2", "B", "Venda", "", "202402"),
        ];
        let p = extract_brand_purchases(&rows, &mapping(None, Some("Cap")), &CycleSelector::parse("202401"));
        assert_eq!(p.by_code, HashSet::from(["1".to_string()]));
    }

    #[test]
    fn no_cycle_column_means_no_filtering() {
        let rows = vec![
            row("1", "A", "Venda", "202401", ""),
            row("2", "B", "Venda", "202402", ""),
        ];
        let p = extract_brand_purchases(&rows, &mapping(None, None), &CycleSelector::parse("202401"));
        assert_eq!(p.by_code.len(), 2);
    }

    #[test]
    fn retain_roster_intersects_both_sets() {
        let mut p = BrandPurchases {
            by_code: HashSet::from(["1".to_string(), "99".to_string()]),
            by_name: HashSet::from(["ana".to_string(), "ghost".to_string()]),
        };
        p.retain_roster(&HashSet::from(["1", "2"]), &HashSet::from(["ana"]));
        assert_eq!(p.by_code, HashSet::from(["1".to_string()]));
        assert_eq!(p.by_name, HashSet::from(["ana".to_string()]));
    }
}
