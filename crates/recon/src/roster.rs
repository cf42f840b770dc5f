//! Active-roster extraction from the master ("Geral") dataset.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::mapping::{ColumnMapping, Field};
use crate::model::{ActiveAccount, CycleSelector, IdentityKey, RawRow};
use crate::normalize::{normalize_code, normalize_cycle, normalize_name};

/// Sector assigned to master rows with an empty sector cell.
pub const DEFAULT_SECTOR: &str = "Sem Setor";

/// Deduplicated active accounts in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ActiveRoster {
    accounts: Vec<ActiveAccount>,
    index: HashMap<IdentityKey, usize>,
    /// Rows with neither a code nor a name.
    pub skipped_without_identity: usize,
}

impl ActiveRoster {
    /// Insert unless the key is already present. First occurrence wins.
    fn insert_first(&mut self, key: IdentityKey, account: ActiveAccount) -> bool {
        match self.index.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(self.accounts.len());
                self.accounts.push(account);
                true
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &IdentityKey) -> Option<&ActiveAccount> {
        self.index.get(key).map(|&i| &self.accounts[i])
    }

    pub fn accounts(&self) -> &[ActiveAccount] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Normalized codes present in the roster.
    pub fn valid_codes(&self) -> HashSet<&str> {
        self.accounts
            .iter()
            .map(|a| a.codigo_normalizado.as_str())
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Normalized names present in the roster.
    pub fn valid_names(&self) -> HashSet<&str> {
        self.accounts
            .iter()
            .map(|a| a.nome_normalizado.as_str())
            .filter(|n| !n.is_empty())
            .collect()
    }
}

/// Identity key for a row: code when present, else name, else none.
pub fn identity_key(code: &str, name: &str) -> Option<IdentityKey> {
    if !code.is_empty() {
        Some(IdentityKey::Code(code.to_string()))
    } else if !name.is_empty() {
        Some(IdentityKey::Name(name.to_string()))
    } else {
        None
    }
}

/// One entry per distinct identity among master rows in the selected cycle.
///
/// Rows without code and name are dropped and counted. The mapping is
/// trusted to be complete; unmapped sector/cycle columns read as empty.
pub fn extract_active_roster(
    rows: &[RawRow],
    mapping: &ColumnMapping,
    selector: &CycleSelector,
) -> ActiveRoster {
    let code_col = mapping.column(Field::CodigoRevendedora);
    let name_col = mapping.column(Field::NomeRevendedora);
    let sector_col = mapping.column(Field::Setor);
    let cycle_col = mapping.column(Field::CicloFaturamento);

    let mut roster = ActiveRoster::default();

    for row in rows {
        let row_cycle = normalize_cycle(row.get_mapped(cycle_col));
        if !selector.accepts(&row_cycle) {
            continue;
        }

        let code_raw = row.get_mapped(code_col);
        let name_raw = row.get_mapped(name_col);
        let codigo_normalizado = normalize_code(code_raw);
        let nome_normalizado = normalize_name(name_raw);

        let Some(key) = identity_key(&codigo_normalizado, &nome_normalizado) else {
            roster.skipped_without_identity += 1;
            continue;
        };

        let setor = row.get_mapped(sector_col).to_text().trim().to_string();
        let account = ActiveAccount {
            codigo_revendedora: code_raw.to_text().trim().to_string(),
            codigo_normalizado,
            nome_revendedora: name_raw.to_text().trim().to_string(),
            nome_normalizado,
            setor: if setor.is_empty() { DEFAULT_SECTOR.to_string() } else { setor },
            ciclo_faturamento: row_cycle,
        };
        roster.insert_first(key, account);
    }

    log::debug!(
        "roster for cycle {selector}: {} active, {} rows without identity",
        roster.len(),
        roster.skipped_without_identity
    );

    roster
}
