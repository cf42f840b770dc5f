use crate::brand::PerBrand;
use crate::model::{AccountAnalysis, AuditData, Classification, CycleSelector, MatchedBy};
use crate::roster::ActiveRoster;

/// Match counters accumulated during the single pass over the roster.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MatchTally {
    pub matched_by_codigo: usize,
    pub matched_by_nome: usize,
    pub total_por_marca: PerBrand<usize>,
}

impl MatchTally {
    /// Count an account's first match. Call at most once per account.
    pub fn record_first_match(&mut self, by: MatchedBy) {
        match by {
            MatchedBy::Codigo => self.matched_by_codigo += 1,
            MatchedBy::Nome => self.matched_by_nome += 1,
        }
    }
}

/// Run-level audit data from the finished analyses.
pub fn build_audit(
    roster: &ActiveRoster,
    accounts: &[AccountAnalysis],
    tally: MatchTally,
    selector: &CycleSelector,
) -> AuditData {
    let sem_marca_list: Vec<AccountAnalysis> = accounts
        .iter()
        .filter(|a| a.classification == Classification::SemMarca)
        .cloned()
        .collect();

    AuditData {
        total_ativos: roster.len(),
        matched_by_codigo: tally.matched_by_codigo,
        matched_by_nome: tally.matched_by_nome,
        sem_marca: sem_marca_list.len(),
        sem_marca_list,
        ciclo_selecionado: selector.label().to_string(),
        total_por_marca: tally.total_por_marca,
        descartados_sem_identidade: roster.skipped_without_identity,
    }
}
