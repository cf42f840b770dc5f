use std::collections::HashMap;

use crate::model::{AccountAnalysis, Classification, SectorSummary};
use crate::normalize::compare_labels;
use crate::roster::DEFAULT_SECTOR;

/// Share of `count` in `total`, as a percentage. Zero when `total` is zero.
pub fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[derive(Default)]
struct Tally {
    total: usize,
    multimarca: usize,
    monomarca: usize,
    sem_marca: usize,
}

/// Group accounts by sector, count classifications, sort sectors by name.
pub fn summarize_sectors(accounts: &[AccountAnalysis]) -> Vec<SectorSummary> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();

    for account in accounts {
        let setor = if account.setor.is_empty() { DEFAULT_SECTOR } else { account.setor.as_str() };
        let tally = tallies.entry(setor).or_default();
        tally.total += 1;
        match account.classification {
            Classification::Multimarca => tally.multimarca += 1,
            Classification::MonoMarca => tally.monomarca += 1,
            Classification::SemMarca => tally.sem_marca += 1,
        }
    }

    let mut summaries: Vec<SectorSummary> = tallies
        .into_iter()
        .map(|(setor, t)| SectorSummary {
            setor: setor.to_string(),
            total_ativos: t.total,
            multimarca: t.multimarca,
            percent_multimarca: percent(t.multimarca, t.total),
            monomarca: t.monomarca,
            percent_monomarca: percent(t.monomarca, t.total),
            sem_marca: t.sem_marca,
            percent_sem_marca: percent(t.sem_marca, t.total),
        })
        .collect();

    summaries.sort_by(|a, b| compare_labels(&a.setor, &b.setor));
    summaries
}
