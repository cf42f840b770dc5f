//! Tabular renderings of a result, shared by the CSV and spreadsheet writers.
//!
//! Values are taken from the engine result as-is; percentages are formatted,
//! never recomputed.

use crate::error::ReconError;
use crate::model::{AccountAnalysis, CellValue, SectorSummary};
use crate::normalize::{compare_labels, normalize_name};

/// A rendered table: header row plus string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// Percentage with two decimals and a `%` sign.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

pub fn sector_summary_table(summaries: &[SectorSummary]) -> Table {
    Table {
        headers: vec![
            "Setor",
            "Ativos",
            "Multimarca",
            "% Multimarca",
            "Mono-marca",
            "% Mono-marca",
            "Sem marca",
            "% Sem marca",
        ],
        rows: summaries
            .iter()
            .map(|s| {
                vec![
                    s.setor.clone(),
                    s.total_ativos.to_string(),
                    s.multimarca.to_string(),
                    format_percent(s.percent_multimarca),
                    s.monomarca.to_string(),
                    format_percent(s.percent_monomarca),
                    s.sem_marca.to_string(),
                    format_percent(s.percent_sem_marca),
                ]
            })
            .collect(),
    }
}

pub fn account_details_table(accounts: &[AccountAnalysis]) -> Table {
    Table {
        headers: vec![
            "Código",
            "Nome",
            "Setor",
            "Qtd Marcas",
            "Marcas",
            "Classificação",
            "Match Por",
        ],
        rows: accounts
            .iter()
            .map(|a| {
                vec![
                    a.codigo_revendedora.clone(),
                    a.nome_revendedora.clone(),
                    a.setor.clone(),
                    a.brand_count.to_string(),
                    a.brands_purchased
                        .iter()
                        .map(|b| b.label())
                        .collect::<Vec<_>>()
                        .join("; "),
                    a.classification.to_string(),
                    a.matched_by.map_or_else(|| "N/A".to_string(), |m| m.to_string()),
                ]
            })
            .collect(),
    }
}

pub fn sem_marca_table(accounts: &[AccountAnalysis]) -> Table {
    Table {
        headers: vec!["Código", "Nome", "Setor"],
        rows: accounts
            .iter()
            .map(|a| vec![a.codigo_revendedora.clone(), a.nome_revendedora.clone(), a.setor.clone()])
            .collect(),
    }
}

/// Accounts of one sector, sorted by name, for a per-sector detail table.
///
/// The sector is compared case- and accent-insensitively.
pub fn sector_accounts(accounts: &[AccountAnalysis], setor: &str) -> Vec<AccountAnalysis> {
    let wanted = normalize_name(&CellValue::from(setor));
    let mut out: Vec<AccountAnalysis> = accounts
        .iter()
        .filter(|a| normalize_name(&CellValue::from(a.setor.as_str())) == wanted)
        .cloned()
        .collect();
    out.sort_by(|a, b| compare_labels(&a.nome_revendedora, &b.nome_revendedora));
    out
}

/// Render a table as comma-separated text with RFC 4180 quoting.
pub fn to_csv(table: &Table) -> Result<String, ReconError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(&table.headers)
        .map_err(|e| ReconError::Export(e.to_string()))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| ReconError::Export(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ReconError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReconError::Export(e.to_string()))
}
