use std::collections::HashMap;

use serde::Serialize;

use crate::brand::{Brand, PerBrand};
use crate::mapping::ColumnMapping;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// An untyped spreadsheet cell, as handed over by the file loader.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Plain string form. Integral floats print without a fraction.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// One source-file line: column name → cell. Missing columns read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: HashMap<String, CellValue>,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<CellValue>,
    {
        Self {
            cells: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    /// Cell under an optionally mapped column; unmapped reads as empty.
    pub fn get_mapped(&self, column: Option<&str>) -> &CellValue {
        column.map_or(&EMPTY_CELL, |c| self.get(c))
    }
}

/// Rows of one brand ledger plus its column mapping.
#[derive(Debug, Clone)]
pub struct BrandDataset {
    pub rows: Vec<RawRow>,
    pub mapping: ColumnMapping,
}

/// Which cycles a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleSelector {
    /// No cycle filtering anywhere.
    All,
    /// A single normalized cycle label.
    Cycle(String),
}

impl CycleSelector {
    /// `"ALL"` (or the legacy `"TODOS"`) selects every cycle; anything else
    /// is normalized like a cycle cell.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("ALL") || trimmed.eq_ignore_ascii_case("TODOS") {
            Self::All
        } else {
            Self::Cycle(crate::normalize::normalize_cycle_str(trimmed))
        }
    }

    /// True when `cycle` (already normalized) is covered by this selector.
    pub fn accepts(&self, cycle: &str) -> bool {
        match self {
            Self::All => true,
            Self::Cycle(c) => c == cycle,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "ALL",
            Self::Cycle(c) => c,
        }
    }
}

impl std::fmt::Display for CycleSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Dedup key for a roster entry. Codes and names live in separate
/// namespaces so an empty-code record named "X" never collides with code "X".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Code(String),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAccount {
    pub codigo_revendedora: String,
    pub codigo_normalizado: String,
    pub nome_revendedora: String,
    pub nome_normalizado: String,
    pub setor: String,
    pub ciclo_faturamento: String,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Classification {
    #[serde(rename = "Multimarca")]
    Multimarca,
    #[serde(rename = "Mono-marca")]
    MonoMarca,
    #[serde(rename = "Sem marca")]
    SemMarca,
}

impl Classification {
    pub fn from_brand_count(count: usize) -> Self {
        match count {
            0 => Self::SemMarca,
            1 => Self::MonoMarca,
            _ => Self::Multimarca,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Multimarca => write!(f, "Multimarca"),
            Self::MonoMarca => write!(f, "Mono-marca"),
            Self::SemMarca => write!(f, "Sem marca"),
        }
    }
}

/// Strategy that produced an account's first brand match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedBy {
    Codigo,
    Nome,
}

impl std::fmt::Display for MatchedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Codigo => write!(f, "codigo"),
            Self::Nome => write!(f, "nome"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAnalysis {
    pub codigo_revendedora: String,
    pub codigo_normalizado: String,
    pub nome_revendedora: String,
    pub nome_normalizado: String,
    pub setor: String,
    pub brands_purchased: Vec<Brand>,
    pub brand_count: usize,
    pub classification: Classification,
    pub matched_by: Option<MatchedBy>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorSummary {
    pub setor: String,
    pub total_ativos: usize,
    pub multimarca: usize,
    pub percent_multimarca: f64,
    pub monomarca: usize,
    pub percent_monomarca: f64,
    pub sem_marca: usize,
    pub percent_sem_marca: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditData {
    pub total_ativos: usize,
    pub matched_by_codigo: usize,
    pub matched_by_nome: usize,
    pub sem_marca: usize,
    pub sem_marca_list: Vec<AccountAnalysis>,
    pub ciclo_selecionado: String,
    pub total_por_marca: PerBrand<usize>,
    pub descartados_sem_identidade: usize,
}

impl AuditData {
    /// Zero-filled audit for a run that found no active accounts.
    pub fn empty(selector: &CycleSelector, descartados_sem_identidade: usize) -> Self {
        Self {
            total_ativos: 0,
            matched_by_codigo: 0,
            matched_by_nome: 0,
            sem_marca: 0,
            sem_marca_list: Vec::new(),
            ciclo_selecionado: selector.label().to_string(),
            total_por_marca: PerBrand::default(),
            descartados_sem_identidade,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconResult {
    pub resellers: Vec<AccountAnalysis>,
    pub sector_summaries: Vec<SectorSummary>,
    pub audit: AuditData,
    pub success: bool,
    pub errors: Vec<String>,
}
