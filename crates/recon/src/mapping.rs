//! Column mapping: which raw header holds which semantic field.
//!
//! The engine trusts a supplied mapping; [`auto_map_columns`] proposes one
//! from the file's headers for callers that have none.

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::normalize::normalize_column_name;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CodigoRevendedora,
    NomeRevendedora,
    Setor,
    CicloFaturamento,
    CicloCaptacao,
    Tipo,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CodigoRevendedora => "codigo_revendedora",
            Self::NomeRevendedora => "nome_revendedora",
            Self::Setor => "setor",
            Self::CicloFaturamento => "ciclo_faturamento",
            Self::CicloCaptacao => "ciclo_captacao",
            Self::Tipo => "tipo",
        }
    }

    /// Normalized header spellings recognized for this field.
    pub fn variations(&self) -> &'static [&'static str] {
        match self {
            Self::Setor => &["setor", "sector", "regiao", "area"],
            Self::CodigoRevendedora => &[
                "codigorevendedora",
                "codigo",
                "cod",
                "codigore",
                "codigodarevendedora",
                "codrevendedora",
                "codrev",
                "revendedoracodigo",
                "idrevendedora",
                "id",
            ],
            Self::NomeRevendedora => &[
                "nomerevendedora",
                "nome",
                "revendedora",
                "nomedarevendedora",
                "nomrev",
                "revendedoranome",
            ],
            Self::CicloFaturamento => &[
                "ciclofaturamento",
                "ciclo",
                "ciclofat",
                "faturamento",
                "ciclodefaturamento",
            ],
            Self::CicloCaptacao => &["ciclocaptacao", "captacao", "ciclodecaptacao", "ciclocapt"],
            Self::Tipo => &["tipo", "type", "tipovenda", "tipooperacao"],
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const ALL_FIELDS: [Field; 6] = [
    Field::CodigoRevendedora,
    Field::NomeRevendedora,
    Field::Setor,
    Field::CicloFaturamento,
    Field::CicloCaptacao,
    Field::Tipo,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    /// The master roster ("Geral").
    Master,
    /// A brand transaction ledger.
    Brand,
}

impl DatasetKind {
    pub fn required_fields(&self) -> &'static [Field] {
        match self {
            Self::Master => &[
                Field::CodigoRevendedora,
                Field::NomeRevendedora,
                Field::Setor,
                Field::CicloFaturamento,
            ],
            Self::Brand => &[Field::CodigoRevendedora, Field::NomeRevendedora, Field::Tipo],
        }
    }

    pub fn optional_fields(&self) -> &'static [Field] {
        match self {
            Self::Master => &[],
            Self::Brand => &[Field::CicloFaturamento, Field::CicloCaptacao],
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnMapping {
    pub codigo_revendedora: String,
    pub nome_revendedora: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ciclo_faturamento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ciclo_captacao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
}

impl ColumnMapping {
    /// Column mapped to `field`; blank names count as unmapped.
    pub fn column(&self, field: Field) -> Option<&str> {
        let col = match field {
            Field::CodigoRevendedora => Some(self.codigo_revendedora.as_str()),
            Field::NomeRevendedora => Some(self.nome_revendedora.as_str()),
            Field::Setor => self.setor.as_deref(),
            Field::CicloFaturamento => self.ciclo_faturamento.as_deref(),
            Field::CicloCaptacao => self.ciclo_captacao.as_deref(),
            Field::Tipo => self.tipo.as_deref(),
        };
        col.filter(|c| !c.trim().is_empty())
    }

    fn set(&mut self, field: Field, column: &str) {
        let column = column.to_string();
        match field {
            Field::CodigoRevendedora => self.codigo_revendedora = column,
            Field::NomeRevendedora => self.nome_revendedora = column,
            Field::Setor => self.setor = Some(column),
            Field::CicloFaturamento => self.ciclo_faturamento = Some(column),
            Field::CicloCaptacao => self.ciclo_captacao = Some(column),
            Field::Tipo => self.tipo = Some(column),
        }
    }

    /// Effective cycle column for a brand ledger: billing cycle if mapped,
    /// else capture cycle.
    pub fn cycle_column(&self) -> Option<&str> {
        self.column(Field::CicloFaturamento)
            .or_else(|| self.column(Field::CicloCaptacao))
    }

    /// Fails on the first required field with no column.
    pub fn validate(&self, kind: DatasetKind, dataset: &str) -> Result<(), ReconError> {
        match kind.required_fields().iter().find(|f| self.column(**f).is_none()) {
            Some(field) => Err(ReconError::MissingRequiredField {
                dataset: dataset.to_string(),
                field: field.as_str().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Copy with every field mapped to one of `columns` left unmapped.
    pub fn without_columns(&self, columns: &[String]) -> ColumnMapping {
        let mut out = self.clone();
        for field in ALL_FIELDS {
            if self.column(field).is_some_and(|c| columns.iter().any(|m| m == c)) {
                out.clear(field);
            }
        }
        out
    }

    fn clear(&mut self, field: Field) {
        match field {
            Field::CodigoRevendedora => self.codigo_revendedora.clear(),
            Field::NomeRevendedora => self.nome_revendedora.clear(),
            Field::Setor => self.setor = None,
            Field::CicloFaturamento => self.ciclo_faturamento = None,
            Field::CicloCaptacao => self.ciclo_captacao = None,
            Field::Tipo => self.tipo = None,
        }
    }

    /// Every mapped column that `headers` lacks.
    pub fn missing_headers(&self, headers: &[String]) -> Vec<String> {
        ALL_FIELDS
            .iter()
            .filter_map(|f| self.column(*f))
            .filter(|c| !headers.iter().any(|h| h == c))
            .map(str::to_string)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Auto-mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AutoMapping {
    /// Present only when every required field resolved.
    pub mapping: Option<ColumnMapping>,
    /// Best-effort assignments, complete or not.
    pub partial: ColumnMapping,
    pub unmapped: Vec<Field>,
}

/// Propose a mapping from raw headers.
///
/// Exact matches on a normalized variation are resolved for every field
/// before any substring match, and a header claimed by one field is not
/// offered to another.
pub fn auto_map_columns(columns: &[String], kind: DatasetKind) -> AutoMapping {
    let normalized: Vec<(usize, String)> = columns
        .iter()
        .map(|c| normalize_column_name(c))
        .enumerate()
        .filter(|(_, n)| !n.is_empty())
        .collect();

    let fields: Vec<Field> = kind
        .required_fields()
        .iter()
        .chain(kind.optional_fields())
        .copied()
        .collect();

    let mut claimed = vec![false; columns.len()];
    let mut assigned: Vec<Option<usize>> = vec![None; fields.len()];

    let exact = |n: &str, v: &str| n == v;
    let loose = |n: &str, v: &str| n.contains(v) || v.contains(n);
    for matches in [&exact as &dyn Fn(&str, &str) -> bool, &loose] {
        for (slot, field) in fields.iter().enumerate() {
            if assigned[slot].is_some() {
                continue;
            }
            let hit = normalized.iter().find(|(i, n)| {
                !claimed[*i] && field.variations().iter().any(|v| matches(n.as_str(), *v))
            });
            if let Some((i, _)) = hit {
                claimed[*i] = true;
                assigned[slot] = Some(*i);
            }
        }
    }

    let mut mapping = ColumnMapping::default();
    let mut unmapped = Vec::new();
    let required = kind.required_fields();
    for (field, slot) in fields.iter().zip(&assigned) {
        match slot {
            Some(i) => mapping.set(*field, &columns[*i]),
            None if required.contains(field) => unmapped.push(*field),
            None => {}
        }
    }

    AutoMapping {
        mapping: unmapped.is_empty().then(|| mapping.clone()),
        partial: mapping,
        unmapped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn auto_map_master_headers() {
        let auto = auto_map_columns(
            &cols(&["Setor", "Código Revendedora", "Nome Revendedora", "Ciclo Faturamento"]),
            DatasetKind::Master,
        );
        let m = auto.mapping.unwrap();
        assert_eq!(m.codigo_revendedora, "Código Revendedora");
        assert_eq!(m.nome_revendedora, "Nome Revendedora");
        assert_eq!(m.setor.as_deref(), Some("Setor"));
        assert_eq!(m.ciclo_faturamento.as_deref(), Some("Ciclo Faturamento"));
        assert!(auto.unmapped.is_empty());
    }

    #[test]
    fn absent_headers_become_unmapped() {
        let mapping = ColumnMapping {
            codigo_revendedora: "Cod".into(),
            nome_revendedora: "Nome".into(),
            tipo: Some("Tipo Venda".into()),
            ciclo_faturamento: Some("Ciclo".into()),
            ..Default::default()
        };
        let headers = cols(&["Cod", "Nome", "Ciclo"]);
        let missing = mapping.missing_headers(&headers);
        assert_eq!(missing, vec!["Tipo Venda"]);

        let cleared = mapping.without_columns(&missing);
        assert_eq!(cleared.tipo, None);
        assert_eq!(cleared.codigo_revendedora, "Cod");
        assert_eq!(cleared.cycle_column(), Some("Ciclo"));
        assert!(cleared.missing_headers(&headers).is_empty());
        assert_eq!(
            cleared.validate(DatasetKind::Brand, "Eudora"),
            Err(ReconError::MissingRequiredField {
                dataset: "Eudora".into(),
                field: "tipo".into(),
            })
        );
    }

    #[test]
    fn claimed_header_not_reused() {
        // "NomeRevendedora" contains "revendedora"; the code column must not
        // steal it, nor the name field steal the code column.
        let auto = auto_map_columns(
            &cols(&["CodigoRevendedora", "NomeRevendedora", "Tipo"]),
            DatasetKind::Brand,
        );
        let m = auto.mapping.unwrap();
        assert_eq!(m.codigo_revendedora, "CodigoRevendedora");
        assert_eq!(m.nome_revendedora, "NomeRevendedora");
        assert_eq!(m.tipo.as_deref(), Some("Tipo"));
        assert_eq!(m.ciclo_faturamento, None);
    }

    #[test]
    fn brand_capture_cycle_is_optional_fallback() {
        let auto = auto_map_columns(
            &cols(&["Cod", "Nome", "Tipo", "Ciclo Captação"]),
            DatasetKind::Brand,
        );
        let m = auto.mapping.unwrap();
        assert_eq!(m.ciclo_captacao.as_deref(), Some("Ciclo Captação"));
        assert_eq!(m.cycle_column(), Some("Ciclo Captação"));
    }

    #[test]
    fn billing_cycle_preferred_over_capture() {
        let m = ColumnMapping {
            codigo_revendedora: "c".into(),
            nome_revendedora: "n".into(),
            ciclo_faturamento: Some("fat".into()),
            ciclo_captacao: Some("cap".into()),
            tipo: Some("t".into()),
            ..Default::default()
        };
        assert_eq!(m.cycle_column(), Some("fat"));
    }

    #[test]
    fn incomplete_headers_report_unmapped() {
        let auto = auto_map_columns(&cols(&["Nome", "Valor", ""]), DatasetKind::Master);
        assert!(auto.mapping.is_none());
        assert!(auto.unmapped.contains(&Field::CodigoRevendedora));
        assert!(auto.unmapped.contains(&Field::Setor));
        assert!(auto.unmapped.contains(&Field::CicloFaturamento));
        assert_eq!(auto.partial.nome_revendedora, "Nome");
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let m = ColumnMapping {
            codigo_revendedora: "c".into(),
            nome_revendedora: "n".into(),
            setor: Some("  ".into()),
            ..Default::default()
        };
        let err = m.validate(DatasetKind::Master, "geral").unwrap_err();
        assert_eq!(
            err,
            ReconError::MissingRequiredField {
                dataset: "geral".into(),
                field: "setor".into(),
            }
        );
    }

    #[test]
    fn missing_headers_lists_absent_columns() {
        let m = ColumnMapping {
            codigo_revendedora: "Cod".into(),
            nome_revendedora: "Nome".into(),
            tipo: Some("Tipo".into()),
            ..Default::default()
        };
        assert_eq!(m.missing_headers(&cols(&["Cod", "Tipo"])), vec!["Nome".to_string()]);
    }
}
