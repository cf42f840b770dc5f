use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::brand::Brand;
use crate::error::ReconError;
use crate::mapping::ColumnMapping;
use crate::model::CycleSelector;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    pub name: String,
    /// Cycle label or "ALL". Defaults to "ALL".
    #[serde(default)]
    pub cycle: Option<String>,
    pub master: DatasetConfig,
    /// Keyed by brand name or slug (`oboticario`, `eudora`, `auamigos`, `oui`, `qdb`).
    #[serde(default)]
    pub brands: BTreeMap<String, DatasetConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    pub file: String,
    /// Explicit mapping. When absent, callers auto-map from the file headers.
    #[serde(default)]
    pub columns: Option<ColumnMapping>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
    /// Directory for the exported tables.
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.master.file.trim().is_empty() {
            return Err(ReconError::ConfigValidation("master: file must not be empty".into()));
        }

        if let Some(cycle) = &self.cycle {
            if cycle.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "cycle must be a cycle label or \"ALL\"".into(),
                ));
            }
        }

        // Each brand key must name a distinct brand
        let mut seen: HashMap<Brand, &str> = HashMap::new();
        for (key, dataset) in &self.brands {
            let brand = Brand::from_name(key)?;
            if let Some(prev) = seen.insert(brand, key) {
                return Err(ReconError::ConfigValidation(format!(
                    "brands '{prev}' and '{key}' both name {brand}"
                )));
            }
            if dataset.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "brand '{key}': file must not be empty"
                )));
            }
        }

        Ok(())
    }

    pub fn selector(&self) -> CycleSelector {
        CycleSelector::parse(self.cycle.as_deref().unwrap_or("ALL"))
    }

    /// Brand datasets resolved to the closed brand set, in brand order.
    pub fn brand_datasets(&self) -> Result<Vec<(Brand, &DatasetConfig)>, ReconError> {
        let mut out = self
            .brands
            .iter()
            .map(|(key, ds)| Ok((Brand::from_name(key)?, ds)))
            .collect::<Result<Vec<_>, ReconError>>()?;
        out.sort_by_key(|(brand, _)| *brand);
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
