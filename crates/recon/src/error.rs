use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (duplicate brand, empty file path, etc.).
    ConfigValidation(String),
    /// A brand name outside the fixed five-brand set.
    UnknownBrand(String),
    /// A mapping lacks a semantic field the engine needs for that dataset.
    MissingRequiredField { dataset: String, field: String },
    /// CSV rendering of a result table failed.
    Export(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownBrand(name) => {
                write!(f, "unknown brand: '{name}' (expected one of oBoticário, Eudora, AuAmigos, O.U.I, QDB)")
            }
            Self::MissingRequiredField { dataset, field } => {
                write!(f, "dataset '{dataset}': no column mapped for required field '{field}'")
            }
            Self::Export(msg) => write!(f, "export error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
