//! `multimarca-recon`: active-roster vs brand-ledger reconciliation.
//!
//! Pure engine crate: receives pre-parsed rows and column mappings, returns
//! per-account classifications, per-sector summaries and audit counters.
//! No CLI or file IO dependencies.

pub mod aggregate;
pub mod audit;
pub mod brand;
pub mod config;
pub mod cycles;
pub mod engine;
pub mod error;
pub mod export;
pub mod mapping;
pub mod model;
pub mod normalize;
pub mod purchases;
pub mod roster;

pub use brand::{Brand, PerBrand};
pub use config::ReconConfig;
pub use engine::{reconcile, run, ReconInput};
pub use error::ReconError;
pub use mapping::{auto_map_columns, ColumnMapping, DatasetKind};
pub use model::{
    AccountAnalysis, BrandDataset, CellValue, Classification, CycleSelector, MatchedBy, RawRow,
    ReconResult, SectorSummary,
};
