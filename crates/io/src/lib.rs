//! File loading for the reconciliation engine.
//!
//! Turns CSV/TSV and spreadsheet files into header + `RawRow` tables, and
//! writes result tables back out as XLSX.

pub mod csv;
pub mod xlsx;

use std::path::Path;

use multimarca_recon::model::RawRow;

/// A parsed file: header names in column order plus one row per data line.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Header for a column whose header cell is blank (1-based).
pub(crate) fn placeholder_header(col_idx: usize) -> String {
    format!("Coluna{}", col_idx + 1)
}

/// Load a table, choosing the reader by file extension.
///
/// `.xlsx`, `.xlsm`, `.xls`, `.xlsb` and `.ods` go through the spreadsheet
/// reader (first sheet only); `.tsv` is tab-separated; anything else is
/// treated as delimited text with a sniffed delimiter.
pub fn load_table(path: &Path) -> Result<Table, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => xlsx::import(path)?,
        "tsv" => csv::import_with_delimiter(path, b'\t')?,
        _ => csv::import(path)?,
    };

    log::debug!(
        "loaded {}: {} columns, {} rows",
        path.display(),
        table.columns.len(),
        table.rows.len()
    );
    Ok(table)
}
