// Spreadsheet import (xlsx, xls, xlsb, ods) and export (xlsx only)
//
// Import: first sheet only, first row is the header.
// Export: one worksheet per result table, percent columns written as numbers.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use multimarca_recon::export;
use multimarca_recon::model::{CellValue, RawRow};

use crate::{placeholder_header, Table};

/// Maximum number of data rows to import (prevents DoS from huge files)
const MAX_ROWS: usize = 1_048_576;

/// Convert a calamine cell into an engine cell.
fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Dates stay as serials; cycle labels are plain numbers or text
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from(s.as_str()),
        // Error cells are unreadable; they normalize to nothing
        Data::Error(_) => CellValue::Empty,
    }
}

/// Import the first sheet of a workbook.
pub fn import(path: &Path) -> Result<Table, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open spreadsheet {}: {}", path.display(), e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| format!("{} contains no sheets", path.display()))?
        .map_err(|e| format!("Failed to read first sheet of {}: {}", path.display(), e))?;

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        return Ok(Table::default());
    };

    let columns: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = to_cell(cell).to_text().trim().to_string();
            if name.is_empty() {
                placeholder_header(i)
            } else {
                name
            }
        })
        .collect();

    let mut rows = Vec::new();
    for (row_idx, cells) in rows_iter.enumerate() {
        if row_idx >= MAX_ROWS {
            log::warn!("{}: import stopped at {} rows (limit reached)", path.display(), MAX_ROWS);
            break;
        }
        if cells.iter().all(|c| to_cell(c).is_empty()) {
            continue;
        }
        let mut row = RawRow::new();
        for (col, cell) in columns.iter().zip(cells.iter()) {
            row.insert(col.clone(), to_cell(cell));
        }
        rows.push(row);
    }

    Ok(Table { columns, rows })
}

/// Percent columns are exported as numbers rounded to two decimals.
fn percent_value(cell: &str) -> Option<f64> {
    let n: f64 = cell.strip_suffix('%')?.parse().ok()?;
    Some((n * 100.0).round() / 100.0)
}

/// Write rendered tables to an .xlsx file, one worksheet per `(name, table)`.
///
/// Count columns are written as numbers, percent columns (headers starting
/// with `% `) as numbers without the `%` sign, everything else as text.
pub fn export_tables(tables: &[(&str, &export::Table)], path: &Path) -> Result<(), String> {
    let mut xlsx_workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();

    for (name, table) in tables {
        let worksheet = xlsx_workbook
            .add_worksheet()
            .set_name(*name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", name, e))?;

        for (col, header) in table.headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *header, &header_format)
                .map_err(|e| format!("Failed to write header: {}", e))?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let r = row_idx as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let c = col as u16;
                let is_count = matches!(
                    table.headers.get(col),
                    Some(&("Ativos" | "Multimarca" | "Mono-marca" | "Sem marca" | "Qtd Marcas"))
                );
                let is_percent = table.headers.get(col).is_some_and(|h| h.starts_with("% "));
                let written = if let Some(pct) = percent_value(cell).filter(|_| is_percent) {
                    worksheet.write_number(r, c, pct).map(|_| ())
                } else if let (true, Ok(n)) = (is_count, cell.parse::<f64>()) {
                    worksheet.write_number(r, c, n).map(|_| ())
                } else {
                    worksheet.write_string(r, c, cell).map(|_| ())
                };
                written.map_err(|e| format!("Failed to write cell ({}, {}): {}", r, c, e))?;
            }
        }
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))
}
