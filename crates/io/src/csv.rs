// CSV/TSV import and export

use std::path::Path;

use multimarca_recon::export;
use multimarca_recon::model::{CellValue, RawRow};

use crate::{placeholder_header, Table};

pub fn import(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter)
}

/// Field count of one line under `delimiter`, honoring quotes.
fn field_count(line: &str, delimiter: u8) -> usize {
    ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

/// Guess the delimiter of exported ledgers (`;` from pt-BR Excel, `,`, tab, `|`).
///
/// The header line must split into more than one field. Among candidates
/// that pass, the one whose header width is repeated by the most sample
/// lines wins, weighted by that width. Falls back to `,`.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().take(10).collect();
    let Some(header) = sample.first() else {
        return b',';
    };

    [b';', b',', b'\t', b'|']
        .into_iter()
        .filter_map(|delim| {
            let width = field_count(header, delim);
            if width <= 1 {
                return None;
            }
            let agreeing = sample.iter().filter(|l| field_count(l, delim) == width).count();
            Some((agreeing * width, delim))
        })
        // First candidate wins ties
        .fold(None, |best: Option<(usize, u8)>, (score, delim)| match best {
            Some((best_score, _)) if best_score >= score => best,
            _ => Some((score, delim)),
        })
        .map_or(b',', |(_, delim)| delim)
}

/// Read a file as text. Non-UTF-8 input is decoded as Windows-1252, the
/// encoding of most Excel "CSV" exports, and a leading BOM is dropped.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;

    let text = String::from_utf8(bytes).unwrap_or_else(|e| {
        log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
        encoding_rs::WINDOWS_1252.decode(e.as_bytes()).0.into_owned()
    });

    match text.strip_prefix('\u{feff}') {
        Some(rest) => Ok(rest.to_string()),
        None => Ok(text),
    }
}

/// Parse delimited text whose first record is the header row.
///
/// Every cell is kept as text. Short records read missing cells as empty.
pub fn import_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = h.trim();
            if h.is_empty() {
                placeholder_header(i)
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let mut row = RawRow::new();
        for (col, field) in columns.iter().zip(record.iter()) {
            row.insert(col.clone(), CellValue::from(field));
        }
        rows.push(row);
    }

    Ok(Table { columns, rows })
}

/// Write a rendered result table as CSV.
pub fn export_table(table: &export::Table, path: &Path) -> Result<(), String> {
    let text = export::to_csv(table).map_err(|e| e.to_string())?;
    std::fs::write(path, text).map_err(|e| format!("{}: {}", path.display(), e))
}
