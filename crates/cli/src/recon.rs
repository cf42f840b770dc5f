//! `multimarca run | validate | cycles | map`: config-driven reconciliation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use multimarca_io::Table;
use multimarca_recon::config::{DatasetConfig, ExportFormat};
use multimarca_recon::cycles::extract_cycles;
use multimarca_recon::engine::MASTER_DATASET;
use multimarca_recon::export;
use multimarca_recon::{
    auto_map_columns, Brand, BrandDataset, ColumnMapping, CycleSelector, DatasetKind, ReconConfig,
    ReconError, ReconInput, ReconResult,
};

use crate::exit_codes::{EXIT_ERROR, EXIT_NO_ACTIVE};
use crate::{CliError, TableFormat};

pub struct RunArgs {
    pub config: PathBuf,
    pub cycle: Option<String>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub format: Option<TableFormat>,
    pub sector: Option<String>,
}

impl From<TableFormat> for ExportFormat {
    fn from(f: TableFormat) -> Self {
        match f {
            TableFormat::Csv => ExportFormat::Csv,
            TableFormat::Xlsx => ExportFormat::Xlsx,
        }
    }
}

/// JSON written by `run`: the engine result plus run metadata.
///
/// The timestamp lives here so the engine result stays identical across
/// runs on the same input.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport<'a> {
    name: &'a str,
    engine_version: &'static str,
    generated_at: String,
    #[serde(flatten)]
    result: &'a ReconResult,
}

// ============================================================================
// Loading
// ============================================================================

fn read_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| CliError::config(e.to_string()))
}

fn base_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new("."))
}

fn load(path: &Path) -> Result<Table, CliError> {
    multimarca_io::load_table(path).map_err(CliError::io)
}

/// Explicit mapping from the config, or one proposed from the headers.
///
/// A master file that cannot be auto-mapped is an error. A brand ledger
/// that cannot be auto-mapped passes its partial mapping through; the
/// engine then skips that brand and reports it in `errors`.
fn resolve_mapping(
    label: &str,
    dataset: &DatasetConfig,
    table: &Table,
    kind: DatasetKind,
) -> Result<ColumnMapping, CliError> {
    if let Some(explicit) = &dataset.columns {
        let missing = explicit.missing_headers(&table.columns);
        if kind == DatasetKind::Brand {
            // Absent columns are unmapped; the engine skips an incomplete brand
            if !missing.is_empty() {
                log::warn!(
                    "{label}: column(s) not found in {}: {}",
                    dataset.file,
                    missing.join(", ")
                );
            }
            return Ok(explicit.without_columns(&missing));
        }

        explicit
            .validate(kind, label)
            .map_err(|e| CliError::mapping(e.to_string()))?;
        if !missing.is_empty() {
            return Err(CliError::mapping(format!(
                "{label}: column(s) not found in {}: {}",
                dataset.file,
                missing.join(", ")
            ))
            .with_hint(format!("available columns: {}", table.columns.join(", "))));
        }
        return Ok(explicit.clone());
    }

    let auto = auto_map_columns(&table.columns, kind);
    if let Some(mapping) = auto.mapping {
        log::debug!("{label}: auto-mapped columns {:?}", mapping);
        return Ok(mapping);
    }

    let fields: Vec<&str> = auto.unmapped.iter().map(|f| f.as_str()).collect();
    match kind {
        DatasetKind::Master => Err(CliError::mapping(format!(
            "{label}: could not auto-map required field(s) {} in {}",
            fields.join(", "),
            dataset.file
        ))
        .with_hint(format!(
            "add a [master.columns] table; `multimarca map {} --master` prints a starting point",
            dataset.file
        ))),
        DatasetKind::Brand => {
            log::warn!(
                "{label}: could not auto-map required field(s) {} in {}",
                fields.join(", "),
                dataset.file
            );
            Ok(auto.partial)
        }
    }
}

fn load_input(config: &ReconConfig, base: &Path) -> Result<ReconInput, CliError> {
    let master_table = load(&base.join(&config.master.file))?;
    let master_mapping =
        resolve_mapping(MASTER_DATASET, &config.master, &master_table, DatasetKind::Master)?;

    let brand_list = config
        .brand_datasets()
        .map_err(|e| CliError::config(e.to_string()))?;

    let mut brands: HashMap<Brand, BrandDataset> = HashMap::new();
    for (brand, dataset) in brand_list {
        let table = load(&base.join(&dataset.file))?;
        let mapping = resolve_mapping(brand.label(), dataset, &table, DatasetKind::Brand)?;
        brands.insert(brand, BrandDataset { rows: table.rows, mapping });
    }

    Ok(ReconInput {
        master_rows: master_table.rows,
        master_mapping,
        brands,
    })
}

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = read_config(&args.config)?;
    let base = base_dir(&args.config);

    let selector = match args.cycle.as_deref() {
        Some(c) if c.trim().is_empty() => {
            return Err(CliError::args("--cycle must be a cycle label or ALL"));
        }
        Some(c) => CycleSelector::parse(c),
        None => config.selector(),
    };

    let export_dir = args
        .export_dir
        .or_else(|| config.output.dir.as_ref().map(|d| base.join(d)));
    if args.sector.is_some() && export_dir.is_none() {
        return Err(CliError::args("--sector needs an export directory")
            .with_hint("pass --export-dir or set `dir` under [output]"));
    }

    let input = load_input(&config, base)?;

    let result = multimarca_recon::run(&input, &selector).map_err(|e| match e {
        ReconError::MissingRequiredField { .. } => CliError::mapping(e.to_string()),
        other => CliError::new(EXIT_ERROR, other.to_string()),
    })?;

    let report = RunReport {
        name: &config.name,
        engine_version: env!("CARGO_PKG_VERSION"),
        generated_at: chrono::Utc::now().to_rfc3339(),
        result: &result,
    };
    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    let json_path = args
        .output
        .or_else(|| config.output.json.as_ref().map(|p| base.join(p)));
    if let Some(ref path) = json_path {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    }

    if !result.success {
        return Err(CliError::new(EXIT_NO_ACTIVE, result.errors.join("; ")).with_hint(format!(
            "`multimarca cycles {}` lists the cycles in the master file",
            base.join(&config.master.file).display()
        )));
    }

    for err in &result.errors {
        eprintln!("warning: {err}");
    }
    print_summary(&config.name, &result);

    if let Some(dir) = export_dir {
        let format = args.format.map(ExportFormat::from).unwrap_or(config.output.format);
        for path in write_exports(&result, &dir, format, &selector, args.sector.as_deref())? {
            eprintln!("wrote {}", path.display());
        }
    }

    Ok(())
}

fn print_summary(name: &str, result: &ReconResult) {
    let audit = &result.audit;
    let (multi, mono, none) = result.sector_summaries.iter().fold((0, 0, 0), |acc, s| {
        (acc.0 + s.multimarca, acc.1 + s.monomarca, acc.2 + s.sem_marca)
    });
    let pct = |n: usize| export::format_percent(n as f64 / audit.total_ativos as f64 * 100.0);

    eprintln!(
        "{name}: {} active accounts in cycle {} across {} sector(s)",
        audit.total_ativos,
        audit.ciclo_selecionado,
        result.sector_summaries.len(),
    );
    eprintln!(
        "  multimarca {multi} ({}), mono-marca {mono} ({}), sem marca {none} ({})",
        pct(multi),
        pct(mono),
        pct(none),
    );
    eprintln!(
        "  matched by code {}, by name {}",
        audit.matched_by_codigo, audit.matched_by_nome,
    );
    let per_brand: Vec<String> = audit
        .total_por_marca
        .iter()
        .map(|(brand, n)| format!("{brand} {n}"))
        .collect();
    eprintln!("  buyers per brand: {}", per_brand.join(", "));
    if audit.descartados_sem_identidade > 0 {
        eprintln!(
            "  {} master row(s) skipped: no code and no name",
            audit.descartados_sem_identidade
        );
    }
}

/// Cycle label made safe for a file name.
fn file_tag(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Sector name as a file stem: whitespace runs and path separators become `_`.
fn sector_stem(setor: &str) -> String {
    setor
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace(['/', '\\'], "_")
}

/// Write the sector summary, account details and no-brand tables to `dir`,
/// plus one sector's details when `sector` is given.
fn write_exports(
    result: &ReconResult,
    dir: &Path,
    format: ExportFormat,
    selector: &CycleSelector,
    sector: Option<&str>,
) -> Result<Vec<PathBuf>, CliError> {
    let sector_table = match sector {
        Some(name) => {
            let accounts = export::sector_accounts(&result.resellers, name);
            let Some(first) = accounts.first() else {
                let known: Vec<&str> = result.sector_summaries.iter().map(|s| s.setor.as_str()).collect();
                return Err(CliError::args(format!("no active accounts in sector '{name}'"))
                    .with_hint(format!("sectors in this run: {}", known.join(", "))));
            };
            let stem = format!("detalhes_{}", sector_stem(&first.setor));
            Some((stem, export::account_details_table(&accounts)))
        }
        None => None,
    };

    std::fs::create_dir_all(dir)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot create {}: {e}", dir.display())))?;

    let mut tables = vec![
        ("Resumo por Setor", "resumo_por_setor".to_string(), export::sector_summary_table(&result.sector_summaries)),
        ("Revendedoras", "revendedoras".to_string(), export::account_details_table(&result.resellers)),
        (
            "Sem Marca",
            format!("sem_marca_ciclo_{}", file_tag(selector.label())),
            export::sem_marca_table(&result.audit.sem_marca_list),
        ),
    ];
    if let Some((stem, table)) = sector_table {
        tables.push(("Detalhes do Setor", stem, table));
    }

    let mut written = Vec::with_capacity(tables.len());
    for (sheet, stem, table) in &tables {
        let path = dir.join(format!("{stem}.{}", format.extension()));
        let outcome = match format {
            ExportFormat::Csv => multimarca_io::csv::export_table(table, &path),
            ExportFormat::Xlsx => multimarca_io::xlsx::export_tables(&[(*sheet, table)], &path),
        };
        outcome.map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write {}: {e}", path.display())))?;
        written.push(path);
    }
    Ok(written)
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let input = load_input(&config, base_dir(&config_path))?;

    eprintln!(
        "valid: '{}': {} ({} rows) + {} brand(s), cycle {}",
        config.name,
        config.master.file,
        input.master_rows.len(),
        input.brands.len(),
        config.selector(),
    );
    for brand in Brand::ALL {
        if let Some(dataset) = input.brands.get(&brand) {
            let status = match dataset.mapping.validate(DatasetKind::Brand, brand.label()) {
                Ok(()) => "mapped".to_string(),
                Err(e) => format!("will be skipped: {e}"),
            };
            eprintln!("  {brand}: {} rows, {status}", dataset.rows.len());
        }
    }
    Ok(())
}

// ============================================================================
// cycles
// ============================================================================

pub fn cmd_cycles(file: PathBuf, column: Option<String>, json: bool) -> Result<(), CliError> {
    let table = load(&file)?;

    let cycle_column = match column {
        Some(col) if col.trim().is_empty() => {
            return Err(CliError::args("--column must name a header"));
        }
        Some(col) => {
            if !table.columns.contains(&col) {
                return Err(CliError::mapping(format!("column '{col}' not found in {}", file.display()))
                    .with_hint(format!("available columns: {}", table.columns.join(", "))));
            }
            col
        }
        None => auto_map_columns(&table.columns, DatasetKind::Master)
            .partial
            .ciclo_faturamento
            .ok_or_else(|| {
                CliError::mapping(format!("no cycle column recognized in {}", file.display()))
                    .with_hint("pass --column with the billing cycle header")
            })?,
    };
    log::debug!("{}: reading cycles from '{cycle_column}'", file.display());

    let mapping = ColumnMapping {
        ciclo_faturamento: Some(cycle_column),
        ..Default::default()
    };
    let cycles = extract_cycles(&table.rows, &mapping);

    if json {
        let out = serde_json::to_string(&cycles)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{out}");
    } else if cycles.is_empty() {
        eprintln!("no cycles found in {}", file.display());
    } else {
        for cycle in &cycles {
            println!("{cycle}");
        }
    }
    Ok(())
}

// ============================================================================
// map
// ============================================================================

pub fn cmd_map(file: PathBuf, master: bool) -> Result<(), CliError> {
    let table = load(&file)?;
    let kind = if master { DatasetKind::Master } else { DatasetKind::Brand };
    let auto = auto_map_columns(&table.columns, kind);

    let body = toml::to_string(&auto.partial)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("TOML serialization error: {e}")))?;

    println!("# columns proposed for {}", file.display());
    if master {
        println!("[master.columns]");
    }
    print!("{body}");

    if !auto.unmapped.is_empty() {
        let fields: Vec<&str> = auto.unmapped.iter().map(|f| f.as_str()).collect();
        return Err(CliError::mapping(format!(
            "required field(s) not recognized: {}",
            fields.join(", ")
        ))
        .with_hint(format!("available columns: {}", table.columns.join(", "))));
    }
    Ok(())
}
