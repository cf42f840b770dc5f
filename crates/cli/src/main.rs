// multimarca CLI - multi-brand reseller reconciliation

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use exit_codes::{EXIT_FILE_READ, EXIT_INVALID_CONFIG, EXIT_MISSING_MAPPING, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "multimarca")]
#[command(about = "Classify active resellers as multi-brand, single-brand or no-brand")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log per-stage counts to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the master roster against the brand ledgers in a TOML config
    #[command(after_help = "\
Examples:
  multimarca run ciclo.toml
  multimarca run ciclo.toml --cycle 202402
  multimarca run ciclo.toml --cycle ALL --json
  multimarca run ciclo.toml --export-dir saida --format xlsx
  multimarca run ciclo.toml --export-dir saida --sector Norte")]
    Run {
        /// Path to the run config (.toml)
        config: PathBuf,

        /// Cycle label or ALL (overrides `cycle` in the config)
        #[arg(long)]
        cycle: Option<String>,

        /// Print the JSON result to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON result to a file (overrides `output.json`)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write the summary, detail and no-brand tables here (overrides `output.dir`)
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Table format for --export-dir (overrides `output.format`)
        #[arg(long)]
        format: Option<TableFormat>,

        /// Also export the accounts of this sector, sorted by name
        #[arg(long, value_name = "SETOR")]
        sector: Option<String>,
    },

    /// Check a config: parse it, read every header row, resolve every mapping
    #[command(after_help = "\
Examples:
  multimarca validate ciclo.toml")]
    Validate {
        /// Path to the run config (.toml)
        config: PathBuf,
    },

    /// List the billing cycles present in a master file, newest first
    #[command(after_help = "\
Examples:
  multimarca cycles geral.xlsx
  multimarca cycles geral.csv --column CicloFaturamento --json")]
    Cycles {
        /// Master file (.csv, .tsv, .xlsx, .xls, .ods)
        file: PathBuf,

        /// Cycle column header (auto-detected when omitted)
        #[arg(long)]
        column: Option<String>,

        /// Print a JSON array instead of one cycle per line
        #[arg(long)]
        json: bool,
    },

    /// Propose a column mapping from a file's headers, printed as TOML
    #[command(after_help = "\
Examples:
  multimarca map boticario.csv
  multimarca map geral.xlsx --master >> ciclo.toml")]
    Map {
        /// Data file whose header row is mapped
        file: PathBuf,

        /// Map as the master roster (sector, billing cycle) instead of a brand ledger
        #[arg(long)]
        master: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  multimarca-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, cycle, json, output, export_dir, format, sector } => {
            recon::cmd_run(recon::RunArgs { config, cycle, json, output, export_dir, format, sector })
        }
        Commands::Validate { config } => recon::cmd_validate(config),
        Commands::Cycles { file, column, json } => recon::cmd_cycles(file, column, json),
        Commands::Map { file, master } => recon::cmd_map(file, master),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_CONFIG, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_FILE_READ, msg)
    }

    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::new(EXIT_MISSING_MAPPING, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
