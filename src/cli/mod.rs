//! Command-line parsing for the company financials explorer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the catalog/fetch/table code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::catalog::build::BASE_URL;
use crate::config::{DEFAULT_CATALOG_PATH, DEFAULT_VERIFIED_CATALOG_PATH};
use crate::resolve::DEFAULT_SUGGEST_LIMIT;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "lv", version, about = "Company financials explorer (Balance Sheet / Profit & Loss)")]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug). `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the company catalog from the exchange master list.
    BuildCatalog(BuildCatalogArgs),
    /// Probe every catalog URL and keep the companies whose pages answer.
    VerifyCatalog(VerifyCatalogArgs),
    /// Show which catalog company a query resolves to.
    Resolve(ResolveArgs),
    /// Fetch and print both statements plus the trend charts.
    Show(ShowArgs),
    /// Fetch both statements and write them to an Excel workbook.
    Export(ExportArgs),
    /// Launch the interactive TUI (default).
    Tui(TuiArgs),
}

/// Options shared by the probing commands.
#[derive(Debug, Args, Clone)]
pub struct ProbeArgs {
    /// Concurrent probes (default: `LV_PROBE_WORKERS` or 15).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-request probe timeout in seconds (default: `LV_PROBE_TIMEOUT_SECS` or 5).
    #[arg(long, value_name = "SECS")]
    pub probe_timeout: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct BuildCatalogArgs {
    /// Exchange master list CSV (`NAME OF COMPANY`, `SYMBOL` columns).
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Catalog CSV to write.
    #[arg(short, long, default_value = DEFAULT_CATALOG_PATH)]
    pub output: PathBuf,

    /// Also probe every URL and write a verified catalog.
    #[arg(long)]
    pub verify: bool,

    /// Verified catalog CSV (with `--verify`).
    #[arg(long, default_value = DEFAULT_VERIFIED_CATALOG_PATH)]
    pub verified_output: PathBuf,

    /// Site prefix for the statement URLs.
    #[arg(long, default_value = BASE_URL)]
    pub base_url: String,

    #[command(flatten)]
    pub probe: ProbeArgs,
}

#[derive(Debug, Args, Clone)]
pub struct VerifyCatalogArgs {
    /// Catalog CSV to verify (default: `LV_CATALOG`).
    #[arg(short, long, value_name = "CSV")]
    pub catalog: Option<PathBuf>,

    /// Verified catalog CSV to write.
    #[arg(short, long, default_value = DEFAULT_VERIFIED_CATALOG_PATH)]
    pub output: PathBuf,

    #[command(flatten)]
    pub probe: ProbeArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ResolveArgs {
    /// Company name as typed (typos are fine).
    pub query: String,

    /// Catalog CSV (default: `LV_CATALOG`).
    #[arg(short, long, value_name = "CSV")]
    pub catalog: Option<PathBuf>,

    /// Maximum number of suggestions.
    #[arg(long, default_value_t = DEFAULT_SUGGEST_LIMIT)]
    pub limit: usize,
}

/// Where the statement pages come from: a catalog lookup or explicit URLs.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Company name to look up in the catalog.
    pub query: Option<String>,

    /// Catalog CSV (default: `LV_CATALOG`).
    #[arg(short, long, value_name = "CSV")]
    pub catalog: Option<PathBuf>,

    /// Balance sheet page URL (skips the catalog; needs `--pl-url`).
    #[arg(long, value_name = "URL", requires = "pl_url")]
    pub bs_url: Option<String>,

    /// Profit & loss page URL (skips the catalog; needs `--bs-url`).
    #[arg(long, value_name = "URL", requires = "bs_url")]
    pub pl_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Workbook path (default: `<Company>_Financials.xlsx`).
    #[arg(long, value_name = "XLSX")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    /// Catalog CSV (default: `LV_CATALOG`, else pick one interactively).
    #[arg(short, long, value_name = "CSV")]
    pub catalog: Option<PathBuf>,

    /// Pre-fill the search box.
    #[arg(short, long)]
    pub query: Option<String>,
}
