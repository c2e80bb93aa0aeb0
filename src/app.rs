//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and settings
//! - installs the log subscriber
//! - builds/verifies catalogs
//! - resolves, fetches and prints statements
//! - writes workbook exports

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::pipeline::Selection;
use crate::catalog::verify::{HttpProbe, verify_entries};
use crate::catalog::{Catalog, build, store};
use crate::cli::{
    BuildCatalogArgs, Command, ExportArgs, ProbeArgs, ResolveArgs, ShowArgs, SourceArgs, TuiArgs,
    VerifyCatalogArgs, picker,
};
use crate::config::Settings;
use crate::data::StatementClient;
use crate::domain::{StatementKind, StatementRefs, Statements};
use crate::error::AppError;
use crate::plot::{ChartStyle, render_trend_chart};

pub mod pipeline;

/// Entry point for the `lv` binary.
pub fn run() -> Result<(), AppError> {
    // We want `lv` and `lv -q axis` to behave like `lv tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_tracing(cli.verbose, matches!(cli.command, Command::Tui(_)));
    let settings = Settings::from_env()?;

    match cli.command {
        Command::BuildCatalog(args) => handle_build_catalog(args, &settings),
        Command::VerifyCatalog(args) => handle_verify_catalog(args, &settings),
        Command::Resolve(args) => handle_resolve(args, &settings),
        Command::Show(args) => handle_show(args, &settings),
        Command::Export(args) => handle_export(args, &settings),
        Command::Tui(args) => handle_tui(args, &settings),
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `-v` picks the level.
///
/// The TUI stays silent by default so log lines don't land on the alternate screen.
fn init_tracing(verbose: u8, tui: bool) {
    let default = match (tui, verbose) {
        (true, _) => "off",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests, embedding) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_build_catalog(args: BuildCatalogArgs, settings: &Settings) -> Result<(), AppError> {
    let master = store::read_master_list(&args.input)?;
    let entries = build::build(&master.rows, &args.base_url);
    if entries.is_empty() {
        return Err(AppError::no_data(format!("No usable rows in master list '{}'.", args.input.display())));
    }
    store::write_catalog(&args.output, &entries, false)?;

    let kept = if args.verify {
        let verified = verify(entries.clone(), &args.probe, settings)?;
        store::write_catalog(&args.verified_output, &verified, true)?;
        Some(verified.len())
    } else {
        None
    };

    print!(
        "{}",
        crate::report::format_build_summary(
            master.rows_read,
            master.row_errors.len(),
            entries.len(),
            kept,
            &args.output.display().to_string(),
        )
    );
    if kept.is_some() {
        println!("Verified catalog saved to '{}'.", args.verified_output.display());
    }
    Ok(())
}

fn handle_verify_catalog(args: VerifyCatalogArgs, settings: &Settings) -> Result<(), AppError> {
    let path = catalog_path(args.catalog.as_deref(), settings)?;
    let loaded = store::read_catalog(&path)?;
    let total = loaded.rows.len();
    let verified = verify(loaded.rows, &args.probe, settings)?;
    store::write_catalog(&args.output, &verified, true)?;

    print!(
        "{}",
        crate::report::format_build_summary(
            loaded.rows_read,
            loaded.row_errors.len(),
            total,
            Some(verified.len()),
            &args.output.display().to_string(),
        )
    );
    Ok(())
}

fn verify(
    entries: Vec<crate::domain::CatalogEntry>,
    probe_args: &ProbeArgs,
    settings: &Settings,
) -> Result<Vec<crate::domain::CatalogEntry>, AppError> {
    let workers = probe_args.workers.unwrap_or(settings.probe_workers);
    let timeout = probe_args
        .probe_timeout
        .map(Duration::from_secs)
        .unwrap_or(settings.probe_timeout);
    let probe = HttpProbe::new(timeout, &settings.user_agent)?;
    verify_entries(entries, workers, &probe)
}

fn handle_resolve(args: ResolveArgs, settings: &Settings) -> Result<(), AppError> {
    let catalog = Catalog::load(&catalog_path(args.catalog.as_deref(), settings)?)?;

    let best = crate::resolve::resolve(&args.query, catalog.names());
    println!("{}", crate::report::format_match(&args.query, &best));
    let suggestions = crate::resolve::suggest(&args.query, catalog.names(), args.limit);
    print!("{}", crate::report::format_suggestions(&suggestions));

    if best.confidence < crate::resolve::ACCEPT_THRESHOLD {
        return Err(AppError::no_data(format!("No company matched '{}'.", args.query)));
    }
    Ok(())
}

fn handle_show(args: ShowArgs, settings: &Settings) -> Result<(), AppError> {
    let statements = acquire_statements(&args.source, settings)?;

    println!("{}", crate::report::format_statements_summary(&statements));
    for kind in StatementKind::ALL {
        println!(
            "{}",
            crate::report::format_statement_table(kind.display_name(), statements.table(kind))
        );
    }

    if !args.no_plot {
        for (kind, style) in [
            (StatementKind::BalanceSheet, ChartStyle::Bars),
            (StatementKind::ProfitLoss, ChartStyle::Line),
        ] {
            let chart = render_trend_chart(
                kind.trend_keyword(),
                statements.trend(kind),
                style,
                args.width,
                args.height,
            );
            println!("{chart}");
        }
    } else {
        for kind in StatementKind::ALL {
            println!(
                "{}",
                crate::report::format_trend(kind.trend_keyword(), statements.trend(kind))
            );
        }
    }

    Ok(())
}

fn handle_export(args: ExportArgs, settings: &Settings) -> Result<(), AppError> {
    let statements = acquire_statements(&args.source, settings)?;
    let path = args
        .out
        .unwrap_or_else(|| PathBuf::from(statements.export_file_name()));
    crate::io::write_financials_xlsx(&path, &statements)?;
    println!("Exported {} to '{}'.", statements.display_name(), path.display());
    Ok(())
}

fn handle_tui(args: TuiArgs, settings: &Settings) -> Result<(), AppError> {
    let catalog = Catalog::load(&catalog_path(args.catalog.as_deref(), settings)?)?;
    let client = StatementClient::new(settings.fetch_timeout, &settings.user_agent)?;
    crate::tui::run(catalog, client, args.query)
}

/// Resolve the source arguments to statement URLs and fetch both tables.
fn acquire_statements(source: &SourceArgs, settings: &Settings) -> Result<Statements, AppError> {
    let (company, refs) = match (&source.bs_url, &source.pl_url) {
        (Some(bs), Some(pl)) => (
            None,
            StatementRefs {
                balance_sheet: bs.clone(),
                profit_loss: pl.clone(),
            },
        ),
        _ => {
            let Some(query) = source.query.as_deref() else {
                return Err(AppError::input("Provide a company name, or both --bs-url and --pl-url."));
            };
            let catalog = Catalog::load(&catalog_path(source.catalog.as_deref(), settings)?)?;
            match pipeline::select_company(&catalog, query) {
                Selection::Matched { company, refs, .. } => (Some(company), refs),
                Selection::Unmatched { best, suggestions } => {
                    eprintln!("{}", crate::report::format_match(query, &best));
                    eprint!("{}", crate::report::format_suggestions(&suggestions));
                    if !std::io::stdin().is_terminal() {
                        return Err(AppError::no_data(format!("No company matched '{query}'.")));
                    }
                    println!("Enter the statement URLs manually.");
                    (None, picker::prompt_for_manual_refs()?)
                }
            }
        }
    };

    let mut client = StatementClient::new(settings.fetch_timeout, &settings.user_agent)?;
    let statements = pipeline::fetch_statements(&mut client, company.as_deref(), &refs)?;
    info!(company = statements.display_name(), "fetched statements");
    Ok(statements)
}

/// Catalog CSV: flag, else `LV_CATALOG`/default if it exists, else ask.
fn catalog_path(flag: Option<&Path>, settings: &Settings) -> Result<PathBuf, AppError> {
    if let Some(path) = flag {
        return picker::validate_csv_path(path);
    }
    if settings.catalog_path.is_file() {
        return Ok(settings.catalog_path.clone());
    }
    if std::io::stdin().is_terminal() {
        println!("Catalog '{}' not found.", settings.catalog_path.display());
        return picker::prompt_for_catalog_path();
    }
    Err(AppError::input(format!(
        "Catalog '{}' not found. Pass --catalog or set LV_CATALOG.",
        settings.catalog_path.display()
    )))
}

/// Rewrite argv so `lv` defaults to `lv tui`.
///
/// Rules:
/// - `lv`                      -> `lv tui`
/// - `lv -q axis ...`          -> `lv tui -q axis ...`
/// - `lv --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "build-catalog" | "verify-catalog" | "resolve" | "show" | "export" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // `-v` is global; keep it in front and look at what follows.
    if (arg1.starts_with("-v") && arg1[1..].chars().all(|c| c == 'v')) || arg1 == "--verbose" {
        let rest = rewrite_args(argv.split_off(1));
        argv.extend(rest);
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_tui() {
        assert_eq!(rewrite_args(args(&["lv"])), args(&["lv", "tui"]));
        assert_eq!(rewrite_args(args(&["lv", "-q", "axis"])), args(&["lv", "tui", "-q", "axis"]));
    }

    #[test]
    fn subcommands_and_help_untouched() {
        assert_eq!(rewrite_args(args(&["lv", "show", "tcs"])), args(&["lv", "show", "tcs"]));
        assert_eq!(rewrite_args(args(&["lv", "--help"])), args(&["lv", "--help"]));
    }

    #[test]
    fn verbose_flag_is_skipped_over() {
        assert_eq!(rewrite_args(args(&["lv", "-vv"])), args(&["lv", "-vv", "tui"]));
        assert_eq!(
            rewrite_args(args(&["lv", "-v", "resolve", "tcs"])),
            args(&["lv", "-v", "resolve", "tcs"])
        );
    }
}
