//! CSV ingest and persistence for the master list and the catalog.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - header names matched case-insensitively, BOM-tolerant

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{CatalogEntry, MasterRow};
use crate::error::AppError;

const COL_MASTER_NAME: &str = "name of company";
const COL_MASTER_SYMBOL: &str = "symbol";

const COL_COMPANY: &str = "company";
const COL_SYMBOL: &str = "symbol";
const COL_BS_URL: &str = "balancesheeturl";
const COL_PL_URL: &str = "profitlossurl";
const COL_BS_VALID: &str = "bs_valid";
const COL_PL_VALID: &str = "pl_valid";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed rows plus the rows that had to be skipped.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub rows: Vec<T>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Read the exchange master list (`NAME OF COMPANY`, `SYMBOL`).
pub fn read_master_list(path: &Path) -> Result<Loaded<MasterRow>, AppError> {
    let file = open(path)?;
    let loaded = parse_master_list(file)?;
    info!(path = %path.display(), rows = loaded.rows.len(), skipped = loaded.row_errors.len(), "read master list");
    Ok(loaded)
}

pub fn parse_master_list<R: Read>(input: R) -> Result<Loaded<MasterRow>, AppError> {
    let mut reader = reader(input);
    let header_map = build_header_map(&read_headers(&mut reader)?);
    require_columns(&header_map, &[COL_MASTER_NAME, COL_MASTER_SYMBOL])?;

    collect_rows(&mut reader, |record| {
        Ok(MasterRow {
            name: get_required(record, &header_map, COL_MASTER_NAME)?.to_string(),
            symbol: get_required(record, &header_map, COL_MASTER_SYMBOL)?.to_string(),
        })
    })
}

/// Read a persisted catalog (`Company, Symbol, BalanceSheetURL, ProfitLossURL[, BS_Valid, PL_Valid]`).
///
/// Rows missing either URL are skipped.
pub fn read_catalog(path: &Path) -> Result<Loaded<CatalogEntry>, AppError> {
    let file = open(path)?;
    let loaded = parse_catalog(file)?;
    info!(path = %path.display(), rows = loaded.rows.len(), skipped = loaded.row_errors.len(), "read catalog");
    Ok(loaded)
}

pub fn parse_catalog<R: Read>(input: R) -> Result<Loaded<CatalogEntry>, AppError> {
    let mut reader = reader(input);
    let header_map = build_header_map(&read_headers(&mut reader)?);
    require_columns(&header_map, &[COL_COMPANY, COL_BS_URL, COL_PL_URL])?;

    collect_rows(&mut reader, |record| {
        Ok(CatalogEntry {
            company: get_required(record, &header_map, COL_COMPANY)?.to_string(),
            symbol: get_optional(record, &header_map, COL_SYMBOL)
                .unwrap_or_default()
                .to_string(),
            balance_sheet_url: get_required(record, &header_map, COL_BS_URL)?.to_string(),
            profit_loss_url: get_required(record, &header_map, COL_PL_URL)?.to_string(),
            bs_valid: get_optional(record, &header_map, COL_BS_VALID).and_then(parse_bool),
            pl_valid: get_optional(record, &header_map, COL_PL_VALID).and_then(parse_bool),
        })
    })
}

/// Write a catalog CSV.
///
/// The validity columns are written only when `with_validity` is set
/// (verified catalogs).
pub fn write_catalog(path: &Path, entries: &[CatalogEntry], with_validity: bool) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create catalog CSV '{}': {e}", path.display())))?;
    write_catalog_to(file, entries, with_validity)?;
    info!(path = %path.display(), entries = entries.len(), "wrote catalog");
    Ok(())
}

pub fn write_catalog_to<W: Write>(out: W, entries: &[CatalogEntry], with_validity: bool) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["Company", "Symbol", "BalanceSheetURL", "ProfitLossURL"];
    if with_validity {
        header.extend(["BS_Valid", "PL_Valid"]);
    }
    writer
        .write_record(&header)
        .map_err(|e| AppError::input(format!("Failed to write catalog header: {e}")))?;

    for e in entries {
        let mut record = vec![
            e.company.clone(),
            e.symbol.clone(),
            e.balance_sheet_url.clone(),
            e.profit_loss_url.clone(),
        ];
        if with_validity {
            record.push(fmt_bool(e.bs_valid));
            record.push(fmt_bool(e.pl_valid));
        }
        writer
            .write_record(&record)
            .map_err(|e| AppError::input(format!("Failed to write catalog row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush catalog CSV: {e}")))
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn read_headers<R: Read>(reader: &mut csv::Reader<R>) -> Result<StringRecord, AppError> {
    reader
        .headers()
        .cloned()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))
}

fn collect_rows<R: Read, T>(
    reader: &mut csv::Reader<R>,
    mut parse: impl FnMut(&StringRecord) -> Result<T, String>,
) -> Result<Loaded<T>, AppError> {
    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header line, then 1-based line numbers.
        let line = idx + 2;
        rows_read += 1;

        let outcome = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse(&record));
        match outcome {
            Ok(row) => rows.push(row),
            Err(message) => {
                warn!(line, message = message.as_str(), "skipping CSV row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    Ok(Loaded {
        rows,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn require_columns(header_map: &HashMap<String, usize>, names: &[&str]) -> Result<(), AppError> {
    for name in names {
        if !header_map.contains_key(*name) {
            return Err(AppError::input(format!("Missing required column: `{name}`")));
        }
    }
    Ok(())
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn fmt_bool(v: Option<bool>) -> String {
    match v {
        Some(true) => "True".to_string(),
        Some(false) => "False".to_string(),
        None => String::new(),
    }
}
