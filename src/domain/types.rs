//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - built from the exchange master list and persisted as a catalog CSV
//! - fed through the resolver/normalizer as plain values
//! - rendered by the CLI, the TUI and the spreadsheet export

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Number of leading columns kept from a fetched statement table.
///
/// Column 0 is the row label, columns 1..=5 are the most recent reporting periods.
pub const KEEP_COLUMNS: usize = 6;

/// Row label searched for in the balance sheet trend.
pub const TOTAL_ASSETS_KEYWORD: &str = "Total Assets";

/// Row label searched for in the profit & loss trend.
pub const NET_PROFIT_KEYWORD: &str = "Net Profit";

/// A single table cell. `None` stands for an empty/missing cell.
pub type Cell = Option<String>;

/// The two financial statements the explorer works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    BalanceSheet,
    ProfitLoss,
}

impl StatementKind {
    pub const ALL: [StatementKind; 2] = [StatementKind::BalanceSheet, StatementKind::ProfitLoss];

    pub fn display_name(self) -> &'static str {
        match self {
            StatementKind::BalanceSheet => "Balance Sheet",
            StatementKind::ProfitLoss => "Profit & Loss",
        }
    }

    /// Worksheet name used in the exported workbook.
    pub fn sheet_name(self) -> &'static str {
        self.display_name()
    }

    /// Path segment of the statement page on the source site.
    pub fn url_segment(self) -> &'static str {
        match self {
            StatementKind::BalanceSheet => "balance-sheetVI",
            StatementKind::ProfitLoss => "profit-lossVI",
        }
    }

    /// Row label charted for this statement.
    pub fn trend_keyword(self) -> &'static str {
        match self {
            StatementKind::BalanceSheet => TOTAL_ASSETS_KEYWORD,
            StatementKind::ProfitLoss => NET_PROFIT_KEYWORD,
        }
    }

    pub fn other(self) -> Self {
        match self {
            StatementKind::BalanceSheet => StatementKind::ProfitLoss,
            StatementKind::ProfitLoss => StatementKind::BalanceSheet,
        }
    }
}

/// One row of the exchange master list (`NAME OF COMPANY`, `SYMBOL`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterRow {
    pub name: String,
    pub symbol: String,
}

impl MasterRow {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// Source locations of a company's two statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRefs {
    pub balance_sheet: String,
    pub profit_loss: String,
}

impl StatementRefs {
    pub fn get(&self, kind: StatementKind) -> &str {
        match kind {
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::ProfitLoss => &self.profit_loss,
        }
    }
}

/// A persisted catalog row.
///
/// `bs_valid` / `pl_valid` are only present for catalogs produced by the
/// verification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub company: String,
    pub symbol: String,
    pub balance_sheet_url: String,
    pub profit_loss_url: String,
    pub bs_valid: Option<bool>,
    pub pl_valid: Option<bool>,
}

impl CatalogEntry {
    pub fn refs(&self) -> StatementRefs {
        StatementRefs {
            balance_sheet: self.balance_sheet_url.clone(),
            profit_loss: self.profit_loss_url.clone(),
        }
    }

    /// True when at least one statement page answered the probe.
    pub fn is_reachable(&self) -> bool {
        self.bs_valid == Some(true) || self.pl_valid == Some(true)
    }
}

/// Outcome of resolving a free-text query against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchResult {
    pub candidate: Option<String>,
    /// Similarity score in `0..=100`.
    pub confidence: u8,
}

impl MatchResult {
    pub fn none() -> Self {
        Self::default()
    }
}

/// A ranked suggestion for the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub name: String,
    pub score: u8,
}

/// A statement table as scraped: header row plus rows of optional cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Convenience constructor for fixtures: empty strings become `None`.
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        let headers = headers.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reporting periods (every header after the label column).
    pub fn periods(&self) -> &[String] {
        self.headers.get(1..).unwrap_or(&[])
    }
}

/// One `(label, period, value)` tuple of a melted table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongRow {
    pub label: Cell,
    pub period: String,
    pub value: Cell,
}

/// One point of a trend series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub period: String,
    pub value: Cell,
}

impl TrendPoint {
    pub fn new(period: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            value: Some(value.into()),
        }
    }

    /// Numeric view of the cell for charting.
    ///
    /// Accepts thousands separators (`1,234.5`) and accounting negatives (`(12.0)`).
    pub fn numeric(&self) -> Option<f64> {
        parse_number(self.value.as_deref()?)
    }
}

/// Parse a statement cell into a number, if it holds one.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed == "--" {
        return None;
    }
    let (negative, body) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };
    let cleaned: String = body.chars().filter(|c| *c != ',').collect();
    let v = cleaned.parse::<f64>().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(if negative { -v } else { v })
}

/// Both statements of a company after normalization, plus the derived trends.
#[derive(Debug, Clone)]
pub struct Statements {
    /// `None` when the statement URLs were typed in by hand.
    pub company: Option<String>,
    pub balance_sheet: RawTable,
    pub profit_loss: RawTable,
    pub total_assets: Vec<TrendPoint>,
    pub net_profit: Vec<TrendPoint>,
    pub fetched_at: DateTime<Local>,
}

impl Statements {
    pub fn table(&self, kind: StatementKind) -> &RawTable {
        match kind {
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::ProfitLoss => &self.profit_loss,
        }
    }

    pub fn trend(&self, kind: StatementKind) -> &[TrendPoint] {
        match kind {
            StatementKind::BalanceSheet => &self.total_assets,
            StatementKind::ProfitLoss => &self.net_profit,
        }
    }

    pub fn display_name(&self) -> &str {
        self.company.as_deref().unwrap_or("Custom Company")
    }

    /// Default file name of the exported workbook.
    pub fn export_file_name(&self) -> String {
        let base = self.company.as_deref().unwrap_or("Custom_Company");
        format!("{}_Financials.xlsx", base.replace(' ', "_"))
    }
}
