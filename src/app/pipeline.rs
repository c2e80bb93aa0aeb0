//! Shared statement workflow used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve -> fetch both pages -> normalize -> extract trends
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::Local;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::data::StatementClient;
use crate::domain::{
    KEEP_COLUMNS, MatchResult, RawTable, StatementKind, StatementRefs, Statements, Suggestion,
};
use crate::error::AppError;
use crate::resolve::{self, DEFAULT_SUGGEST_LIMIT};
use crate::table::{normalize, trend_series};

/// Shown whenever either statement page yields no table.
pub const NO_TABLES_MESSAGE: &str =
    "No financial tables found. The page might have changed or the company data is unavailable.";

/// Outcome of looking a query up in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Matched {
        company: String,
        confidence: u8,
        refs: StatementRefs,
    },
    /// Nothing cleared the accept threshold; `best` is the closest name seen.
    Unmatched {
        best: MatchResult,
        suggestions: Vec<Suggestion>,
    },
}

/// Resolve `query` against the catalog.
pub fn select_company(catalog: &Catalog, query: &str) -> Selection {
    if let Some(m) = resolve::accept(query, catalog.names()) {
        let refs = m.candidate.as_deref().and_then(|name| catalog.get(name));
        if let (Some(company), Some(refs)) = (m.candidate.clone(), refs) {
            info!(query, company = company.as_str(), confidence = m.confidence, "resolved company");
            return Selection::Matched {
                company,
                confidence: m.confidence,
                refs: refs.clone(),
            };
        }
    }

    let best = resolve::resolve(query, catalog.names());
    let suggestions = resolve::suggest(query, catalog.names(), DEFAULT_SUGGEST_LIMIT);
    debug!(query, confidence = best.confidence, suggestions = suggestions.len(), "no confident match");
    Selection::Unmatched { best, suggestions }
}

/// Normalize both raw tables and derive their trend series.
pub fn build_statements(company: Option<String>, balance_sheet: &RawTable, profit_loss: &RawTable) -> Statements {
    let balance_sheet = normalize(balance_sheet, KEEP_COLUMNS);
    let profit_loss = normalize(profit_loss, KEEP_COLUMNS);
    let total_assets = trend_series(Some(&balance_sheet), StatementKind::BalanceSheet.trend_keyword());
    let net_profit = trend_series(Some(&profit_loss), StatementKind::ProfitLoss.trend_keyword());

    Statements {
        company,
        balance_sheet,
        profit_loss,
        total_assets,
        net_profit,
        fetched_at: Local::now(),
    }
}

/// Fetch both statement pages for `refs` and build [`Statements`].
pub fn fetch_statements(
    client: &mut StatementClient,
    company: Option<&str>,
    refs: &StatementRefs,
) -> Result<Statements, AppError> {
    let statements = statements_from(|url| client.fetch_table(url), company, refs);
    let cache = client.cache();
    debug!(hits = cache.hits(), misses = cache.misses(), cached = cache.len(), "fetch cache");
    statements
}

/// Like [`fetch_statements`], with the page source supplied by the caller.
pub fn statements_from(
    mut fetch: impl FnMut(&str) -> Option<RawTable>,
    company: Option<&str>,
    refs: &StatementRefs,
) -> Result<Statements, AppError> {
    let balance_sheet = fetch(refs.get(StatementKind::BalanceSheet));
    let profit_loss = fetch(refs.get(StatementKind::ProfitLoss));

    match (balance_sheet, profit_loss) {
        (Some(bs), Some(pl)) => Ok(build_statements(company.map(str::to_string), &bs, &pl)),
        _ => Err(AppError::runtime(NO_TABLES_MESSAGE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CatalogEntry;

    fn catalog() -> Catalog {
        Catalog::from_entries([CatalogEntry {
            company: "Axis Bank".to_string(),
            symbol: "AXISBANK".to_string(),
            balance_sheet_url: "bs://axis".to_string(),
            profit_loss_url: "pl://axis".to_string(),
            bs_valid: None,
            pl_valid: None,
        }])
    }

    fn refs() -> StatementRefs {
        StatementRefs {
            balance_sheet: "bs://axis".to_string(),
            profit_loss: "pl://axis".to_string(),
        }
    }

    fn page(url: &str) -> Option<RawTable> {
        match url {
            "bs://axis" => Some(RawTable::from_strs(
                &["Particulars", "2021", "2022", "2023", "2019", "2018", "2017", "2016"],
                &[&["Total Assets", "100", "120", "140", "1", "1", "1", "1"]],
            )),
            "pl://axis" => Some(RawTable::from_strs(
                &["Particulars", "2021", "2022"],
                &[&["Revenue", "10", "11"], &["Net Profit", "3", "(2)"]],
            )),
            _ => None,
        }
    }

    #[test]
    fn typo_resolves_to_catalog_entry() {
        match select_company(&catalog(), "axsi bank") {
            Selection::Matched { company, confidence, refs: r } => {
                assert_eq!(company, "Axis Bank");
                assert!(confidence >= 70);
                assert_eq!(r, refs());
            }
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn unrelated_query_is_unmatched() {
        match select_company(&catalog(), "qwerty") {
            Selection::Unmatched { best, suggestions } => {
                assert!(best.confidence < 70);
                assert!(suggestions.is_empty());
            }
            other => panic!("expected no match, got {other:?}"),
        }
    }

    #[test]
    fn statements_are_normalized_with_trends() {
        let s = statements_from(page, Some("Axis Bank"), &refs()).unwrap();
        assert_eq!(s.balance_sheet.width(), KEEP_COLUMNS);
        assert_eq!(s.total_assets.len(), 5);
        assert_eq!(s.total_assets[0], crate::domain::TrendPoint::new("2021", "100"));
        let profit: Vec<f64> = s.net_profit.iter().filter_map(|p| p.numeric()).collect();
        assert_eq!(profit, [3.0, -2.0]);
        assert_eq!(s.export_file_name(), "Axis_Bank_Financials.xlsx");
    }

    #[test]
    fn missing_page_is_one_error() {
        let r = StatementRefs {
            balance_sheet: "bs://axis".to_string(),
            profit_loss: "pl://gone".to_string(),
        };
        let err = statements_from(page, None, &r).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.to_string(), NO_TABLES_MESSAGE);
    }
}
