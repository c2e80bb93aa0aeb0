//! Catalog construction from the exchange master list.

use tracing::debug;

use crate::catalog::slug::slug;
use crate::domain::{CatalogEntry, MasterRow, StatementKind};

/// Root of the statement pages on the source site.
pub const BASE_URL: &str = "https://www.moneycontrol.com/financials";

/// `{base}/{slug}/{statement}/{symbol}#{symbol}`
pub fn statement_url(base: &str, slug: &str, kind: StatementKind, symbol: &str) -> String {
    format!(
        "{}/{slug}/{}/{symbol}#{symbol}",
        base.trim_end_matches('/'),
        kind.url_segment()
    )
}

/// Derive the catalog entry for one master-list row.
///
/// Name and symbol are trimmed; the URLs depend only on those two values.
pub fn entry_for(row: &MasterRow, base: &str) -> CatalogEntry {
    let company = row.name.trim().to_string();
    let symbol = row.symbol.trim().to_string();
    let slug = slug(&company);

    CatalogEntry {
        balance_sheet_url: statement_url(base, &slug, StatementKind::BalanceSheet, &symbol),
        profit_loss_url: statement_url(base, &slug, StatementKind::ProfitLoss, &symbol),
        company,
        symbol,
        bs_valid: None,
        pl_valid: None,
    }
}

/// Build one entry per master row, in input order. Duplicates are kept.
pub fn build(rows: &[MasterRow], base: &str) -> Vec<CatalogEntry> {
    let entries: Vec<CatalogEntry> = rows.iter().map(|row| entry_for(row, base)).collect();
    debug!(entries = entries.len(), "built catalog entries");
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsw_steel_urls_carry_slug_and_symbol() {
        let e = entry_for(&MasterRow::new("JSW Steel Ltd", "JSWSTEEL"), BASE_URL);
        assert_eq!(
            e.balance_sheet_url,
            "https://www.moneycontrol.com/financials/jswsteelltd/balance-sheetVI/JSWSTEEL#JSWSTEEL"
        );
        assert_eq!(
            e.profit_loss_url,
            "https://www.moneycontrol.com/financials/jswsteelltd/profit-lossVI/JSWSTEEL#JSWSTEEL"
        );
        for url in [&e.balance_sheet_url, &e.profit_loss_url] {
            assert!(url.contains("jswsteelltd"));
            assert!(url.contains("JSWSTEEL"));
        }
    }

    #[test]
    fn inputs_are_trimmed() {
        let e = entry_for(&MasterRow::new("  Axis Bank Limited ", " AXISBANK "), "http://x/");
        assert_eq!(e.company, "Axis Bank Limited");
        assert_eq!(e.symbol, "AXISBANK");
        assert_eq!(e.balance_sheet_url, "http://x/axisbanklimited/balance-sheetVI/AXISBANK#AXISBANK");
    }

    #[test]
    fn build_preserves_order_and_duplicates() {
        let rows = vec![
            MasterRow::new("B Corp", "B"),
            MasterRow::new("A Corp", "A"),
            MasterRow::new("B Corp", "B2"),
        ];
        let entries = build(&rows, BASE_URL);
        let names: Vec<&str> = entries.iter().map(|e| e.company.as_str()).collect();
        assert_eq!(names, ["B Corp", "A Corp", "B Corp"]);
        assert_eq!(entries[2].symbol, "B2");
    }

    #[test]
    fn build_is_independent_of_row_order() {
        let a = MasterRow::new("Infosys Ltd", "INFY");
        let b = MasterRow::new("Wipro Ltd", "WIPRO");
        let forward = build(&[a.clone(), b.clone()], BASE_URL);
        let backward = build(&[b, a], BASE_URL);
        assert_eq!(forward[0], backward[1]);
        assert_eq!(forward[1], backward[0]);
    }
}
