//! Statement table reshaping.
//!
//! Scraped statement tables are wide: one row per line item, one column per
//! reporting period. Charting wants the long form, filtered to one line item:
//!
//! `normalize` (keep the first N columns) -> `melt` -> `filter_trend`
//!
//! Nothing in here fails. Missing tables and unmatched labels simply produce
//! empty outputs, which the callers treat as "nothing to chart".

use crate::domain::{KEEP_COLUMNS, LongRow, RawTable, TrendPoint};

/// Keep the first `keep_columns` columns of the header and of every row.
///
/// Tables narrower than `keep_columns` are returned unchanged (no padding).
pub fn normalize(raw: &RawTable, keep_columns: usize) -> RawTable {
    RawTable {
        headers: raw.headers.iter().take(keep_columns).cloned().collect(),
        rows: raw
            .rows
            .iter()
            .map(|row| row.iter().take(keep_columns).cloned().collect())
            .collect(),
    }
}

/// Wide -> long: one `(label, period, value)` per row and non-label column.
///
/// Output order is row order, then column order. Rows shorter than the header
/// yield absent values for the missing cells.
pub fn melt(table: &RawTable) -> Vec<LongRow> {
    let periods = table.periods();
    let mut out = Vec::with_capacity(table.rows.len() * periods.len());

    for row in &table.rows {
        let label = row.first().cloned().flatten();
        for (offset, period) in periods.iter().enumerate() {
            out.push(LongRow {
                label: label.clone(),
                period: period.clone(),
                value: row.get(offset + 1).cloned().flatten(),
            });
        }
    }

    out
}

/// Keep the tuples whose label contains `keyword` (case-insensitive).
///
/// Absent labels never match.
pub fn filter_trend(long_form: &[LongRow], keyword: &str) -> Vec<TrendPoint> {
    let needle = keyword.to_lowercase();
    long_form
        .iter()
        .filter(|r| {
            r.label
                .as_deref()
                .is_some_and(|label| label.to_lowercase().contains(&needle))
        })
        .map(|r| TrendPoint {
            period: r.period.clone(),
            value: r.value.clone(),
        })
        .collect()
}

/// Full trend extraction for one statement.
///
/// `None` (table unavailable upstream) propagates as an empty series.
pub fn trend_series(table: Option<&RawTable>, keyword: &str) -> Vec<TrendPoint> {
    let Some(table) = table else {
        return Vec::new();
    };
    let normalized = normalize(table, KEEP_COLUMNS);
    filter_trend(&melt(&normalized), keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance_sheet() -> RawTable {
        RawTable::from_strs(
            &["Particulars", "2021", "2022", "2023"],
            &[
                &["Total Assets", "100", "120", "140"],
                &["Total Liabilities", "60", "70", "80"],
            ],
        )
    }

    #[test]
    fn total_assets_trend_matches_source_cells() {
        let trend = filter_trend(&melt(&balance_sheet()), "Total Assets");
        assert_eq!(
            trend,
            vec![
                TrendPoint::new("2021", "100"),
                TrendPoint::new("2022", "120"),
                TrendPoint::new("2023", "140"),
            ]
        );
    }

    #[test]
    fn no_matching_label_gives_empty_series() {
        assert!(filter_trend(&melt(&balance_sheet()), "Net Profit").is_empty());
        assert!(trend_series(None, "Total Assets").is_empty());
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let t = RawTable::from_strs(
            &["", "Mar 24", "Mar 23"],
            &[&["Net Profit for the Year", "10", "9"], &["", "x", "y"]],
        );
        let trend = filter_trend(&melt(&t), "net profit");
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].period, "Mar 24");
    }

    #[test]
    fn absent_labels_never_match() {
        let t = RawTable::from_strs(&["Particulars", "2021"], &[&["", "5"]]);
        assert!(filter_trend(&melt(&t), "").is_empty());
    }

    #[test]
    fn melt_orders_by_row_then_column() {
        let long = melt(&balance_sheet());
        assert_eq!(long.len(), 6);
        assert_eq!(long[0].period, "2021");
        assert_eq!(long[2].period, "2023");
        assert_eq!(long[3].label.as_deref(), Some("Total Liabilities"));
    }

    #[test]
    fn melt_short_rows_yield_absent_values() {
        let t = RawTable::new(
            vec!["Particulars".into(), "2021".into(), "2022".into()],
            vec![vec![Some("Total Assets".into()), Some("1".into())]],
        );
        let long = melt(&t);
        assert_eq!(long.len(), 2);
        assert_eq!(long[1].value, None);
    }

    #[test]
    fn normalize_truncates_to_keep_columns() {
        let t = RawTable::from_strs(
            &["P", "1", "2", "3", "4", "5", "6", "7"],
            &[&["Total Assets", "a", "b", "c", "d", "e", "f", "g"]],
        );
        let n = normalize(&t, KEEP_COLUMNS);
        assert_eq!(n.width(), 6);
        assert_eq!(n.rows[0].len(), 6);
        assert_eq!(n.rows[0][5].as_deref(), Some("e"));
    }

    #[test]
    fn normalize_keeps_narrow_tables_and_is_idempotent() {
        let t = balance_sheet();
        let once = normalize(&t, KEEP_COLUMNS);
        assert_eq!(once, t);
        assert_eq!(normalize(&once, KEEP_COLUMNS), once);
    }
}
