//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the resolver/normalizer code stays free of presentation concerns
//! - output changes are localized

use crate::domain::{MatchResult, RawTable, Statements, StatementKind, Suggestion, TrendPoint};
use crate::resolve::ACCEPT_THRESHOLD;

const LABEL_WIDTH_MAX: usize = 40;
const VALUE_WIDTH_MAX: usize = 14;

/// Header lines for a fetched company.
pub fn format_statements_summary(statements: &Statements) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", statements.display_name()));
    out.push_str(&format!(
        "Fetched: {}\n",
        statements.fetched_at.format("%Y-%m-%d %H:%M:%S")
    ));
    for kind in StatementKind::ALL {
        let table = statements.table(kind);
        out.push_str(&format!(
            "{}: {} rows x {} periods\n",
            kind.display_name(),
            table.rows.len(),
            table.periods().len()
        ));
    }
    out
}

/// A statement table as fixed-width text: left-aligned labels, right-aligned values.
pub fn format_statement_table(title: &str, table: &RawTable) -> String {
    let mut out = String::new();
    out.push_str(&format!("{title}:\n"));

    if table.headers.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let widths = column_widths(table);
    let mut header_line = String::new();
    for (col, header) in table.headers.iter().enumerate() {
        push_cell(&mut header_line, col, header, widths[col]);
    }
    out.push_str(header_line.trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join(" "));
    out.push('\n');

    for row in &table.rows {
        let mut line = String::new();
        for (col, width) in widths.iter().enumerate() {
            let text = row.get(col).cloned().flatten().unwrap_or_default();
            push_cell(&mut line, col, &text, *width);
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn column_widths(table: &RawTable) -> Vec<usize> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let cap = if col == 0 { LABEL_WIDTH_MAX } else { VALUE_WIDTH_MAX };
            let longest = table
                .rows
                .iter()
                .filter_map(|r| r.get(col).and_then(|c| c.as_deref()))
                .map(|s| s.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            longest.clamp(1, cap)
        })
        .collect()
}

fn push_cell(line: &mut String, col: usize, text: &str, width: usize) {
    if col > 0 {
        line.push(' ');
    }
    let text = truncate(text, width);
    if col == 0 {
        line.push_str(&format!("{text:<width$}"));
    } else {
        line.push_str(&format!("{text:>width$}"));
    }
}

/// One line describing the resolver outcome.
pub fn format_match(query: &str, result: &MatchResult) -> String {
    match &result.candidate {
        Some(name) if result.confidence >= ACCEPT_THRESHOLD => {
            format!("'{query}' -> {name} (confidence {})", result.confidence)
        }
        Some(name) => format!(
            "'{query}': no confident match (closest: {name}, confidence {} < {ACCEPT_THRESHOLD})",
            result.confidence
        ),
        None => format!("'{query}': no match"),
    }
}

/// Numbered suggestion list.
pub fn format_suggestions(suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return "No suggestions.\n".to_string();
    }
    let mut out = String::from("Suggestions:\n");
    for (idx, s) in suggestions.iter().enumerate() {
        out.push_str(&format!("{:>3}) {:<40} {:>3}\n", idx + 1, truncate(&s.name, 40), s.score));
    }
    out
}

/// Period/value listing of a trend series.
pub fn format_trend(title: &str, series: &[TrendPoint]) -> String {
    let mut out = format!("{title}:\n");
    if series.is_empty() {
        out.push_str("(nothing to chart)\n");
        return out;
    }
    for p in series {
        out.push_str(&format!("  {:<12} {}\n", p.period, p.value.as_deref().unwrap_or("-")));
    }
    out
}

/// Summary printed after a catalog build.
pub fn format_build_summary(rows_read: usize, skipped: usize, built: usize, kept: Option<usize>, output: &str) -> String {
    let mut out = format!("Read {rows_read} master rows ({skipped} skipped), built {built} entries.\n");
    if let Some(kept) = kept {
        out.push_str(&format!("Verified: {kept} of {built} entries have a reachable statement page.\n"));
    }
    out.push_str(&format!("Saved to '{output}'.\n"));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_table_aligns_columns() {
        let t = RawTable::from_strs(
            &["Particulars", "2022", "2023"],
            &[&["Total Assets", "1,200", "140"], &["Cash", "", "7"]],
        );
        let text = format_statement_table("Balance Sheet", &t);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Balance Sheet:");
        assert_eq!(lines[1], "Particulars   2022 2023");
        assert_eq!(lines[2], "------------ ----- ----");
        assert_eq!(lines[3], "Total Assets 1,200  140");
        assert_eq!(lines[4], "Cash                  7");
    }

    #[test]
    fn empty_table_says_no_data() {
        assert!(format_statement_table("P&L", &RawTable::default()).contains("(no data)"));
    }

    #[test]
    fn match_lines_reflect_threshold() {
        let hit = MatchResult {
            candidate: Some("Axis Bank".to_string()),
            confidence: 89,
        };
        assert_eq!(format_match("axsi bank", &hit), "'axsi bank' -> Axis Bank (confidence 89)");

        let weak = MatchResult {
            candidate: Some("Axis Bank".to_string()),
            confidence: 40,
        };
        assert!(format_match("zz", &weak).contains("no confident match"));
        assert_eq!(format_match("", &MatchResult::none()), "'': no match");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn empty_trend_is_reported() {
        assert!(format_trend("Net Profit", &[]).contains("nothing to chart"));
        let s = format_trend("Total Assets", &[TrendPoint::new("2023", "140")]);
        assert!(s.contains("2023") && s.contains("140"));
    }
}
