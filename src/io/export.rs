//! Export both statements to one Excel workbook.
//!
//! The workbook has exactly two sheets, "Balance Sheet" and "Profit & Loss",
//! each with a bold header row followed by the table rows (no index column).
//! Cells that parse as numbers are written as numbers so the sheet can be
//! charted directly.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::domain::{RawTable, StatementKind, Statements, parse_number};
use crate::error::AppError;

/// Write the workbook for `statements` to `path`.
pub fn write_financials_xlsx(path: &Path, statements: &Statements) -> Result<(), AppError> {
    let bytes = financials_xlsx_bytes(&statements.balance_sheet, &statements.profit_loss)?;
    std::fs::write(path, bytes)
        .map_err(|e| AppError::input(format!("Failed to write workbook '{}': {e}", path.display())))?;
    info!(path = %path.display(), company = statements.display_name(), "exported workbook");
    Ok(())
}

/// Render the workbook into memory.
pub fn financials_xlsx_bytes(balance_sheet: &RawTable, profit_loss: &RawTable) -> Result<Vec<u8>, AppError> {
    let mut workbook = build_workbook(balance_sheet, profit_loss)?;
    workbook
        .save_to_buffer()
        .map_err(|e| AppError::runtime(format!("Failed to render workbook: {e}")))
}

fn build_workbook(balance_sheet: &RawTable, profit_loss: &RawTable) -> Result<Workbook, AppError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for kind in StatementKind::ALL {
        let table = match kind {
            StatementKind::BalanceSheet => balance_sheet,
            StatementKind::ProfitLoss => profit_loss,
        };
        let sheet = workbook.add_worksheet();
        write_sheet(sheet, kind.sheet_name(), table, &header_format)
            .map_err(|e| AppError::runtime(format!("Failed to build sheet '{}': {e}", kind.sheet_name())))?;
    }

    Ok(workbook)
}

fn write_sheet(sheet: &mut Worksheet, name: &str, table: &RawTable, header_format: &Format) -> Result<(), XlsxError> {
    sheet.set_name(name)?;

    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, header_format)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let row_num = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let Some(text) = cell else { continue };
            // The label column stays text even when it looks numeric.
            match parse_number(text).filter(|_| col > 0) {
                Some(v) => sheet.write_number(row_num, col as u16, v)?,
                None => sheet.write_string(row_num, col as u16, text)?,
            };
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workbook_renders_to_xlsx_bytes() {
        let bs = RawTable::from_strs(&["Particulars", "2023"], &[&["Total Assets", "1,234"]]);
        let pl = RawTable::from_strs(&["Particulars", "2023"], &[&["Net Profit", "(12)"], &["", ""]]);
        let bytes = financials_xlsx_bytes(&bs, &pl).unwrap();
        // xlsx is a zip container.
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 100);
    }

    #[test]
    fn writes_workbook_file() {
        let bs = RawTable::from_strs(&["Particulars", "2023"], &[&["Total Assets", "140"]]);
        let pl = RawTable::from_strs(&["Particulars", "2023"], &[&["Net Profit", "3"]]);
        let statements = crate::app::pipeline::build_statements(Some("Axis Bank".to_string()), &bs, &pl);

        let path = std::env::temp_dir().join(format!("lv-export-{}.xlsx", std::process::id()));
        write_financials_xlsx(&path, &statements).unwrap();
        let written = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(written.starts_with(b"PK"));
    }

    #[test]
    fn unwritable_path_is_an_input_error() {
        let statements = crate::app::pipeline::build_statements(None, &RawTable::default(), &RawTable::default());
        let err = write_financials_xlsx(Path::new("/nonexistent-dir/x.xlsx"), &statements).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_tables_still_export() {
        let bytes = financials_xlsx_bytes(&RawTable::default(), &RawTable::default()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
