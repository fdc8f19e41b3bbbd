//! A1-notation range addresses.

use std::fmt;

use crate::column::ColumnLetter;
use crate::error::{AdapterError, AdapterResult};

/// Row 1 holds the header; data starts here.
pub const FIRST_DATA_ROW: u32 = 2;

/// Quote a sheet name for use in a range when it needs quoting.
pub fn quote_sheet_name(sheet: &str) -> String {
    let plain = !sheet.is_empty()
        && sheet
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

/// A single-cell address such as `Registro!C5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAddress {
    pub sheet: String,
    pub column: ColumnLetter,
    pub row: u32,
}

impl CellAddress {
    /// Build an address for a data cell.
    ///
    /// Fails with `InvalidRowNumber` for row 1 (the header) and below.
    pub fn new(sheet: impl Into<String>, row: i64, column: ColumnLetter) -> AdapterResult<Self> {
        let row = validate_row_number(row)?;
        Ok(Self {
            sheet: sheet.into(),
            column,
            row,
        })
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{}{}",
            quote_sheet_name(&self.sheet),
            self.column,
            self.row
        )
    }
}

/// Check that a client-supplied row number addresses a data row.
pub fn validate_row_number(row: i64) -> AdapterResult<u32> {
    if row < i64::from(FIRST_DATA_ROW) || row > i64::from(u32::MAX) {
        return Err(AdapterError::InvalidRowNumber { row });
    }
    Ok(row as u32)
}

/// Range used to append a row: `<Sheet>!A:<last>`.
pub fn append_range(sheet: &str, last_column: &ColumnLetter) -> String {
    format!("{}!A:{}", quote_sheet_name(sheet), last_column)
}

/// Range covering the header row: `<Sheet>!1:1`.
pub fn header_range(sheet: &str) -> String {
    format!("{}!1:1", quote_sheet_name(sheet))
}

/// Range covering the whole sheet.
pub fn sheet_range(sheet: &str) -> String {
    quote_sheet_name(sheet)
}

/// Range covering one column's data cells: `<Sheet>!D2:D`.
pub fn column_data_range(sheet: &str, column: &ColumnLetter) -> String {
    format!(
        "{}!{}{}:{}",
        quote_sheet_name(sheet),
        column,
        FIRST_DATA_ROW,
        column
    )
}
