//! The grid read/write seam.

use async_trait::async_trait;
use serde_json::Value;

use crate::address::CellAddress;
use crate::color::RgbColor;
use crate::error::AdapterResult;
use crate::record::Grid;

/// Remote tabular store holding one sheet per table.
///
/// Ranges are A1 strings built by [`crate::address`]. Every method is a
/// single remote operation; nothing here is transactional, and a delete
/// shifts every later row up by one.
///
/// Failures are reported as [`crate::AdapterError::Remote`].
#[async_trait]
pub trait GridStore: Send + Sync {
    /// Read the cell values of a range. Trailing blank cells may be absent.
    async fn read_range(&self, range: &str) -> AdapterResult<Grid>;

    /// Append one row after the last non-empty row of the range's table.
    /// Returns the store's raw response.
    async fn append_row(&self, range: &str, row: Vec<String>) -> AdapterResult<Value>;

    /// Overwrite one cell. Returns the store's raw response.
    async fn write_cell(&self, address: &CellAddress, value: &str) -> AdapterResult<Value>;

    /// Remove a whole row, shifting the rows below it up.
    async fn delete_row(&self, sheet: &str, row_number: u32) -> AdapterResult<Value>;

    /// Set the background of one cell. `column` is zero-based.
    async fn set_background(
        &self,
        sheet: &str,
        row_number: u32,
        column: u32,
        color: RgbColor,
    ) -> AdapterResult<()>;

    /// Remove the explicit background of one cell. `column` is zero-based.
    async fn clear_background(
        &self,
        sheet: &str,
        row_number: u32,
        column: u32,
    ) -> AdapterResult<()>;

    /// Explicit backgrounds of a column range's cells, one entry per row
    /// starting at the range's first row. Cells without a background are
    /// `None`; the vector may stop early.
    async fn read_backgrounds(&self, range: &str) -> AdapterResult<Vec<Option<RgbColor>>>;

    /// Human-readable name of the store; used to check credentials.
    async fn describe(&self) -> AdapterResult<String>;
}
