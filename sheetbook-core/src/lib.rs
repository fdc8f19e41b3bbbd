//! Sheetbook Core - Tabular Record Adapter
//!
//! Translates between the rectangular grids of a spreadsheet store and
//! keyed records, and between keyed field updates and single-cell
//! addresses. This crate does no I/O; the store is reached through the
//! [`GridStore`] trait.

pub mod address;
pub mod color;
pub mod column;
pub mod error;
pub mod header;
pub mod payload;
pub mod record;
pub mod schema;
pub mod store;

pub use address::{
    append_range, column_data_range, header_range, sheet_range, validate_row_number, CellAddress,
    FIRST_DATA_ROW,
};
pub use color::{resolve_display_color, HexColor, RgbColor, DEFAULT_TAG_COLOR};
pub use column::{column_index_to_letter, column_letter_to_index, ColumnLetter};
pub use error::{AdapterError, AdapterResult};
pub use header::{field_names_match, normalize_field_name};
pub use payload::{CellUpdate, DeleteRequest, NewRecord, UpdateRequest};
pub use record::{records_from_grid, Grid, Record, ROW_NUMBER_FIELD};
pub use schema::{ColumnMap, ColumnMapping, TableId, TableSchema};
pub use store::GridStore;
