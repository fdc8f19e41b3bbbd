//! Sheets v4 request and response bodies.
//!
//! Only the fields this service reads or sends are modeled.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sheetbook_core::{Grid, RgbColor};

// ============================================================================
// VALUES
// ============================================================================

/// Response of `values/{range}` GET.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    /// Omitted entirely when the range is empty.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Cells as text. Formatted values arrive as strings already; anything
    /// else is rendered with its JSON text.
    pub fn into_grid(self) -> Grid {
        self.values
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

/// Body for `:append` and `PUT values/{range}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRangeBody {
    pub range: String,
    pub major_dimension: &'static str,
    pub values: Vec<Vec<String>>,
}

impl ValueRangeBody {
    pub fn single_row(range: impl Into<String>, row: Vec<String>) -> Self {
        Self {
            range: range.into(),
            major_dimension: "ROWS",
            values: vec![row],
        }
    }
}

// ============================================================================
// SPREADSHEET METADATA
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    #[serde(default)]
    pub properties: Option<SpreadsheetProperties>,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpreadsheetProperties {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sheet {
    #[serde(default)]
    pub properties: Option<SheetProperties>,
    #[serde(default)]
    pub data: Vec<GridData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    /// The first sheet of a workbook has id 0, which the API omits.
    #[serde(default)]
    pub sheet_id: i64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    #[serde(default)]
    pub row_data: Vec<RowData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowData {
    #[serde(default)]
    pub values: Vec<CellData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    #[serde(default)]
    pub user_entered_format: Option<CellFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    #[serde(default)]
    pub background_color: Option<RgbColor>,
}

impl Spreadsheet {
    /// First-column backgrounds of the first returned grid, one per row.
    pub fn first_column_backgrounds(&self) -> Vec<Option<RgbColor>> {
        let Some(grid) = self.sheets.first().and_then(|sheet| sheet.data.first()) else {
            return Vec::new();
        };
        grid.row_data
            .iter()
            .map(|row| {
                row.values
                    .first()
                    .and_then(|cell| cell.user_entered_format.as_ref())
                    .and_then(|format| format.background_color)
            })
            .collect()
    }
}

// ============================================================================
// BATCH UPDATE
// ============================================================================

/// `deleteDimension` request removing one 1-based row.
pub fn delete_row_request(sheet_id: i64, row_number: u32) -> Value {
    let start = i64::from(row_number) - 1;
    json!({
        "requests": [{
            "deleteDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": start,
                    "endIndex": start + 1
                }
            }
        }]
    })
}

/// `repeatCell` request setting one cell's background. `column` is zero-based.
///
/// `None` clears it: the masked field is absent from the cell, so Sheets
/// resets it.
pub fn background_request(
    sheet_id: i64,
    row_number: u32,
    column: u32,
    color: Option<RgbColor>,
) -> Value {
    let row = i64::from(row_number) - 1;
    let column = i64::from(column);
    let cell = match color {
        Some(color) => json!({"userEnteredFormat": {"backgroundColor": color}}),
        None => json!({}),
    };
    json!({
        "requests": [{
            "repeatCell": {
                "range": {
                    "sheetId": sheet_id,
                    "startRowIndex": row,
                    "endRowIndex": row + 1,
                    "startColumnIndex": column,
                    "endColumnIndex": column + 1
                },
                "cell": cell,
                "fields": "userEnteredFormat.backgroundColor"
            }
        }]
    })
}

// ============================================================================
// ERRORS AND TOKENS
// ============================================================================

/// Google error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorBody {
    pub error: GoogleError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Pull the human message out of an error body, falling back to the raw text.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<GoogleErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
        _ => body.trim().to_string(),
    }
}

/// OAuth token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_range_into_grid() -> Result<(), serde_json::Error> {
        let range: ValueRange = serde_json::from_value(json!({
            "range": "Registro!A1:C3",
            "majorDimension": "ROWS",
            "values": [["Data", "Valor"], ["2024-06-01", 12.5, true], []]
        }))?;
        let grid = range.into_grid();
        assert_eq!(grid[0], vec!["Data", "Valor"]);
        assert_eq!(grid[1], vec!["2024-06-01", "12.5", "true"]);
        assert!(grid[2].is_empty());

        let empty: ValueRange = serde_json::from_value(json!({"range": "Metas!A1:Z1000"}))?;
        assert!(empty.into_grid().is_empty());
        Ok(())
    }

    #[test]
    fn test_first_column_backgrounds() -> Result<(), serde_json::Error> {
        let spreadsheet: Spreadsheet = serde_json::from_value(json!({
            "sheets": [{
                "data": [{
                    "rowData": [
                        {"values": [{"userEnteredFormat": {"backgroundColor": {"red": 1, "blue": 0.5}}}]},
                        {},
                        {"values": [{}]}
                    ]
                }]
            }]
        }))?;
        let backgrounds = spreadsheet.first_column_backgrounds();
        assert_eq!(backgrounds.len(), 3);
        assert_eq!(
            backgrounds[0],
            Some(RgbColor {
                red: 1.0,
                green: 0.0,
                blue: 0.5
            })
        );
        assert_eq!(backgrounds[1], None);
        assert_eq!(backgrounds[2], None);
        Ok(())
    }

    #[test]
    fn test_batch_requests_use_zero_based_indexes() {
        let delete = delete_row_request(7, 5);
        let range = &delete["requests"][0]["deleteDimension"]["range"];
        assert_eq!(range["startIndex"], json!(4));
        assert_eq!(range["endIndex"], json!(5));

        let paint = background_request(7, 3, 3, Some(RgbColor::default()));
        let range = &paint["requests"][0]["repeatCell"]["range"];
        assert_eq!(range["startRowIndex"], json!(2));
        assert_eq!(range["startColumnIndex"], json!(3));
        assert_eq!(range["endColumnIndex"], json!(4));
        assert!(paint["requests"][0]["repeatCell"]["cell"]["userEnteredFormat"]
            .get("backgroundColor")
            .is_some());

        let clear = background_request(7, 3, 3, None);
        let repeat = &clear["requests"][0]["repeatCell"];
        assert_eq!(repeat["cell"], json!({}));
        assert_eq!(repeat["fields"], json!("userEnteredFormat.backgroundColor"));
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#;
        assert_eq!(error_message(body), "Requested entity was not found.");
        assert_eq!(error_message("  upstream timeout "), "upstream timeout");
    }
}
