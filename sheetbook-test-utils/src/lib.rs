//! Sheetbook Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - `InMemoryGridStore`, a `GridStore` with a call log and failure injection
//! - Fixtures for the three canonical sheets
//! - Proptest generators

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::{json, Value};

// Re-export core types for convenience
pub use sheetbook_core::{
    AdapterError, AdapterResult, CellAddress, ColumnLetter, ColumnMapping, Grid, GridStore,
    HexColor, RgbColor, TableId,
};

// ============================================================================
// IN-MEMORY GRID STORE
// ============================================================================

/// One recorded store operation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    ReadRange(String),
    AppendRow { range: String, row: Vec<String> },
    WriteCell { address: String, value: String },
    DeleteRow { sheet: String, row_number: u32 },
    SetBackground { sheet: String, row_number: u32, column: u32 },
    ClearBackground { sheet: String, row_number: u32, column: u32 },
    ReadBackgrounds(String),
    Describe,
}

impl StoreCall {
    /// True for calls that change the store.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StoreCall::AppendRow { .. }
                | StoreCall::WriteCell { .. }
                | StoreCall::DeleteRow { .. }
                | StoreCall::SetBackground { .. }
                | StoreCall::ClearBackground { .. }
        )
    }
}

/// Which operations should fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailurePlan {
    pub reads: bool,
    pub writes: bool,
    pub backgrounds: bool,
}

#[derive(Debug, Default)]
struct StoreState {
    sheets: HashMap<String, Grid>,
    backgrounds: HashMap<(String, u32, u32), RgbColor>,
    calls: Vec<StoreCall>,
    failures: FailurePlan,
}

/// In-memory stand-in for the spreadsheet store.
///
/// Mirrors the remote behavior that matters to callers: reads drop
/// trailing blank cells, deletes shift later rows (and their backgrounds)
/// up, and every call is logged.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGridStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryGridStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create or replace a sheet.
    pub fn with_sheet(self, sheet: &str, grid: Grid) -> Self {
        self.write().sheets.insert(sheet.to_string(), grid);
        self
    }

    pub fn fail(&self, plan: FailurePlan) {
        self.write().failures = plan;
    }

    /// Current contents of a sheet.
    pub fn sheet(&self, sheet: &str) -> Option<Grid> {
        self.read().sheets.get(sheet).cloned()
    }

    /// Value of one cell (`row_number` is 1-based, `column` is a letter).
    pub fn cell(&self, sheet: &str, row_number: u32, column: &str) -> Option<String> {
        let column = ColumnLetter::parse(column).ok()?;
        let state = self.read();
        state
            .sheets
            .get(sheet)?
            .get((row_number as usize).checked_sub(1)?)?
            .get(column.zero_based() as usize)
            .cloned()
    }

    /// Edit a cell directly, bypassing the call log (a human editing the
    /// sheet).
    pub fn put_cell(&self, sheet: &str, row_number: u32, column: &str, value: &str) {
        let Ok(column) = ColumnLetter::parse(column) else {
            return;
        };
        let mut state = self.write();
        let grid = state.sheets.entry(sheet.to_string()).or_default();
        set_cell(grid, row_number, column.zero_based(), value);
    }

    /// Explicit background of one cell.
    pub fn background(&self, sheet: &str, row_number: u32, column: &str) -> Option<RgbColor> {
        let column = ColumnLetter::parse(column).ok()?;
        self.read()
            .backgrounds
            .get(&(sheet.to_string(), row_number, column.zero_based()))
            .copied()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.read().calls.clone()
    }

    pub fn write_count(&self) -> usize {
        self.read()
            .calls
            .iter()
            .filter(|c| c.is_write())
            .count()
    }

    pub fn clear_calls(&self) {
        self.write().calls.clear();
    }

    fn record(&self, call: StoreCall) -> FailurePlan {
        let mut state = self.write();
        state.calls.push(call);
        state.failures
    }
}

/// Split `Sheet!A1:B2` into the unquoted sheet name and the optional range
/// part.
fn split_range(range: &str) -> (String, Option<&str>) {
    let (sheet, rest) = match range.rfind('!') {
        Some(pos) => (&range[..pos], Some(&range[pos + 1..])),
        None => (range, None),
    };
    let sheet = sheet
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .map(|s| s.replace("''", "'"))
        .unwrap_or_else(|| sheet.to_string());
    (sheet, rest)
}

/// Leading column letters and row of an A1 reference like `D2`.
fn split_cell_ref(part: &str) -> (String, Option<u32>) {
    let letters: String = part.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let row = part[letters.len()..].parse().ok();
    (letters, row)
}

fn set_cell(grid: &mut Grid, row_number: u32, column: u32, value: &str) {
    let row_idx = row_number as usize - 1;
    if grid.len() <= row_idx {
        grid.resize(row_idx + 1, Vec::new());
    }
    let row = &mut grid[row_idx];
    if row.len() <= column as usize {
        row.resize(column as usize + 1, String::new());
    }
    row[column as usize] = value.to_string();
}

fn trim_row(row: &[String]) -> Vec<String> {
    let end = row.iter().rposition(|c| !c.is_empty()).map_or(0, |p| p + 1);
    row[..end].to_vec()
}

fn remote_failure(operation: &str) -> AdapterError {
    AdapterError::remote(operation, "injected failure")
}

#[async_trait]
impl GridStore for InMemoryGridStore {
    async fn read_range(&self, range: &str) -> AdapterResult<Grid> {
        if self.record(StoreCall::ReadRange(range.to_string())).reads {
            return Err(remote_failure("read"));
        }
        let (sheet, part) = split_range(range);
        let state = self.read();
        let grid = state
            .sheets
            .get(&sheet)
            .ok_or_else(|| AdapterError::remote("read", format!("Unable to parse range: {}", range)))?;

        let rows: Vec<Vec<String>> = match part {
            Some("1:1") => grid.iter().take(1).map(|r| trim_row(r)).collect(),
            _ => grid.iter().map(|r| trim_row(r)).collect(),
        };
        let end = rows.iter().rposition(|r| !r.is_empty()).map_or(0, |p| p + 1);
        Ok(rows[..end].to_vec())
    }

    async fn append_row(&self, range: &str, row: Vec<String>) -> AdapterResult<Value> {
        let failures = self.record(StoreCall::AppendRow {
            range: range.to_string(),
            row: row.clone(),
        });
        if failures.writes {
            return Err(remote_failure("append"));
        }
        let (sheet, _) = split_range(range);
        let mut state = self.write();
        let grid = state
            .sheets
            .get_mut(&sheet)
            .ok_or_else(|| AdapterError::remote("append", format!("Unable to parse range: {}", range)))?;

        let last = grid.iter().rposition(|r| r.iter().any(|c| !c.is_empty())).map_or(0, |p| p + 1);
        grid.truncate(last);
        let width = row.len();
        grid.push(row);
        let row_number = grid.len();

        Ok(json!({
            "spreadsheetId": "in-memory",
            "updates": {
                "updatedRange": format!("{}!A{}:{}{}", sheet, row_number,
                    ColumnLetter::from_index(width.max(1) as u32), row_number),
                "updatedRows": 1,
                "updatedCells": width,
            }
        }))
    }

    async fn write_cell(&self, address: &CellAddress, value: &str) -> AdapterResult<Value> {
        let failures = self.record(StoreCall::WriteCell {
            address: address.to_string(),
            value: value.to_string(),
        });
        if failures.writes {
            return Err(remote_failure("update"));
        }
        let mut state = self.write();
        let grid = state.sheets.get_mut(&address.sheet).ok_or_else(|| {
            AdapterError::remote("update", format!("Unable to parse range: {}", address))
        })?;
        set_cell(grid, address.row, address.column.zero_based(), value);

        Ok(json!({
            "spreadsheetId": "in-memory",
            "updatedRange": address.to_string(),
            "updatedRows": 1,
            "updatedCells": 1,
        }))
    }

    async fn delete_row(&self, sheet: &str, row_number: u32) -> AdapterResult<Value> {
        let failures = self.record(StoreCall::DeleteRow {
            sheet: sheet.to_string(),
            row_number,
        });
        if failures.writes {
            return Err(remote_failure("delete"));
        }
        let mut state = self.write();
        let grid = state
            .sheets
            .get_mut(sheet)
            .ok_or_else(|| AdapterError::remote("delete", format!("No sheet named {}", sheet)))?;
        let idx = row_number as usize - 1;
        if idx >= grid.len() {
            return Err(AdapterError::remote(
                "delete",
                format!("Row {} is outside the grid of {}", row_number, sheet),
            ));
        }
        grid.remove(idx);

        let shifted = std::mem::take(&mut state.backgrounds)
            .into_iter()
            .filter_map(|((s, row, col), color)| {
                if s != sheet {
                    Some(((s, row, col), color))
                } else if row == row_number {
                    None
                } else if row > row_number {
                    Some(((s, row - 1, col), color))
                } else {
                    Some(((s, row, col), color))
                }
            })
            .collect();
        state.backgrounds = shifted;

        Ok(json!({"spreadsheetId": "in-memory", "replies": [{}]}))
    }

    async fn set_background(
        &self,
        sheet: &str,
        row_number: u32,
        column: u32,
        color: RgbColor,
    ) -> AdapterResult<()> {
        let failures = self.record(StoreCall::SetBackground {
            sheet: sheet.to_string(),
            row_number,
            column,
        });
        if failures.backgrounds {
            return Err(remote_failure("format"));
        }
        self.write()
            .backgrounds
            .insert((sheet.to_string(), row_number, column), color);
        Ok(())
    }

    async fn clear_background(
        &self,
        sheet: &str,
        row_number: u32,
        column: u32,
    ) -> AdapterResult<()> {
        let failures = self.record(StoreCall::ClearBackground {
            sheet: sheet.to_string(),
            row_number,
            column,
        });
        if failures.backgrounds {
            return Err(remote_failure("format"));
        }
        self.write()
            .backgrounds
            .remove(&(sheet.to_string(), row_number, column));
        Ok(())
    }

    async fn read_backgrounds(&self, range: &str) -> AdapterResult<Vec<Option<RgbColor>>> {
        let failures = self.record(StoreCall::ReadBackgrounds(range.to_string()));
        if failures.reads || failures.backgrounds {
            return Err(remote_failure("read backgrounds"));
        }
        let (sheet, part) = split_range(range);
        let start = part.unwrap_or("A1");
        let (letters, first_row) = split_cell_ref(start.split(':').next().unwrap_or("A1"));
        let column = ColumnLetter::parse(&letters)?;
        let first_row = first_row.unwrap_or(1);

        let state = self.read();
        let last_row = state.sheets.get(&sheet).map_or(0, |g| g.len() as u32);
        let mut colors: Vec<Option<RgbColor>> = (first_row..=last_row)
            .map(|row| {
                state
                    .backgrounds
                    .get(&(sheet.clone(), row, column.zero_based()))
                    .copied()
            })
            .collect();
        while colors.last().is_some_and(|c| c.is_none()) {
            colors.pop();
        }
        Ok(colors)
    }

    async fn describe(&self) -> AdapterResult<String> {
        if self.record(StoreCall::Describe).reads {
            return Err(remote_failure("describe"));
        }
        Ok("In-memory workbook".to_string())
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Sheets laid out as the live workbook is, accented headers included.

    use super::*;

    pub fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    pub fn transactions_grid() -> Grid {
        grid(&[
            &[
                "Data",
                "Valor",
                "Tag 1",
                "Tag 2",
                "Tag 3",
                "Tag 4",
                "Descrição",
                "Pagamento",
                "Tipo",
            ],
            &["2024-05-01", "120,50", "Casa", "Mercado", "", "", "Compras do mês", "Crédito", "Saída"],
            &["2024-05-03", "3500", "Salário"],
            &["2024-05-04", "45", "Lazer", "", "", "", "Cinema", "Pix", "Saída"],
        ])
    }

    pub fn targets_grid() -> Grid {
        grid(&[
            &["Mês", "Tag", "Meta"],
            &["2024-05", "Casa", "800"],
            &["2024-05", "Lazer", "200"],
        ])
    }

    pub fn organizers_grid() -> Grid {
        grid(&[
            &["Tag", "Pagamento", "Tipo", "Cor"],
            &["Casa", "", "Saída", "#1e90ff"],
            &["Lazer", "", "Saída", ""],
            &["Salário", "", "Entrada", "verde"],
        ])
    }

    /// A store holding all three sheets.
    pub fn seeded_store() -> InMemoryGridStore {
        InMemoryGridStore::new()
            .with_sheet(TableId::Transactions.sheet_name(), transactions_grid())
            .with_sheet(TableId::Targets.sheet_name(), targets_grid())
            .with_sheet(TableId::Organizers.sheet_name(), organizers_grid())
    }

    /// A store whose sheets only have headers.
    pub fn empty_store() -> InMemoryGridStore {
        InMemoryGridStore::new()
            .with_sheet(TableId::Transactions.sheet_name(), transactions_grid()[..1].to_vec())
            .with_sheet(TableId::Targets.sheet_name(), targets_grid()[..1].to_vec())
            .with_sheet(TableId::Organizers.sheet_name(), organizers_grid()[..1].to_vec())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for sheetbook inputs.

    use super::*;
    use proptest::prelude::*;

    /// Any table.
    pub fn arb_table() -> impl Strategy<Value = TableId> {
        prop_oneof![
            Just(TableId::Transactions),
            Just(TableId::Targets),
            Just(TableId::Organizers),
        ]
    }

    /// Uppercase column letters of one to three characters.
    pub fn arb_column_letters() -> impl Strategy<Value = String> {
        "[A-Z]{1,3}"
    }

    /// A color in `#rrggbb` form.
    pub fn arb_hex_color() -> impl Strategy<Value = String> {
        any::<[u8; 3]>().prop_map(|[r, g, b]| HexColor { r, g, b }.to_string())
    }

    /// Field names that no table defines.
    pub fn arb_unknown_field() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{3,10}Xyz"
    }

    /// Cell text, including blanks and accented words.
    pub fn arb_cell_text() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[a-zA-Z0-9 ]{1,12}",
            Just("Saída".to_string()),
            Just("Alimentação".to_string()),
        ]
    }

    /// A valid data row number.
    pub fn arb_row_number() -> impl Strategy<Value = u32> {
        2u32..500
    }

    /// A row number that addresses the header or nothing.
    pub fn arb_invalid_row_number() -> impl Strategy<Value = i64> {
        -50i64..2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_drops_trailing_blanks() -> AdapterResult<()> {
        let store = fixtures::seeded_store();
        let grid = store.read_range("Registro").await?;
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[2], vec!["2024-05-03", "3500", "Salário"]);

        let header = store.read_range("Metas!1:1").await?;
        assert_eq!(header.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_shifts_backgrounds() -> AdapterResult<()> {
        let store = fixtures::seeded_store();
        let red = RgbColor {
            red: 1.0,
            green: 0.0,
            blue: 0.0,
        };
        store.set_background("Organizadores", 3, 3, red).await?;
        store.delete_row("Organizadores", 2).await?;

        assert_eq!(store.background("Organizadores", 2, "D"), Some(red));
        assert_eq!(store.background("Organizadores", 3, "D"), None);
        assert_eq!(store.cell("Organizadores", 2, "A").as_deref(), Some("Lazer"));
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_injection_logs_call() {
        let store = fixtures::seeded_store();
        store.fail(FailurePlan {
            writes: true,
            ..Default::default()
        });
        let result = store.append_row("Metas!A:C", vec!["x".to_string()]).await;
        assert!(result.is_err());
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.sheet("Metas").map(|g| g.len()), Some(3));
    }

    #[tokio::test]
    async fn test_read_backgrounds_range() -> AdapterResult<()> {
        let store = fixtures::seeded_store();
        let blue = RgbColor {
            red: 0.0,
            green: 0.0,
            blue: 1.0,
        };
        store.set_background("Organizadores", 3, 3, blue).await?;
        let colors = store.read_backgrounds("Organizadores!D2:D").await?;
        assert_eq!(colors, vec![None, Some(blue)]);
        Ok(())
    }
}
