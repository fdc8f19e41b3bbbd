//! Table Service
//!
//! Record CRUD for the three tables over an injected [`GridStore`].
//! Every request is validated before the first write reaches the store.

use std::sync::Arc;

use serde_json::Value;
use sheetbook_core::{
    append_range, column_data_range, header_range, records_from_grid, resolve_display_color,
    sheet_range, AdapterError, AdapterResult, CellAddress, ColumnLetter, ColumnMap, ColumnMapping,
    DeleteRequest, GridStore, HexColor, NewRecord, Record, RgbColor, TableId, UpdateRequest,
};

use crate::types::AllDataResponse;

/// Result of a write: the store's raw response plus non-fatal warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub updates: Value,
    pub warnings: Vec<String>,
}

impl WriteOutcome {
    fn new(updates: Value) -> Self {
        Self {
            updates,
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, err: AdapterError) {
        self.warnings.push(err.to_string());
    }
}

#[derive(Clone)]
pub struct TableService {
    store: Arc<dyn GridStore>,
    mapping: ColumnMapping,
}

impl TableService {
    pub fn new(store: Arc<dyn GridStore>, mapping: ColumnMapping) -> Self {
        Self { store, mapping }
    }

    pub fn store(&self) -> &Arc<dyn GridStore> {
        &self.store
    }

    // ========================================================================
    // READ
    // ========================================================================

    /// One read per table. Organizer colors are resolved against cell
    /// backgrounds.
    pub async fn load_all(&self) -> AdapterResult<AllDataResponse> {
        let registro = self.load(TableId::Transactions).await?;
        let metas = self.load(TableId::Targets).await?;
        let organizadores = self.load(TableId::Organizers).await?;
        Ok(AllDataResponse {
            registro,
            metas,
            organizadores,
        })
    }

    pub async fn load(&self, table: TableId) -> AdapterResult<Vec<Record>> {
        let sheet = table.sheet_name();
        let grid = self.store.read_range(&sheet_range(sheet)).await?;
        let mut records = records_from_grid(&grid);
        tracing::debug!(table = %table, records = records.len(), "Loaded table");

        if let Some(color_field) = table.schema().color_field {
            if !records.is_empty() {
                let map = match self.mapping {
                    ColumnMapping::Dynamic => {
                        let header = grid.first().map(Vec::as_slice).unwrap_or_default();
                        ColumnMap::from_header(sheet, header)
                    }
                    ColumnMapping::Static => ColumnMap::static_for(table),
                };
                if let Ok(column) = map.resolve(color_field) {
                    self.apply_display_colors(sheet, color_field, &column, &mut records)
                        .await;
                }
            }
        }
        Ok(records)
    }

    /// Replace the color field of each record with its display color.
    ///
    /// A failed background read falls back to the text values.
    async fn apply_display_colors(
        &self,
        sheet: &str,
        color_field: &str,
        column: &ColumnLetter,
        records: &mut [Record],
    ) {
        let backgrounds = match self
            .store
            .read_backgrounds(&column_data_range(sheet, column))
            .await
        {
            Ok(backgrounds) => backgrounds,
            Err(e) => {
                tracing::warn!(sheet = sheet, error = %e, "Background read failed, using text colors");
                Vec::new()
            }
        };

        for (i, record) in records.iter_mut().enumerate() {
            let background = backgrounds.get(i).and_then(Option::as_ref);
            let color = resolve_display_color(background, record.get(color_field));
            record.set(color_field, color);
        }
    }

    // ========================================================================
    // WRITE
    // ========================================================================

    /// Column letters for a table. Dynamic mode reads the live header;
    /// a sheet without one falls back to the canonical layout.
    async fn column_map(&self, table: TableId) -> AdapterResult<ColumnMap> {
        let schema = table.schema();
        if self.mapping == ColumnMapping::Static {
            return Ok(ColumnMap::static_for(table));
        }

        let grid = self.store.read_range(&header_range(schema.sheet_name)).await?;
        let header = grid.first().map(Vec::as_slice).unwrap_or_default();
        let map = ColumnMap::from_header(schema.sheet_name, header);
        if map.is_empty() {
            tracing::warn!(table = %table, "Sheet has no header row, using canonical layout");
            return Ok(ColumnMap::static_for(table));
        }
        Ok(map)
    }

    /// Append a record as a new row.
    pub async fn add(&self, table: TableId, record: NewRecord) -> AdapterResult<WriteOutcome> {
        let schema = table.schema();
        record.check_required(schema)?;

        let map = self.column_map(table).await?;
        let values = record.resolve(&map)?;
        let row = map.layout_row(&values)?;

        let range = append_range(schema.sheet_name, &map.last_letter());
        tracing::debug!(table = %table, range = %range, "Appending row");
        let mut outcome = WriteOutcome::new(self.store.append_row(&range, row).await?);

        let color = values
            .iter()
            .find(|(field, text)| schema.is_color_field(field) && !text.trim().is_empty());
        if let Some((field, text)) = color {
            let painted = match (appended_row_number(&outcome.updates), map.resolve(field)) {
                (Some(row_number), Ok(column)) => self.paint(table, row_number, &column, text).await,
                _ => Err(AdapterError::Formatting {
                    reason: "could not locate the appended color cell".to_string(),
                }),
            };
            if let Err(e) = painted {
                outcome.warn(e);
            }
        }
        Ok(outcome)
    }

    /// Overwrite one field of an existing row.
    pub async fn update(
        &self,
        table: TableId,
        request: UpdateRequest,
    ) -> AdapterResult<WriteOutcome> {
        let schema = table.schema();
        let cell = request.validate()?;

        let map = self.column_map(table).await?;
        let column = map.resolve(&cell.column)?;
        let address = CellAddress::new(schema.sheet_name, i64::from(cell.row_number), column)?;

        tracing::debug!(table = %table, address = %address, "Updating cell");
        let mut outcome = WriteOutcome::new(self.store.write_cell(&address, &cell.value).await?);

        if schema.is_color_field(&cell.column) {
            if let Err(e) = self
                .paint(table, cell.row_number, &address.column, &cell.value)
                .await
            {
                outcome.warn(e);
            }
        }
        Ok(outcome)
    }

    /// Remove a row. Every later row moves up by one.
    pub async fn delete(
        &self,
        table: TableId,
        request: DeleteRequest,
    ) -> AdapterResult<WriteOutcome> {
        let row_number = request.validate()?;
        tracing::debug!(table = %table, row_number = row_number, "Deleting row");
        let updates = self.store.delete_row(table.sheet_name(), row_number).await?;
        Ok(WriteOutcome::new(updates))
    }

    /// Best-effort background write mirroring a color field's text.
    /// Blank text clears the background so reads fall back to the default.
    async fn paint(
        &self,
        table: TableId,
        row_number: u32,
        column: &ColumnLetter,
        text: &str,
    ) -> AdapterResult<()> {
        let sheet = table.sheet_name();
        let written = if text.trim().is_empty() {
            self.store
                .clear_background(sheet, row_number, column.zero_based())
                .await
        } else {
            match text.parse::<HexColor>() {
                Ok(hex) => {
                    self.store
                        .set_background(sheet, row_number, column.zero_based(), RgbColor::from(hex))
                        .await
                }
                Err(e) => Err(e),
            }
        };
        let result = written.map_err(|e| AdapterError::Formatting {
            reason: e.to_string(),
        });

        if let Err(e) = &result {
            tracing::warn!(
                table = %table,
                row_number = row_number,
                column = %column,
                error = %e,
                "Background color not applied"
            );
        }
        result
    }
}

/// Row number of an append, read from the store's `updates.updatedRange`
/// (e.g. `Organizadores!A5:D5`).
pub fn appended_row_number(updates: &Value) -> Option<u32> {
    let range = updates
        .get("updates")
        .and_then(|u| u.get("updatedRange"))
        .and_then(Value::as_str)?;
    let cells = range.rsplit_once('!').map_or(range, |(_, cells)| cells);
    let first = cells.split(':').next()?;
    first
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .ok()
}
