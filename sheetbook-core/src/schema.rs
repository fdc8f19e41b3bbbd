//! Table schemas and field-to-column resolution.
//!
//! Three tables live in the backing spreadsheet, one per sheet. Their
//! canonical layout is fixed here; a [`ColumnMap`] can either be taken from
//! that layout or derived from the live header row.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::column::ColumnLetter;
use crate::error::{AdapterError, AdapterResult};
use crate::header::{field_names_match, normalize_field_name};

// ============================================================================
// TABLES
// ============================================================================

/// The logical tables exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableId {
    /// Financial transactions (`Registro`).
    Transactions,
    /// Monthly spending targets (`Metas`).
    Targets,
    /// Tag organizers with display colors (`Organizadores`).
    Organizers,
}

impl TableId {
    pub fn all() -> [TableId; 3] {
        [TableId::Transactions, TableId::Targets, TableId::Organizers]
    }

    /// Name of the sheet backing this table.
    pub fn sheet_name(&self) -> &'static str {
        self.schema().sheet_name
    }

    pub fn schema(&self) -> &'static TableSchema {
        match self {
            TableId::Transactions => &TRANSACTIONS,
            TableId::Targets => &TARGETS,
            TableId::Organizers => &ORGANIZERS,
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// Canonical layout of one table.
#[derive(Debug)]
pub struct TableSchema {
    pub sheet_name: &'static str,
    /// Normalized header names in column order, starting at `A`.
    pub fields: &'static [&'static str],
    pub required: &'static [&'static str],
    /// Field whose value is mirrored as the cell background.
    pub color_field: Option<&'static str>,
}

pub const TRANSACTIONS: TableSchema = TableSchema {
    sheet_name: "Registro",
    fields: &[
        "Data",
        "Valor",
        "Tag 1",
        "Tag 2",
        "Tag 3",
        "Tag 4",
        "Descricao",
        "Pagamento",
        "Tipo",
    ],
    required: &["Data"],
    color_field: None,
};

pub const TARGETS: TableSchema = TableSchema {
    sheet_name: "Metas",
    fields: &["Mes", "Tag", "Meta"],
    required: &["Mes", "Tag"],
    color_field: None,
};

pub const ORGANIZERS: TableSchema = TableSchema {
    sheet_name: "Organizadores",
    fields: &["Tag", "Pagamento", "Tipo", "Cor"],
    required: &["Tag"],
    color_field: Some("Cor"),
};

impl TableSchema {
    pub fn required_fields(&self) -> &'static [&'static str] {
        self.required
    }

    /// True when `field` names this table's color field.
    pub fn is_color_field(&self, field: &str) -> bool {
        self.color_field
            .map(|color| field_names_match(color, field))
            .unwrap_or(false)
    }

    pub fn static_column_map(&self) -> ColumnMap {
        let mut map = ColumnMap::empty(self.sheet_name);
        for (position, field) in self.fields.iter().enumerate() {
            map.insert((*field).to_string(), ColumnLetter::from_index(position as u32 + 1));
        }
        map
    }
}

// ============================================================================
// COLUMN MAPPING MODE
// ============================================================================

/// Where column letters come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnMapping {
    /// Read the live header row before each write.
    #[default]
    Dynamic,
    /// Use the canonical layout without consulting the sheet.
    Static,
}

impl FromStr for ColumnMapping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamic" => Ok(ColumnMapping::Dynamic),
            "static" => Ok(ColumnMapping::Static),
            other => Err(format!(
                "unknown column mapping '{}', expected 'dynamic' or 'static'",
                other
            )),
        }
    }
}

// ============================================================================
// COLUMN MAP
// ============================================================================

/// Field name to column letter mapping for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    table: String,
    entries: Vec<(String, ColumnLetter)>,
}

impl ColumnMap {
    pub fn empty(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            entries: Vec::new(),
        }
    }

    /// Canonical layout of `table`, no header read needed.
    pub fn static_for(table: TableId) -> Self {
        table.schema().static_column_map()
    }

    /// Derive the mapping from a live header row.
    ///
    /// Blank header cells are skipped. A repeated name keeps its last
    /// position, matching how records resolve duplicates.
    pub fn from_header(table: impl Into<String>, header: &[String]) -> Self {
        let mut map = Self::empty(table);
        for (position, cell) in header.iter().enumerate() {
            let name = normalize_field_name(cell);
            if name.is_empty() {
                continue;
            }
            map.insert(name, ColumnLetter::from_index(position as u32 + 1));
        }
        map
    }

    fn insert(&mut self, field: String, column: ColumnLetter) {
        self.entries.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&field));
        self.entries.push((field, column));
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Resolve a request field name to its column letter.
    pub fn resolve(&self, field: &str) -> AdapterResult<ColumnLetter> {
        self.lookup(field)
            .map(|(_, column)| column.clone())
            .ok_or_else(|| AdapterError::unknown_column(&self.table, field))
    }

    /// The header spelling of a field, if the table has it.
    pub fn canonical_name(&self, field: &str) -> Option<&str> {
        self.lookup(field).map(|(name, _)| name.as_str())
    }

    fn lookup(&self, field: &str) -> Option<&(String, ColumnLetter)> {
        let wanted = normalize_field_name(field);
        self.entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&wanted))
    }

    /// Right-most mapped column, `A` for an empty map.
    pub fn last_letter(&self) -> ColumnLetter {
        ColumnLetter::from_index(self.width().max(1))
    }

    /// Number of columns an appended row must span.
    pub fn width(&self) -> u32 {
        self.entries
            .iter()
            .map(|(_, column)| column.index())
            .max()
            .unwrap_or(0)
    }

    /// Lay out `(field, value)` pairs as a row in column order.
    ///
    /// Unmapped columns stay blank. Unknown fields are an error.
    pub fn layout_row(&self, values: &[(String, String)]) -> AdapterResult<Vec<String>> {
        let mut row = vec![String::new(); self.width() as usize];
        for (field, value) in values {
            let column = self.resolve(field)?;
            row[column.zero_based() as usize] = value.clone();
        }
        Ok(row)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnLetter)> {
        self.entries.iter().map(|(name, column)| (name.as_str(), column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_table_sheet_names() {
        assert_eq!(TableId::Transactions.sheet_name(), "Registro");
        assert_eq!(TableId::Targets.sheet_name(), "Metas");
        assert_eq!(TableId::Organizers.sheet_name(), "Organizadores");
        assert_eq!(TableId::all().len(), 3);
    }

    #[test]
    fn test_static_map_matches_schema() -> AdapterResult<()> {
        let map = TRANSACTIONS.static_column_map();
        assert_eq!(map.resolve("Data")?.as_str(), "A");
        assert_eq!(map.resolve("Valor")?.as_str(), "B");
        assert_eq!(map.resolve("Descrição")?.as_str(), "G");
        assert_eq!(map.resolve("tipo")?.as_str(), "I");
        assert_eq!(map.last_letter().as_str(), "I");

        let organizers = ORGANIZERS.static_column_map();
        assert_eq!(organizers.resolve("Cor")?.as_str(), "D");
        Ok(())
    }

    #[test]
    fn test_unknown_column() {
        let map = TARGETS.static_column_map();
        assert_eq!(
            map.resolve("Nonexistent"),
            Err(AdapterError::unknown_column("Metas", "Nonexistent"))
        );
    }

    #[test]
    fn test_dynamic_map_follows_header() -> AdapterResult<()> {
        let map = ColumnMap::from_header("Metas", &header(&["Tag", "Mês", "", "Meta"]));
        assert_eq!(map.resolve("Mes")?.as_str(), "B");
        assert_eq!(map.resolve("Meta")?.as_str(), "D");
        assert_eq!(map.len(), 3);
        assert_eq!(map.width(), 4);
        Ok(())
    }

    #[test]
    fn test_dynamic_map_duplicate_keeps_last() -> AdapterResult<()> {
        let map = ColumnMap::from_header("Registro", &header(&["Tag", "Valor", "tag"]));
        assert_eq!(map.resolve("Tag")?.as_str(), "C");
        assert_eq!(map.len(), 2);
        Ok(())
    }

    #[test]
    fn test_layout_row() -> AdapterResult<()> {
        let map = TARGETS.static_column_map();
        let row = map.layout_row(&[
            ("Meta".to_string(), "500".to_string()),
            ("mes".to_string(), "2024-05".to_string()),
        ])?;
        assert_eq!(row, vec!["2024-05".to_string(), String::new(), "500".to_string()]);

        let err = map.layout_row(&[("Cor".to_string(), "#fff".to_string())]);
        assert!(matches!(err, Err(AdapterError::UnknownColumn { .. })));
        Ok(())
    }

    #[test]
    fn test_color_field() {
        assert!(ORGANIZERS.is_color_field("cor"));
        assert!(!ORGANIZERS.is_color_field("Tag"));
        assert!(!TRANSACTIONS.is_color_field("Cor"));
    }

    #[test]
    fn test_column_mapping_parse() {
        assert_eq!("dynamic".parse::<ColumnMapping>(), Ok(ColumnMapping::Dynamic));
        assert_eq!(" STATIC ".parse::<ColumnMapping>(), Ok(ColumnMapping::Static));
        assert!("sometimes".parse::<ColumnMapping>().is_err());
    }
}
