//! Request payloads for add, update and delete operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::address::validate_row_number;
use crate::error::{AdapterError, AdapterResult};
use crate::header::{field_names_match, normalize_field_name};
use crate::record::ROW_NUMBER_FIELD;
use crate::schema::{ColumnMap, TableSchema};

/// Render a JSON value as cell text. `None` for null.
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parse a `ROW_NUMBER` sent as a JSON number or a numeric string.
pub fn parse_row_number(value: Option<&Value>) -> AdapterResult<u32> {
    let invalid = |reason: &str| AdapterError::InvalidField {
        field: ROW_NUMBER_FIELD.to_string(),
        reason: reason.to_string(),
    };

    let row = match value {
        None | Some(Value::Null) => return Err(AdapterError::missing_field(ROW_NUMBER_FIELD)),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| invalid("expected an integer"))?,
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(AdapterError::missing_field(ROW_NUMBER_FIELD))
        }
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid("expected an integer"))?,
        Some(_) => return Err(invalid("expected an integer")),
    };
    validate_row_number(row)
}

// ============================================================================
// ADD
// ============================================================================

/// Body of an add request: field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewRecord(pub Map<String, Value>);

impl NewRecord {
    /// Check required fields against the table's canonical schema.
    ///
    /// Needs no column map, so it runs before anything touches the store.
    pub fn check_required(&self, schema: &TableSchema) -> AdapterResult<()> {
        for required in schema.required_fields() {
            let present = self.0.iter().any(|(name, value)| {
                field_names_match(name, required)
                    && cell_text(value).is_some_and(|text| !text.trim().is_empty())
            });
            if !present {
                return Err(AdapterError::missing_field(*required));
            }
        }
        Ok(())
    }

    /// Resolve every field against `map`, returning `(header name, text)`
    /// pairs in request order.
    ///
    /// Null values are skipped. A `ROW_NUMBER` key is ignored since the store
    /// picks the row on append.
    pub fn resolve(&self, map: &ColumnMap) -> AdapterResult<Vec<(String, String)>> {
        let mut resolved = Vec::with_capacity(self.0.len());
        for (name, value) in &self.0 {
            if normalize_field_name(name).eq_ignore_ascii_case(ROW_NUMBER_FIELD) {
                continue;
            }
            let Some(text) = cell_text(value) else {
                continue;
            };
            let canonical = map
                .canonical_name(name)
                .ok_or_else(|| AdapterError::unknown_column(map.table(), name.as_str()))?;
            resolved.push((canonical.to_string(), text));
        }
        Ok(resolved)
    }
}

// ============================================================================
// UPDATE
// ============================================================================

/// Body of an update request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    #[serde(rename = "ROW_NUMBER", default)]
    pub row_number: Option<Value>,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

/// An update request that passed presence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub row_number: u32,
    pub column: String,
    pub value: String,
}

impl UpdateRequest {
    /// An empty string `value` is allowed and clears the cell.
    pub fn validate(&self) -> AdapterResult<CellUpdate> {
        let row_number = parse_row_number(self.row_number.as_ref())?;
        let column = self
            .column
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AdapterError::missing_field("column"))?;
        let value = self
            .value
            .as_ref()
            .and_then(cell_text)
            .ok_or_else(|| AdapterError::missing_field("value"))?;

        Ok(CellUpdate {
            row_number,
            column: column.to_string(),
            value,
        })
    }
}

// ============================================================================
// DELETE
// ============================================================================

/// Body of a delete request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    #[serde(rename = "ROW_NUMBER", default)]
    pub row_number: Option<Value>,
}

impl DeleteRequest {
    pub fn validate(&self) -> AdapterResult<u32> {
        parse_row_number(self.row_number.as_ref())
    }
}
