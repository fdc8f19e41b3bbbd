//! Grid-to-record mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::FIRST_DATA_ROW;
use crate::header::normalize_field_name;

/// Rows of cell values as returned by the store. Row 0 is the header.
pub type Grid = Vec<Vec<String>>;

/// Name of the synthetic row-position field.
pub const ROW_NUMBER_FIELD: &str = "ROW_NUMBER";

/// One data row keyed by header name.
///
/// `row_number` is the 1-based sheet row (the header is row 1). It is only
/// valid until a row above it is deleted; clients must refetch after a
/// delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "ROW_NUMBER")]
    pub row_number: u32,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl Record {
    /// Field value by name, using the same matching rules as column
    /// resolution.
    pub fn get(&self, field: &str) -> Option<&str> {
        let wanted = normalize_field_name(field);
        self.fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&wanted))
            .map(|(_, value)| value.as_str())
    }

    /// Replace the value of an existing field. Returns false if absent.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        let wanted = normalize_field_name(field);
        match self
            .fields
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&wanted))
        {
            Some((_, slot)) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }
}

/// Map a grid into records.
///
/// An empty grid yields no records. Every record carries every header
/// field; cells missing from a short row become empty strings and cells
/// beyond the header are dropped. Header names are normalized, blank ones
/// are skipped, and names that match case-insensitively keep the
/// right-most cell, the same rule [`crate::ColumnMap::from_header`] uses.
pub fn records_from_grid(grid: &[Vec<String>]) -> Vec<Record> {
    let Some((header, rows)) = grid.split_first() else {
        return Vec::new();
    };

    let mut columns: Vec<(usize, String)> = Vec::with_capacity(header.len());
    for (position, cell) in header.iter().enumerate() {
        let name = normalize_field_name(cell);
        if name.is_empty() {
            continue;
        }
        columns.retain(|(_, existing)| !existing.eq_ignore_ascii_case(&name));
        columns.push((position, name));
    }

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let fields = columns
                .iter()
                .map(|(j, name)| (name.clone(), row.get(*j).cloned().unwrap_or_default()))
                .collect();
            Record {
                row_number: i as u32 + FIRST_DATA_ROW,
                fields,
            }
        })
        .collect()
}
