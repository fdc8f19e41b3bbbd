//! Error types for adapter operations

use thiserror::Error;

/// Errors raised while translating between records and grid operations.
///
/// Validation variants (`MissingField`, `InvalidField`, `UnknownColumn`,
/// `InvalidRowNumber`, `InvalidColumnLetters`, `InvalidColor`) are detected
/// before any write reaches the store. `Remote` wraps a failure reported by
/// the backing store. `Formatting` is the best-effort background write
/// failing; callers log it and carry on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Unknown column '{field}' for table {table}")]
    UnknownColumn { table: String, field: String },

    #[error("Invalid row number {row}: data rows start at 2")]
    InvalidRowNumber { row: i64 },

    #[error("Invalid column letters '{letters}'")]
    InvalidColumnLetters { letters: String },

    #[error("Invalid color '{value}': expected #rrggbb")]
    InvalidColor { value: String },

    #[error("Remote {operation} failed: {reason}")]
    Remote { operation: String, reason: String },

    #[error("Background formatting failed: {reason}")]
    Formatting { reason: String },
}

impl AdapterError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn unknown_column(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            field: field.into(),
        }
    }

    pub fn remote(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Remote {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// True for errors the caller can fix by changing the request.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AdapterError::MissingField { .. }
                | AdapterError::InvalidField { .. }
                | AdapterError::UnknownColumn { .. }
                | AdapterError::InvalidRowNumber { .. }
                | AdapterError::InvalidColumnLetters { .. }
                | AdapterError::InvalidColor { .. }
        )
    }
}

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;
