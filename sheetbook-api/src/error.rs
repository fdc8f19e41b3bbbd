//! Error Types for Sheetbook API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! Every error is serialized as `{success: false, code, message, error?}`
//! with the status code its `ErrorCode` maps to.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sheetbook_core::AdapterError;
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Required field is missing from request
    MissingField,

    /// Request contains invalid input data
    InvalidInput,

    /// Field name is not a column of the table
    UnknownColumn,

    /// Row number does not address a data row
    InvalidRowNumber,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// The spreadsheet store rejected or failed the call
    RemoteOperationFailed,

    /// Internal server error
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::MissingField
            | ErrorCode::InvalidInput
            | ErrorCode::UnknownColumn
            | ErrorCode::InvalidRowNumber => StatusCode::BAD_REQUEST,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::RemoteOperationFailed | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::UnknownColumn => "Unknown column",
            ErrorCode::InvalidRowNumber => "Invalid row number",
            ErrorCode::RemoteOperationFailed => "Failed to communicate with Google Sheets API",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Always false; lets clients branch on one field for every response.
    pub success: bool,

    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Underlying cause, for failures reported by the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            message: message.into(),
            error: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Attach the underlying cause.
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.error = Some(cause.into());
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create an UnknownColumn error.
    pub fn unknown_column(table: &str, field: &str) -> Self {
        Self::new(
            ErrorCode::UnknownColumn,
            format!("Column '{}' does not exist in {}", field, table),
        )
    }

    /// Create an InvalidRowNumber error.
    pub fn invalid_row_number(row: i64) -> Self {
        Self::new(
            ErrorCode::InvalidRowNumber,
            format!("ROW_NUMBER must be 2 or greater, got {}", row),
        )
    }

    /// Create a RemoteOperationFailed error carrying the store's message.
    pub fn remote(cause: impl Into<String>) -> Self {
        Self::from_code(ErrorCode::RemoteOperationFailed).with_cause(cause)
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a ServiceUnavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(cause) => write!(f, "{}: {} ({})", self.code, self.message, cause),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling in Axum.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Convert adapter failures, keeping validation errors at 400.
impl From<AdapterError> for ApiError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::MissingField { field } => ApiError::missing_field(&field),
            AdapterError::UnknownColumn { table, field } => ApiError::unknown_column(&table, &field),
            AdapterError::InvalidRowNumber { row } => ApiError::invalid_row_number(row),
            AdapterError::InvalidField { .. }
            | AdapterError::InvalidColumnLetters { .. }
            | AdapterError::InvalidColor { .. } => ApiError::invalid_input(err.to_string()),
            AdapterError::Remote { operation, reason } => {
                tracing::error!(operation = %operation, error = %reason, "Remote grid operation failed");
                ApiError::remote(reason)
            }
            AdapterError::Formatting { reason } => ApiError::internal_error(reason),
        }
    }
}

/// Malformed JSON bodies get the same error shape as everything else.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_input(rejection.body_text())
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::MissingField.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::UnknownColumn.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidRowNumber.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::RemoteOperationFailed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_adapter_error_conversion() {
        let err: ApiError = AdapterError::missing_field("Data").into();
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("Data"));

        let err: ApiError = AdapterError::unknown_column("Registro", "Nonexistent").into();
        assert_eq!(err.code, ErrorCode::UnknownColumn);
        assert!(err.message.contains("Nonexistent"));

        let err: ApiError = AdapterError::InvalidRowNumber { row: 1 }.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = AdapterError::remote("append", "PERMISSION_DENIED").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error.as_deref(), Some("PERMISSION_DENIED"));
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::missing_field("Data");
        let json = serde_json::to_value(&err)?;

        assert_eq!(json["success"], serde_json::json!(false));
        assert_eq!(json["code"], serde_json::json!("MISSING_FIELD"));
        assert!(json.get("error").is_none());

        let deserialized: ApiError = serde_json::from_value(json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::remote("Requested entity was not found.");
        let display = format!("{}", err);

        assert!(display.contains("RemoteOperationFailed"));
        assert!(display.contains("Requested entity was not found."));
    }
}
