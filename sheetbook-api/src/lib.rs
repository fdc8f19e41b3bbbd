//! Sheetbook API - REST Layer over a Google Sheets Workbook
//!
//! Exposes the browser client's record endpoints (Axum) and proxies them
//! onto three sheets of one spreadsheet through a service account.
//!
//! The record translation itself lives in `sheetbook-core`; this crate
//! adds HTTP, the Sheets client, configuration and logging.

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod sheets;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, SheetsConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use services::{TableService, WriteOutcome};
pub use sheets::{SheetsClient, SheetsError};
pub use types::*;
