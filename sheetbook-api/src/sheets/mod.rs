//! Google Sheets Grid Store
//!
//! `SheetsClient` implements [`GridStore`] over the Sheets v4 REST API
//! with a service account. Read requests are retried with exponential
//! backoff on transient failures; writes are sent exactly once.

pub mod auth;
pub mod wire;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sheetbook_core::{AdapterError, AdapterResult, CellAddress, Grid, GridStore, RgbColor};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::SheetsConfig;
use auth::TokenProvider;
use wire::{background_request, delete_row_request, error_message, Spreadsheet, ValueRange, ValueRangeBody};

// ============================================================================
// ERRORS
// ============================================================================

/// Failures talking to Google.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("sheet '{0}' not found in spreadsheet")]
    SheetNotFound(String),
}

impl SheetsError {
    /// Worth retrying: timeouts, connection failures, 429 and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            SheetsError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            SheetsError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    fn into_adapter(self, operation: &str) -> AdapterError {
        AdapterError::remote(operation, self.to_string())
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// Authenticated Sheets client bound to one spreadsheet.
pub struct SheetsClient {
    http: reqwest::Client,
    auth: TokenProvider,
    spreadsheet_id: String,
    base_url: String,
    max_read_attempts: u32,
    retry_base_delay: Duration,
    sheet_ids: RwLock<HashMap<String, i64>>,
}

impl SheetsClient {
    pub fn new(config: &SheetsConfig) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let auth = TokenProvider::new(
            config.service_account_email.clone(),
            &config.private_key,
            config.token_uri.clone(),
        )?;

        Ok(Self {
            http,
            auth,
            spreadsheet_id: config.spreadsheet_id.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_read_attempts: config.max_read_attempts.max(1),
            retry_base_delay: config.retry_base_delay,
            sheet_ids: RwLock::new(HashMap::new()),
        })
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/{}", self.base_url, self.spreadsheet_id)
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/values/{}{}",
            self.spreadsheet_url(),
            urlencoding::encode(range),
            suffix
        )
    }

    /// Send one request and decode a JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<T, SheetsError> {
        let token = self.auth.access_token(&self.http).await?;
        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(token.expose_secret())
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(method = %method, url = %url, "Sheets API request");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                self.auth.invalidate().await;
            }
            return Err(SheetsError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| SheetsError::Decode(e.to_string()))
    }

    /// GET with bounded exponential backoff on transient failures.
    async fn get<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> AdapterResult<T> {
        let mut delay = self.retry_base_delay;

        for attempt in 1..=self.max_read_attempts {
            match self.send(Method::GET, url, query, None).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_read_attempts => {
                    tracing::warn!(
                        operation = operation,
                        attempt = attempt,
                        error = %e,
                        "Sheets read failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(e.into_adapter(operation)),
            }
        }

        Err(AdapterError::remote(
            operation,
            format!("failed after {} attempts", self.max_read_attempts),
        ))
    }

    /// Non-GET request, sent once.
    async fn write(
        &self,
        operation: &str,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Value,
    ) -> AdapterResult<Value> {
        self.send(method, url, query, Some(&body))
            .await
            .map_err(|e| e.into_adapter(operation))
    }

    /// Numeric id of a sheet, needed by batch updates. Cached per title.
    async fn sheet_id(&self, title: &str) -> AdapterResult<i64> {
        if let Some(id) = self.sheet_ids.read().await.get(title) {
            return Ok(*id);
        }

        let spreadsheet: Spreadsheet = self
            .get(
                "sheet_metadata",
                &self.spreadsheet_url(),
                &[("fields", "sheets.properties(sheetId,title)")],
            )
            .await?;

        let mut ids = self.sheet_ids.write().await;
        for sheet in spreadsheet.sheets {
            if let Some(props) = sheet.properties {
                ids.insert(props.title, props.sheet_id);
            }
        }
        ids.get(title)
            .copied()
            .ok_or_else(|| SheetsError::SheetNotFound(title.to_string()).into_adapter("sheet_metadata"))
    }

    async fn batch_update(&self, operation: &str, body: Value) -> AdapterResult<Value> {
        let url = format!("{}:batchUpdate", self.spreadsheet_url());
        self.write(operation, Method::POST, &url, &[], body).await
    }
}

#[async_trait]
impl GridStore for SheetsClient {
    async fn read_range(&self, range: &str) -> AdapterResult<Grid> {
        let values: ValueRange = self.get("read_range", &self.values_url(range, ""), &[]).await?;
        Ok(values.into_grid())
    }

    async fn append_row(&self, range: &str, row: Vec<String>) -> AdapterResult<Value> {
        let body = serde_json::to_value(ValueRangeBody::single_row(range, row))
            .map_err(|e| AdapterError::remote("append_row", e.to_string()))?;
        self.write(
            "append_row",
            Method::POST,
            &self.values_url(range, ":append"),
            &[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ],
            body,
        )
        .await
    }

    async fn write_cell(&self, address: &CellAddress, value: &str) -> AdapterResult<Value> {
        let range = address.to_string();
        let body = serde_json::to_value(ValueRangeBody::single_row(
            range.clone(),
            vec![value.to_string()],
        ))
        .map_err(|e| AdapterError::remote("write_cell", e.to_string()))?;
        self.write(
            "write_cell",
            Method::PUT,
            &self.values_url(&range, ""),
            &[("valueInputOption", "USER_ENTERED")],
            body,
        )
        .await
    }

    async fn delete_row(&self, sheet: &str, row_number: u32) -> AdapterResult<Value> {
        let sheet_id = self.sheet_id(sheet).await?;
        self.batch_update("delete_row", delete_row_request(sheet_id, row_number))
            .await
    }

    async fn set_background(
        &self,
        sheet: &str,
        row_number: u32,
        column: u32,
        color: RgbColor,
    ) -> AdapterResult<()> {
        let sheet_id = self.sheet_id(sheet).await?;
        self.batch_update(
            "set_background",
            background_request(sheet_id, row_number, column, Some(color)),
        )
        .await
        .map(|_| ())
    }

    async fn clear_background(
        &self,
        sheet: &str,
        row_number: u32,
        column: u32,
    ) -> AdapterResult<()> {
        let sheet_id = self.sheet_id(sheet).await?;
        self.batch_update(
            "clear_background",
            background_request(sheet_id, row_number, column, None),
        )
        .await
        .map(|_| ())
    }

    async fn read_backgrounds(&self, range: &str) -> AdapterResult<Vec<Option<RgbColor>>> {
        let spreadsheet: Spreadsheet = self
            .get(
                "read_backgrounds",
                &self.spreadsheet_url(),
                &[
                    ("ranges", range),
                    (
                        "fields",
                        "sheets.data.rowData.values.userEnteredFormat.backgroundColor",
                    ),
                ],
            )
            .await?;
        Ok(spreadsheet.first_column_backgrounds())
    }

    async fn describe(&self) -> AdapterResult<String> {
        let spreadsheet: Spreadsheet = self
            .get("describe", &self.spreadsheet_url(), &[("fields", "properties.title")])
            .await?;
        Ok(spreadsheet.properties.map(|p| p.title).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let throttled = SheetsError::Status {
            status: 429,
            message: "Quota exceeded".to_string(),
        };
        let unavailable = SheetsError::Status {
            status: 503,
            message: "The service is currently unavailable.".to_string(),
        };
        let forbidden = SheetsError::Status {
            status: 403,
            message: "The caller does not have permission".to_string(),
        };
        assert!(throttled.is_transient());
        assert!(unavailable.is_transient());
        assert!(!forbidden.is_transient());
        assert!(!SheetsError::Auth("bad key".to_string()).is_transient());
    }

    #[test]
    fn test_remote_error_carries_google_message() {
        let err = SheetsError::Status {
            status: 400,
            message: "Unable to parse range: Registro!A:Q".to_string(),
        }
        .into_adapter("append_row");
        assert_eq!(
            err,
            AdapterError::remote("append_row", "Unable to parse range: Registro!A:Q")
        );
    }
}
