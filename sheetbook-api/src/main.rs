//! Sheetbook API Server Entry Point
//!
//! Loads configuration, authenticates against the spreadsheet and starts
//! the Axum HTTP server. Any failure before the listener is bound stops
//! the process.

use std::net::SocketAddr;
use std::sync::Arc;

use sheetbook_api::telemetry::{init_tracing, TelemetryConfig};
use sheetbook_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, SheetsClient, SheetsConfig, TableService,
};
use sheetbook_core::GridStore;

#[tokio::main]
async fn main() -> ApiResult<()> {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenvy::dotenv();

    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let sheets_config = SheetsConfig::from_env()?;
    let api_config = ApiConfig::from_env()?;
    tracing::debug!(?sheets_config, "Loaded configuration");

    let client = SheetsClient::new(&sheets_config)
        .map_err(|e| ApiError::internal_error(format!("Failed to create Sheets client: {}", e)))?;
    let store: Arc<dyn GridStore> = Arc::new(client);

    match store.describe().await {
        Ok(title) => tracing::info!(spreadsheet = %title, "Spreadsheet loaded and authenticated"),
        Err(e) => {
            tracing::error!(error = %e, "Spreadsheet authentication failed, check the credentials and sharing");
            return Err(ApiError::service_unavailable(format!(
                "Sheets API authentication failed: {}",
                e
            )));
        }
    }

    let service = TableService::new(store, sheets_config.column_mapping);
    let app = create_api_router(service, &api_config)?;

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, column_mapping = ?sheets_config.column_mapping, "Starting Sheetbook API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("SHEETBOOK_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
