//! Helpers shared by the route test suites.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sheetbook_api::{create_api_router, ApiConfig, ApiError, ApiResult, TableService};
use sheetbook_core::ColumnMapping;
use sheetbook_test_utils::InMemoryGridStore;
use std::sync::Arc;
use tower::ServiceExt;

/// Full router over `store`, with development CORS settings.
pub fn test_app(store: &InMemoryGridStore, mapping: ColumnMapping) -> ApiResult<Router> {
    let service = TableService::new(Arc::new(store.clone()), mapping);
    create_api_router(service, &ApiConfig::default())
}

/// Send one request and decode the JSON body (`Value::Null` when empty).
pub async fn call(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> ApiResult<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .map_err(|e| ApiError::internal_error(format!("Failed to build request: {}", e)))?;

    raw(app, request).await
}

/// Send a prepared request.
pub async fn raw(app: Router, request: Request<Body>) -> ApiResult<(StatusCode, Value)> {
    let response = app
        .oneshot(request)
        .await
        .map_err(|e| ApiError::internal_error(format!("Request failed: {:?}", e)))?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to read body: {:?}", e)))?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}
