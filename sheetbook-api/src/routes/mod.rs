//! REST API Routes Module
//!
//! Includes:
//! - Record routes under /api/* (read all, add/update/delete per table)
//! - Health check endpoints under /health/*
//! - CORS support for the browser client

pub mod health;
pub mod records;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::services::TableService;
use crate::telemetry::observability_middleware;

pub use health::create_router as health_router;
pub use records::create_router as records_router;

/// Create the complete API router.
///
/// # Middleware Order (outer to inner)
/// 1. CORS (outermost) - handles preflight requests
/// 2. Observability - request span and completion log
///
/// Fails when the configuration is not acceptable for the environment.
pub fn create_api_router(service: TableService, api_config: &ApiConfig) -> ApiResult<Router> {
    api_config.validate()?;

    let store = service.store().clone();
    let router = Router::new()
        .nest("/api", records::create_router(service))
        .nest("/health", health::create_router(store));

    let cors = build_cors_layer(api_config);

    Ok(router.layer(from_fn(observability_middleware)).layer(cors))
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins every origin is allowed. Otherwise only the
/// listed origins (wildcard subdomains included) are.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        return cors.allow_origin(Any);
    }

    tracing::info!("CORS: allowing origins: {:?}", config.cors_origins);
    if config.cors_origins.iter().any(|o| o.starts_with("*.")) {
        let config = config.clone();
        cors.allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &HeaderValue, _| {
                origin
                    .to_str()
                    .map(|o| config.is_origin_allowed(o))
                    .unwrap_or(false)
            },
        ))
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}
