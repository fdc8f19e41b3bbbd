//! Sheetbook Telemetry
//!
//! Structured logging for the API layer: subscriber setup and a
//! per-request middleware.

pub mod middleware;
pub mod tracer;

pub use middleware::observability_middleware;
pub use tracer::{init_tracing, LogFormat, TelemetryConfig};
