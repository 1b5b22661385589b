//! # Axum Helpers
//!
//! Shared HTTP plumbing for the workspace's Axum services.
//!
//! - **[`errors`]**: `AppError` and the standard JSON error body with error codes
//! - **[`extractors`]**: `ValidatedJson` (serde + validator)
//! - **[`server`]**: router assembly with OpenAPI docs, readiness checks, graceful shutdown

pub mod errors;
pub mod extractors;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::ValidatedJson;
pub use server::{HealthCheckFuture, create_app, create_router, run_health_checks, shutdown_signal};
