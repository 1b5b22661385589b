use axum::{Json, http::StatusCode};
use core_config::AppInfo;
use futures::future::join_all;
use serde_json::{Map, Value, json};
use std::future::Future;
use std::pin::Pin;

/// A boxed future for health checks with a string error
pub type HealthCheckFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Runs the named checks concurrently and aggregates them into one readiness body.
///
/// Returns `200` when every check passed, `503` otherwise. The body always
/// lists each check as `"connected"` or `"disconnected"` next to the app
/// name and version.
///
/// ```ignore
/// let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
///     ("vector_store", Box::pin(async { store.ping().await.map_err(|e| e.to_string()) })),
/// ];
/// let (status, body) = run_health_checks(app_info!(), checks).await;
/// ```
pub async fn run_health_checks(
    app: AppInfo,
    checks: Vec<(&str, HealthCheckFuture<'_>)>,
) -> (StatusCode, Json<Value>) {
    let names: Vec<_> = checks.iter().map(|(name, _)| *name).collect();
    let futures: Vec<_> = checks.into_iter().map(|(_, check)| check).collect();
    let results = join_all(futures).await;

    let mut services = Map::new();
    let mut all_healthy = true;

    for (name, result) in names.into_iter().zip(results) {
        match result {
            Ok(_) => {
                services.insert(name.to_string(), json!("connected"));
            }
            Err(e) => {
                tracing::error!(check = name, error = %e, "Readiness check failed");
                services.insert(name.to_string(), json!("disconnected"));
                all_healthy = false;
            }
        }
    }

    let body = json!({
        "status": if all_healthy { "ready" } else { "not ready" },
        "name": app.name,
        "version": app.version,
        "services": services,
    });

    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(body))
}
