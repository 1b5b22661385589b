//! Readiness handler backed by a real vector store round trip.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::{HealthCheckFuture, run_health_checks};

use crate::state::AppState;

/// Reports `200` when the vector store answers, `503` otherwise.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let store = state.service.store();
    let check_name = format!("vector_store:{}", store.backend());

    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        check_name.as_str(),
        Box::pin(async {
            store
                .ensure_collection()
                .await
                .map_err(|e| format!("Vector store check failed: {}", e))
        }),
    )];

    run_health_checks(state.config.app, checks).await.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{AppInfo, server::ServerConfig};
    use domain_moodboard::{
        EmbeddingModel, EmbeddingProvider, MemoryStore, MoodboardConfig, MoodboardService,
        OpenAIConfig, OpenAIProvider,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state() -> AppState {
        let openai = OpenAIConfig::new("sk-test".to_string());
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAIProvider::new(openai.clone()));
        assert_eq!(embedder.model(), EmbeddingModel::TextEmbedding3Small);

        AppState {
            config: Config {
                app: AppInfo {
                    name: "moodboard_api",
                    version: "0.0.0",
                },
                server: ServerConfig::default(),
                environment: Environment::Development,
                openai,
                moodboard: MoodboardConfig::default(),
            },
            service: MoodboardService::new(Arc::new(MemoryStore::new("items")), embedder),
        }
    }

    #[tokio::test]
    async fn test_ready_reports_store() {
        let app = crate::api::ready_router(state());

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["name"], "moodboard_api");
        assert_eq!(body["services"]["vector_store:memory"], "connected");
    }
}
