use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoodboardError {
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type MoodboardResult<T> = Result<T, MoodboardError>;

impl From<qdrant_client::QdrantError> for MoodboardError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        MoodboardError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for MoodboardError {
    fn from(err: reqwest::Error) -> Self {
        MoodboardError::Embedding(err.to_string())
    }
}

/// Upstream failures keep their message so callers can see what broke.
impl From<MoodboardError> for AppError {
    fn from(err: MoodboardError) -> Self {
        match err {
            MoodboardError::NotFound(msg) => AppError::NotFound(msg),
            MoodboardError::Validation(msg) => AppError::BadRequest(msg),
            err @ (MoodboardError::Embedding(_)
            | MoodboardError::Store(_)
            | MoodboardError::Internal(_)) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl IntoResponse for MoodboardError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (MoodboardError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (MoodboardError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (MoodboardError::Embedding("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (MoodboardError::Store("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (MoodboardError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_upstream_message_is_preserved() {
        let app: AppError = MoodboardError::Store("connection refused".into()).into();
        assert!(app.to_string().contains("Vector store error: connection refused"));
    }
}
