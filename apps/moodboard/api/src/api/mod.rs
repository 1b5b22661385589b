use axum::{Router, routing::get};

use crate::state::AppState;

pub mod health;
pub mod moodboard;

/// Moodboard routes, mounted at the root
pub fn routes(state: &AppState) -> Router {
    Router::new().merge(moodboard::router(state))
}

/// `/ready` with real store checks
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
