use axum::Router;
use domain_moodboard::handlers;

pub fn router(state: &crate::state::AppState) -> Router {
    handlers::router(state.service.clone())
}
