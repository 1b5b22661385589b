use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!(
        model = %config.openai.model,
        id_strategy = %config.moodboard.id_strategy,
        blend_overfetch = config.moodboard.blend_overfetch,
        "Starting {} v{}",
        config.app.name,
        config.app.version
    );

    let state = AppState::build(config).await?;

    // - moodboard endpoints, including /health which touches the store
    // - /ready: readiness check through run_health_checks
    let api_routes = api::routes(&state).merge(api::ready_router(state.clone()));

    // create_router adds docs/middleware to the composed routes
    let app = axum_helpers::create_router::<openapi::ApiDoc>(api_routes)?;

    axum_helpers::create_app(app, &state.config.server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Moodboard API shutdown complete");
    Ok(())
}
