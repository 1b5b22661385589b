use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use domain_moodboard::{MoodboardConfig, OpenAIConfig};

pub use core_config::Environment;

/// Application configuration, composed from the shared config pieces
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub openai: OpenAIConfig,
    pub moodboard: MoodboardConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8080
        let openai = OpenAIConfig::from_env()?; // OPENAI_API_KEY is required
        let moodboard = MoodboardConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            openai,
            moodboard,
        })
    }
}
