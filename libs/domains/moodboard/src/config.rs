use core_config::{ConfigError, FromEnv, env_flag, env_optional, env_or_default};

use crate::ids::IdStrategy;
use crate::store::QdrantConfig;

pub const DEFAULT_COLLECTION: &str = "items";

/// Storage and behavior settings for the moodboard domain
#[derive(Debug, Clone)]
pub struct MoodboardConfig {
    pub collection: String,
    pub qdrant: QdrantConfig,
    pub id_strategy: IdStrategy,
    pub blend_overfetch: bool,
}

impl Default for MoodboardConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            qdrant: QdrantConfig::default(),
            id_strategy: IdStrategy::default(),
            blend_overfetch: true,
        }
    }
}

impl FromEnv for MoodboardConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let id_strategy = match env_optional("ID_STRATEGY") {
            Some(raw) => raw.parse().map_err(|details| ConfigError::ParseError {
                key: "ID_STRATEGY".to_string(),
                details,
            })?,
            None => IdStrategy::default(),
        };

        Ok(Self {
            collection: env_or_default("COLLECTION_NAME", DEFAULT_COLLECTION),
            qdrant: QdrantConfig::from_env()?,
            id_strategy,
            blend_overfetch: env_flag("BLEND_OVERFETCH", true)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 6] = [
        "COLLECTION_NAME",
        "QDRANT_URL",
        "QDRANT_API_KEY",
        "QDRANT_TIMEOUT_SECS",
        "ID_STRATEGY",
        "BLEND_OVERFETCH",
    ];

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(VARS, || {
            let config = MoodboardConfig::from_env().unwrap();
            assert_eq!(config.collection, "items");
            assert_eq!(config.qdrant.url, "http://localhost:6334");
            assert_eq!(config.qdrant.api_key, None);
            assert_eq!(config.id_strategy, IdStrategy::ContentHash);
            assert!(config.blend_overfetch);
        });
    }

    #[test]
    fn test_overrides() {
        temp_env::with_vars(
            [
                ("COLLECTION_NAME", Some("boards")),
                ("QDRANT_URL", Some("http://qdrant:6334")),
                ("QDRANT_API_KEY", Some("secret")),
                ("QDRANT_TIMEOUT_SECS", None),
                ("ID_STRATEGY", Some("random")),
                ("BLEND_OVERFETCH", Some("false")),
            ],
            || {
                let config = MoodboardConfig::from_env().unwrap();
                assert_eq!(config.collection, "boards");
                assert_eq!(config.qdrant.url, "http://qdrant:6334");
                assert_eq!(config.qdrant.api_key.as_deref(), Some("secret"));
                assert_eq!(config.id_strategy, IdStrategy::Random);
                assert!(!config.blend_overfetch);
            },
        );
    }

    #[test]
    fn test_invalid_id_strategy() {
        temp_env::with_var("ID_STRATEGY", Some("sequential"), || {
            let err = MoodboardConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("ID_STRATEGY"));
        });
    }

    #[test]
    fn test_default_matches_unset_env() {
        temp_env::with_vars_unset(VARS, || {
            let from_env = MoodboardConfig::from_env().unwrap();
            let default = MoodboardConfig::default();
            assert_eq!(from_env.collection, default.collection);
            assert_eq!(from_env.qdrant.url, default.qdrant.url);
            assert_eq!(from_env.qdrant.timeout_secs, default.qdrant.timeout_secs);
        });
    }
}
