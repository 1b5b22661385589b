use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// How ids are assigned to items submitted without one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// Lowercase hex SHA-256 of the stored document. Identical caption and tags share an id.
    #[default]
    ContentHash,
    /// Random UUID v4 per item.
    Random,
}

impl IdStrategy {
    pub fn derive(&self, document: &str) -> String {
        match self {
            IdStrategy::ContentHash => content_hash(document),
            IdStrategy::Random => Uuid::new_v4().to_string(),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "content_hash" | "hash" | "sha256" => Ok(IdStrategy::ContentHash),
            "random" | "uuid" => Ok(IdStrategy::Random),
            other => Err(format!(
                "unknown id strategy '{}', expected 'content_hash' or 'random'",
                other
            )),
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdStrategy::ContentHash => write!(f, "content_hash"),
            IdStrategy::Random => write!(f, "random"),
        }
    }
}

pub fn content_hash(document: &str) -> String {
    format!("{:x}", Sha256::digest(document.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::compose_document;

    #[test]
    fn test_content_hash_is_lowercase_hex_sha256() {
        let id = content_hash("abc");
        assert_eq!(
            id,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_identical_caption_and_tags_collide() {
        let tags = vec!["a".to_string(), "b".to_string()];
        let first = IdStrategy::ContentHash.derive(&compose_document("same", &tags));
        let second = IdStrategy::ContentHash.derive(&compose_document("same", &tags));
        assert_eq!(first, second);

        let other = IdStrategy::ContentHash.derive(&compose_document("same", &["b".to_string()]));
        assert_ne!(first, other);
    }

    #[test]
    fn test_random_strategy_never_collides() {
        let first = IdStrategy::Random.derive("same");
        let second = IdStrategy::Random.derive("same");
        assert_ne!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn test_parse() {
        assert_eq!("content_hash".parse::<IdStrategy>(), Ok(IdStrategy::ContentHash));
        assert_eq!("RANDOM".parse::<IdStrategy>(), Ok(IdStrategy::Random));
        assert!("sequential".parse::<IdStrategy>().is_err());
        assert_eq!(IdStrategy::default(), IdStrategy::ContentHash);
    }
}
