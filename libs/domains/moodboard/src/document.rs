//! Stored document template and the inverse mappings used when reading hits back.

use serde_json::Value;

use crate::store::Metadata;

/// Separator between the caption and the tag list in a stored document.
pub const TAGS_MARKER: &str = "\nTAGS:";

pub const IMAGE_URL_KEY: &str = "image_url";
pub const TAGS_CSV_KEY: &str = "tags_csv";
pub const TAGS_KEY: &str = "tags";

/// Compose the text that is embedded and stored for an item.
///
/// ```text
/// {caption}
/// TAGS: {tag1}, {tag2}
/// ```
pub fn compose_document(caption: &str, tags: &[String]) -> String {
    format!("{}{} {}", caption, TAGS_MARKER, tags.join(", "))
}

/// Recover the caption from a stored document: everything before the tag marker, trimmed.
pub fn caption_from_document(document: &str) -> String {
    document
        .split(TAGS_MARKER)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub fn tags_csv(tags: &[String]) -> String {
    tags.join(",")
}

/// Metadata persisted next to each vector.
///
/// Tags are kept twice: verbatim as an array for reading back, and flattened
/// into `tags_csv` for stores that only filter on scalar values.
pub fn metadata_for(image_url: &str, tags: &[String]) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(IMAGE_URL_KEY.to_string(), Value::String(image_url.to_string()));
    metadata.insert(
        TAGS_KEY.to_string(),
        Value::Array(tags.iter().cloned().map(Value::String).collect()),
    );
    metadata.insert(TAGS_CSV_KEY.to_string(), Value::String(tags_csv(tags)));
    metadata
}

pub fn image_url_from(metadata: Option<&Metadata>) -> String {
    metadata
        .and_then(|m| m.get(IMAGE_URL_KEY))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Tags from metadata. A structured `tags` array wins over `tags_csv`.
pub fn recover_tags(metadata: Option<&Metadata>) -> Vec<String> {
    let Some(metadata) = metadata else {
        return Vec::new();
    };

    if let Some(Value::Array(values)) = metadata.get(TAGS_KEY) {
        return values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }

    match metadata.get(TAGS_CSV_KEY).and_then(Value::as_str) {
        Some(csv) => csv
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

/// Map a distance (smaller is closer) to a similarity score in `(0, 1]`.
pub fn score_from_distance(distance: f32) -> f32 {
    1.0 / (1.0 + distance.max(0.0))
}
