//! Centroid arithmetic and post-filtering for blend queries.

use std::collections::HashSet;

use crate::error::{MoodboardError, MoodboardResult};
use crate::models::SearchResponseItem;

/// Element-wise mean of the given vectors.
///
/// Fails on an empty input or when the vectors disagree on dimensionality.
pub fn centroid(vectors: &[Vec<f32>]) -> MoodboardResult<Vec<f32>> {
    let Some(first) = vectors.first() else {
        return Err(MoodboardError::Internal(
            "cannot compute centroid of zero vectors".to_string(),
        ));
    };

    let dimension = first.len();
    let mut sum = vec![0.0_f64; dimension];

    for vector in vectors {
        if vector.len() != dimension {
            return Err(MoodboardError::Internal(format!(
                "embedding dimension mismatch: expected {}, got {}",
                dimension,
                vector.len()
            )));
        }
        for (acc, value) in sum.iter_mut().zip(vector) {
            *acc += f64::from(*value);
        }
    }

    let count = vectors.len() as f64;
    Ok(sum.into_iter().map(|v| (v / count) as f32).collect())
}

/// Drop hits whose id was part of the blend input, then keep at most `k`.
pub fn exclude_and_truncate(
    hits: Vec<SearchResponseItem>,
    excluded: &HashSet<String>,
    k: usize,
) -> Vec<SearchResponseItem> {
    hits.into_iter()
        .filter(|hit| !excluded.contains(&hit.id))
        .take(k)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str) -> SearchResponseItem {
        SearchResponseItem {
            id: id.to_string(),
            image_url: String::new(),
            caption: String::new(),
            tags: Vec::new(),
            score: 1.0,
        }
    }

    #[test]
    fn test_centroid_of_two_vectors() {
        let c = centroid(&[vec![1.0, 0.0], vec![3.0, 0.0]]).unwrap();
        assert_eq!(c, vec![2.0, 0.0]);
    }

    #[test]
    fn test_centroid_of_single_vector_is_itself() {
        let c = centroid(&[vec![0.25, -1.5, 4.0]]).unwrap();
        assert_eq!(c, vec![0.25, -1.5, 4.0]);
    }

    #[test]
    fn test_centroid_rejects_dimension_mismatch() {
        let err = centroid(&[vec![1.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, MoodboardError::Internal(_)));
    }

    #[test]
    fn test_centroid_rejects_empty() {
        assert!(centroid(&[]).is_err());
    }

    #[test]
    fn test_exclude_and_truncate_preserves_order() {
        let hits = vec![hit("a"), hit("x"), hit("b"), hit("c"), hit("d")];
        let excluded: HashSet<String> = ["a".to_string()].into_iter().collect();

        let ids: Vec<String> = exclude_and_truncate(hits, &excluded, 2)
            .into_iter()
            .map(|h| h.id)
            .collect();
        assert_eq!(ids, vec!["x", "b"]);
    }

    #[test]
    fn test_exclude_may_return_fewer_than_k() {
        let hits = vec![hit("a"), hit("b")];
        let excluded: HashSet<String> = ["a".to_string(), "b".to_string()].into_iter().collect();
        assert!(exclude_and_truncate(hits, &excluded, 5).is_empty());
    }
}
