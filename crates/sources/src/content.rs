//! Content-based recommendations: "songs that sound like this one".
//!
//! ## Algorithm
//! 1. Resolve the seed song (missing seed is `ItemNotFound`)
//! 2. Score every other catalog song against it with `SimilarityScorer`
//! 3. Keep scores at or above the similarity threshold
//! 4. Stable sort descending (ties keep catalog order), truncate

use crate::error::Result;
use crate::explain::content_explanation;
use crate::smoothing::sort_by_score;
use crate::types::{RecommendationResult, ScoreKind};
use catalog::CatalogStore;
use scoring::{FeatureCache, SimilarityScorer};
use std::sync::Arc;
use tracing::{debug, instrument};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Ranks catalog songs by audio similarity to a seed song.
#[derive(Clone)]
pub struct ContentRecommender {
    catalog: Arc<dyn CatalogStore>,
    scorer: SimilarityScorer,

    /// Minimum similarity for a song to be returned
    similarity_threshold: f64,
}

impl ContentRecommender {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog,
            scorer: SimilarityScorer::new(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Configure the similarity threshold (default: 0.7)
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Up to `limit` songs similar to `seed_id`, best first.
    #[instrument(skip(self), fields(threshold = self.similarity_threshold))]
    pub fn recommend(&self, seed_id: &str, limit: usize) -> Result<Vec<RecommendationResult>> {
        let seed = self.catalog.get_by_id(seed_id)?;
        let candidates = self.catalog.get_all()?;
        debug!("Scoring {} catalog songs against seed {}", candidates.len(), seed.id);

        let mut cache = FeatureCache::new();
        let mut results: Vec<RecommendationResult> = Vec::new();
        for song in candidates {
            if song.id == seed.id {
                continue;
            }
            let score = self.scorer.score(&seed, &song, &mut cache);
            if score >= self.similarity_threshold {
                let explanation = content_explanation(&seed, &song, score);
                results.push(
                    RecommendationResult::new(song, score, ScoreKind::Content)
                        .with_explanation(explanation),
                );
            }
        }

        sort_by_score(&mut results);
        results.truncate(limit);

        debug!("Generated {} content recommendations", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecommendError;
    use catalog::{AudioFeatures, CatalogIndex, MockCatalogStore, Song, StoreError};

    fn song(id: &str, artist: &str, genre: &str, danceability: f64, energy: f64) -> Song {
        Song {
            id: id.to_string(),
            title: format!("Song {}", id),
            artist: artist.to_string(),
            album: String::new(),
            genre: genre.to_string(),
            popularity: 60,
            duration_ms: 200_000,
            features: AudioFeatures {
                danceability,
                energy,
                key: 0,
                loudness: -60.0,
                mode: 0,
                speechiness: 0.0,
                acousticness: 0.0,
                instrumentalness: 0.0,
                liveness: 0.0,
                valence: 0.0,
                tempo: 0.0,
                time_signature: 0,
            },
        }
    }

    fn create_test_index() -> CatalogIndex {
        let mut index = CatalogIndex::new();
        // seed S and a twin C1 by another artist
        index.insert_song(song("S", "A", "pop", 0.8, 0.7));
        index.insert_song(song("C1", "B", "pop", 0.8, 0.7));
        // C2 points somewhere else in feature space
        index.insert_song(song("C2", "C", "metal", 0.0, 0.9));
        index.insert_song(song("C3", "D", "pop", 0.8, 0.7));
        index
    }

    #[test]
    fn test_twin_ranks_above_dissimilar_song() {
        let recommender =
            ContentRecommender::new(Arc::new(create_test_index())).with_similarity_threshold(0.0);
        let results = recommender.recommend("S", 10).unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.song.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&"S"));

        let c1 = results.iter().position(|r| r.song.id == "C1").unwrap();
        let c2 = results.iter().position(|r| r.song.id == "C2").unwrap();
        assert!(c1 < c2);
        assert!(results[c1].score > 0.6);
        assert_eq!(results[c1].kind, ScoreKind::Content);
        assert!(results[c1].explanation.as_deref().unwrap().contains("Same genre: pop"));
    }

    #[test]
    fn test_threshold_and_ordering() {
        let recommender = ContentRecommender::new(Arc::new(create_test_index()));
        let results = recommender.recommend("S", 10).unwrap();

        // equal scores keep catalog order
        let ids: Vec<&str> = results.iter().map(|r| r.song.id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C3"]);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for r in &results {
            assert!(r.score >= 0.7);
        }
    }

    #[test]
    fn test_truncates_to_limit() {
        let recommender =
            ContentRecommender::new(Arc::new(create_test_index())).with_similarity_threshold(0.0);
        assert_eq!(recommender.recommend("S", 1).unwrap().len(), 1);
        assert!(recommender.recommend("S", 0).unwrap().is_empty());
    }

    #[test]
    fn test_missing_seed() {
        let recommender = ContentRecommender::new(Arc::new(create_test_index()));
        assert_eq!(
            recommender.recommend("nope", 5).unwrap_err(),
            RecommendError::ItemNotFound("nope".to_string())
        );
    }

    #[test]
    fn test_is_deterministic() {
        let recommender =
            ContentRecommender::new(Arc::new(create_test_index())).with_similarity_threshold(0.0);
        let first = recommender.recommend("S", 10).unwrap();
        let second = recommender.recommend("S", 10).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_catalog_failure_propagates() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_get_by_id()
            .returning(|id| Ok(song(id, "A", "pop", 0.5, 0.5)));
        catalog
            .expect_get_all()
            .returning(|| Err(StoreError::Unavailable("scan failed".to_string())));

        let recommender = ContentRecommender::new(Arc::new(catalog));
        assert_eq!(
            recommender.recommend("S", 5).unwrap_err(),
            RecommendError::Upstream("scan failed".to_string())
        );
    }
}
