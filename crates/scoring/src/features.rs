//! Feature vectors for song comparison.
//!
//! A song's audio descriptors are normalized into a fixed 13-slot vector.
//! Vectors are never stored on the shared `Song`; each recommendation call
//! owns a `FeatureCache` and drops it when it returns.

use catalog::{Song, SongId};
use std::collections::HashMap;

/// Number of slots in a feature vector.
pub const FEATURE_DIMS: usize = 13;

/// Normalized audio features, in builder order.
pub type FeatureVector = [f64; FEATURE_DIMS];

/// Builds the normalized vector for one song.
///
/// Slot order: danceability, energy, key/11, (loudness+60)/60, mode,
/// speechiness, acousticness, instrumentalness, liveness, valence,
/// tempo/250, time_signature/7, (popularity/100)*0.5.
///
/// Out-of-range inputs are passed through unclamped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureVectorBuilder;

impl FeatureVectorBuilder {
    pub fn build(song: &Song) -> FeatureVector {
        let f = &song.features;
        [
            f.danceability,
            f.energy,
            f64::from(f.key) / 11.0,
            (f.loudness + 60.0) / 60.0,
            if f.mode == 0 { 0.0 } else { 1.0 },
            f.speechiness,
            f.acousticness,
            f.instrumentalness,
            f.liveness,
            f.valence,
            f.tempo / 250.0,
            f64::from(f.time_signature) / 7.0,
            (f64::from(song.popularity) / 100.0) * 0.5,
        ]
    }
}

/// Request-scoped memo of feature vectors keyed by song id.
#[derive(Debug, Default)]
pub struct FeatureCache {
    vectors: HashMap<SongId, FeatureVector>,
}

impl FeatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vector for `song`, built on first use.
    pub fn vector(&mut self, song: &Song) -> FeatureVector {
        if let Some(v) = self.vectors.get(&song.id) {
            return *v;
        }
        let v = FeatureVectorBuilder::build(song);
        self.vectors.insert(song.id.clone(), v);
        v
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::AudioFeatures;

    fn create_test_song() -> Song {
        Song {
            id: "s1".to_string(),
            title: "Test".to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            genre: "pop".to_string(),
            popularity: 80,
            duration_ms: 200_000,
            features: AudioFeatures {
                danceability: 0.8,
                energy: 0.7,
                key: 11,
                loudness: -6.0,
                mode: 1,
                speechiness: 0.05,
                acousticness: 0.1,
                instrumentalness: 0.0,
                liveness: 0.12,
                valence: 0.6,
                tempo: 125.0,
                time_signature: 4,
            },
        }
    }

    #[test]
    fn test_build_normalizes_in_order() {
        let v = FeatureVectorBuilder::build(&create_test_song());
        assert_eq!(v[0], 0.8);
        assert_eq!(v[1], 0.7);
        assert_eq!(v[2], 1.0);
        assert!((v[3] - 0.9).abs() < 1e-12);
        assert_eq!(v[4], 1.0);
        assert!((v[10] - 0.5).abs() < 1e-12);
        assert!((v[11] - 4.0 / 7.0).abs() < 1e-12);
        assert!((v[12] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_build_does_not_clamp() {
        let mut song = create_test_song();
        song.features.tempo = 500.0;
        song.features.loudness = 10.0;
        let v = FeatureVectorBuilder::build(&song);
        assert_eq!(v[10], 2.0);
        assert!(v[3] > 1.0);
    }

    #[test]
    fn test_cache_reuses_vectors() {
        let song = create_test_song();
        let mut cache = FeatureCache::new();
        assert!(cache.is_empty());

        let first = cache.vector(&song);
        let second = cache.vector(&song);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }
}
