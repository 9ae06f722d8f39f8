//! Pairwise song similarity.
//!
//! ## Algorithm
//! 1. Cosine similarity of the two feature vectors (0 if either norm is 0,
//!    in which case the whole score is 0)
//! 2. Diversity from tempo/energy/valence/danceability gaps plus flat
//!    genre and artist differences, capped at 1.0
//! 3. combined = 0.7 * cosine + 0.3 * diversity
//! 4. +0.15 for the same artist, +0.08 for the same non-empty genre
//! 5. Clamped to [0, 1]; a non-finite result becomes 0

use crate::features::FeatureCache;
use crate::math::{cosine_similarity, l2_norm};
use catalog::Song;
use tracing::trace;

const COSINE_WEIGHT: f64 = 0.7;
const DIVERSITY_WEIGHT: f64 = 0.3;

const SAME_ARTIST_BOOST: f64 = 0.15;
const SAME_GENRE_BOOST: f64 = 0.08;

const TEMPO_RANGE: f64 = 250.0;
const GENRE_DIFFERS_PENALTY: f64 = 0.3;
const ARTIST_DIFFERS_PENALTY: f64 = 0.2;

/// Scores two songs against each other.
///
/// Stateless; vectors come from the caller's request-scoped cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScorer;

impl SimilarityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Similarity of `a` and `b` in [0, 1].
    ///
    /// A song compared with itself (same id) scores exactly 1.0 unless its
    /// vector is zero.
    pub fn score(&self, a: &Song, b: &Song, cache: &mut FeatureCache) -> f64 {
        let va = cache.vector(a);
        let vb = cache.vector(b);

        if l2_norm(&va) == 0.0 || l2_norm(&vb) == 0.0 {
            return 0.0;
        }
        if a.id == b.id {
            return 1.0;
        }

        let cosine = cosine_similarity(&va, &vb);
        let mut combined = COSINE_WEIGHT * cosine + DIVERSITY_WEIGHT * Self::diversity(a, b);

        if a.same_artist(b) {
            combined += SAME_ARTIST_BOOST;
        }
        if a.same_genre(b) {
            combined += SAME_GENRE_BOOST;
        }

        if !combined.is_finite() {
            trace!(a = %a.id, b = %b.id, "Non-finite similarity, scoring 0");
            return 0.0;
        }
        combined.clamp(0.0, 1.0)
    }

    /// How different two songs feel, in [0, 1].
    pub fn diversity(a: &Song, b: &Song) -> f64 {
        let fa = &a.features;
        let fb = &b.features;

        let mut diversity = 0.2 * (fa.tempo - fb.tempo).abs() / TEMPO_RANGE
            + 0.2 * (fa.energy - fb.energy).abs()
            + 0.2 * (fa.valence - fb.valence).abs()
            + 0.15 * (fa.danceability - fb.danceability).abs();

        if a.genre_differs(b) {
            diversity += 0.15 * GENRE_DIFFERS_PENALTY;
        }
        if !a.same_artist(b) {
            diversity += 0.1 * ARTIST_DIFFERS_PENALTY;
        }

        diversity.min(1.0)
    }
}
