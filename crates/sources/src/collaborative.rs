//! Collaborative recommendations from a user's own listening profile.
//!
//! ## Algorithm
//! 1. Fetch the user's history once and aggregate it into a `UserProfile`
//! 2. Pull the `limit * 3` most popular songs as the candidate pool
//! 3. Skip anything the user already liked or played
//! 4. score = 0.5 * genre affinity + 0.15 * popularity
//!    + 0.25 * genre exploration bonus + 0.1 * new artist bonus
//! 5. Keep scores above 0.05, sort, apply tie smoothing, truncate
//!
//! The exploration bonus favors genres the user has liked at most once, so
//! the list does not collapse onto the user's single favorite genre.

use crate::error::Result;
use crate::explain::collaborative_explanation;
use crate::profile::{UserProfile, build_user_profile};
use crate::smoothing::{TieBreak, smooth_collaborative, sort_by_score};
use crate::types::{RecommendationResult, ScoreKind};
use catalog::{CatalogStore, Song, UserBehaviorStore, UserId};
use scoring::math::cosine_similarity;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

const GENRE_WEIGHT: f64 = 0.5;
const POPULARITY_WEIGHT: f64 = 0.15;
const DIVERSITY_WEIGHT: f64 = 0.25;
const ARTIST_WEIGHT: f64 = 0.1;

const MIN_SCORE: f64 = 0.05;
const POOL_FACTOR: usize = 3;

const LIKE_SIMILARITY_WEIGHT: f64 = 0.6;
const PLAY_SIMILARITY_WEIGHT: f64 = 0.4;

/// Ranks popular songs against a user's liked genres and artists.
#[derive(Clone)]
pub struct CollaborativeRecommender {
    catalog: Arc<dyn CatalogStore>,
    behavior: Arc<dyn UserBehaviorStore>,
    tie_break: TieBreak,
}

impl CollaborativeRecommender {
    pub fn new(catalog: Arc<dyn CatalogStore>, behavior: Arc<dyn UserBehaviorStore>) -> Self {
        Self {
            catalog,
            behavior,
            tie_break: TieBreak::default(),
        }
    }

    /// Configure how near-equal scores are ordered (default: perturb)
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Up to `limit` songs the user has not heard yet, best first.
    #[instrument(skip(self), fields(tie_break = %self.tie_break))]
    pub fn recommend(&self, user_id: UserId, limit: usize) -> Result<Vec<RecommendationResult>> {
        let history = self.behavior.get_user(user_id)?;
        let profile = build_user_profile(self.catalog.as_ref(), &history)?;
        debug!(
            "Profile for user {}: {} known songs, {} liked genres",
            user_id,
            profile.known_songs.len(),
            profile.genre_counts.len()
        );

        let pool = self
            .catalog
            .get_top_by_popularity(limit.saturating_mul(POOL_FACTOR))?;

        let mut results: Vec<RecommendationResult> = pool
            .into_iter()
            .filter(|song| !profile.knows(&song.id))
            .filter_map(|song| {
                let score = score_candidate(&profile, &song);
                (score > MIN_SCORE)
                    .then(|| RecommendationResult::new(song, score, ScoreKind::Collaborative))
            })
            .collect();

        sort_by_score(&mut results);
        smooth_collaborative(&mut results, self.tie_break);
        results.truncate(limit);

        for result in &mut results {
            result.explanation = Some(collaborative_explanation(&result.song, result.score));
        }

        debug!("Generated {} collaborative recommendations", results.len());
        Ok(results)
    }

    /// How alike two users' histories are, in [0, 1].
    ///
    /// 0.6 * Jaccard overlap of liked songs + 0.4 * cosine of play counts over
    /// the union of played songs. Either term is 0 when there is nothing to
    /// compare.
    #[instrument(skip(self))]
    pub fn user_similarity(&self, a: UserId, b: UserId) -> Result<f64> {
        let first = self.behavior.get_user(a)?;
        let second = self.behavior.get_user(b)?;

        let likes_a: HashSet<&str> = first.likes.iter().map(|l| l.song_id.as_str()).collect();
        let likes_b: HashSet<&str> = second.likes.iter().map(|l| l.song_id.as_str()).collect();
        let union = likes_a.union(&likes_b).count();
        let like_similarity = if union == 0 {
            0.0
        } else {
            likes_a.intersection(&likes_b).count() as f64 / union as f64
        };

        let plays_a: HashMap<&str, u32> = first
            .plays
            .iter()
            .map(|p| (p.song_id.as_str(), p.play_count))
            .collect();
        let plays_b: HashMap<&str, u32> = second
            .plays
            .iter()
            .map(|p| (p.song_id.as_str(), p.play_count))
            .collect();

        let mut played: Vec<&str> = plays_a.keys().chain(plays_b.keys()).copied().collect();
        played.sort_unstable();
        played.dedup();

        let vector = |plays: &HashMap<&str, u32>| -> Vec<f64> {
            played
                .iter()
                .map(|id| f64::from(plays.get(id).copied().unwrap_or(0)))
                .collect()
        };
        let play_similarity = cosine_similarity(&vector(&plays_a), &vector(&plays_b));

        Ok(LIKE_SIMILARITY_WEIGHT * like_similarity + PLAY_SIMILARITY_WEIGHT * play_similarity)
    }
}

/// Collaborative score of one candidate for one profile.
pub fn score_candidate(profile: &UserProfile, song: &Song) -> f64 {
    let genre_likes = profile.genre_likes(&song.genre);

    let genre_affinity = if profile.total_likes > 0 && !song.genre.is_empty() {
        genre_likes as f64 / profile.total_likes as f64
    } else {
        0.0
    };

    let popularity = f64::from(song.popularity) / 100.0;

    let diversity_bonus = if song.genre.is_empty() {
        0.0
    } else {
        match genre_likes {
            0..=1 => 0.25,
            2..=3 => 0.15,
            _ => 0.0,
        }
    };

    let artist_bonus = if profile.has_liked_artist(&song.artist) {
        0.0
    } else {
        0.1
    };

    GENRE_WEIGHT * genre_affinity
        + POPULARITY_WEIGHT * popularity
        + DIVERSITY_WEIGHT * diversity_bonus
        + ARTIST_WEIGHT * artist_bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecommendError;
    use catalog::{
        AudioFeatures, CatalogIndex, Like, MockCatalogStore, MockUserBehaviorStore, Play, SongId,
        StoreError, User, UserHistory,
    };

    fn song(id: &str, artist: &str, genre: &str, popularity: u8) -> Song {
        Song {
            id: id.to_string(),
            title: format!("Song {}", id),
            artist: artist.to_string(),
            album: String::new(),
            genre: genre.to_string(),
            popularity,
            duration_ms: 200_000,
            features: AudioFeatures::default(),
        }
    }

    fn like(user_id: UserId, song_id: &str, liked_at: i64) -> Like {
        Like {
            user_id,
            song_id: song_id.to_string(),
            liked_at,
        }
    }

    fn play(user_id: UserId, song_id: &str, play_count: u32) -> Play {
        Play {
            user_id,
            song_id: song_id.to_string(),
            play_count,
            last_played: 0,
        }
    }

    fn create_test_index() -> Arc<CatalogIndex> {
        let mut index = CatalogIndex::new();
        index.insert_song(song("r1", "Rock Band", "rock", 90));
        index.insert_song(song("r2", "Rock Band", "rock", 85));
        index.insert_song(song("r3", "Other Rock", "rock", 80));
        index.insert_song(song("j1", "Jazz Trio", "jazz", 70));
        index.insert_song(song("p1", "Pop Star", "pop", 95));
        index.insert_song(song("x1", "Nobody", "", 10));

        for id in 1..=3 {
            index.insert_user(User {
                id,
                username: format!("user{}", id),
            });
        }

        // user 1 likes one rock song and played a pop song
        index.insert_like(like(1, "r1", 100));
        index.insert_play(play(1, "p1", 3));

        // user 2 likes the same rock song and a jazz song
        index.insert_like(like(2, "r1", 50));
        index.insert_like(like(2, "j1", 60));
        index.insert_play(play(2, "p1", 3));

        Arc::new(index)
    }

    fn result_ids(results: &[RecommendationResult]) -> Vec<SongId> {
        results.iter().map(|r| r.song.id.clone()).collect()
    }

    fn recommender(index: &Arc<CatalogIndex>) -> CollaborativeRecommender {
        CollaborativeRecommender::new(index.clone(), index.clone())
    }

    #[test]
    fn test_excludes_known_songs() {
        let index = create_test_index();
        let results = recommender(&index).recommend(1, 10).unwrap();

        let ids = result_ids(&results);
        assert!(!ids.contains(&"r1".to_string()));
        assert!(!ids.contains(&"p1".to_string()));
        assert!(!results.is_empty());
        for r in &results {
            assert_eq!(r.kind, ScoreKind::Collaborative);
            assert!(r.explanation.as_deref().unwrap().starts_with("Match score:"));
        }
    }

    #[test]
    fn test_single_like_never_returned() {
        let index = create_test_index();
        let results = recommender(&index).recommend(1, 10).unwrap();
        assert!(results.iter().all(|r| r.song.id != "r1"));
    }

    #[test]
    fn test_score_candidate_components() {
        let index = create_test_index();
        let history = UserBehaviorStore::get_user(index.as_ref(), 1).unwrap();
        let profile = build_user_profile(index.as_ref(), &history).unwrap();

        // r2: affinity 1/1, rock liked once -> 0.25 bonus, artist known
        let r2 = song("r2", "Rock Band", "rock", 85);
        let expected = 0.5 * 1.0 + 0.15 * 0.85 + 0.25 * 0.25;
        assert!((score_candidate(&profile, &r2) - expected).abs() < 1e-12);

        // r3: same genre, new artist
        let r3 = song("r3", "Other Rock", "Rock", 80);
        let expected = 0.5 * 1.0 + 0.15 * 0.8 + 0.25 * 0.25 + 0.1 * 0.1;
        assert!((score_candidate(&profile, &r3) - expected).abs() < 1e-12);

        // no genre: no affinity and no exploration bonus
        let x1 = song("x1", "Nobody", "", 10);
        let expected = 0.15 * 0.1 + 0.1 * 0.1;
        assert!((score_candidate(&profile, &x1) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_low_scores_dropped_and_pool_bounded() {
        let index = create_test_index();
        let results = recommender(&index)
            .with_tie_break(TieBreak::SongId)
            .recommend(1, 10)
            .unwrap();
        // x1 scores 0.025 and is dropped
        assert!(results.iter().all(|r| r.song.id != "x1"));

        // limit 1 -> pool of the 3 most popular: p1, r1, r2
        let results = recommender(&index).recommend(1, 1).unwrap();
        assert_eq!(result_ids(&results), vec!["r2".to_string()]);
    }

    #[test]
    fn test_set_is_stable_across_calls() {
        let index = create_test_index();
        let rec = recommender(&index);
        let mut first = result_ids(&rec.recommend(1, 10).unwrap());
        let mut second = result_ids(&rec.recommend(1, 10).unwrap());
        first.sort();
        second.sort();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_user() {
        let index = create_test_index();
        assert_eq!(
            recommender(&index).recommend(99, 5).unwrap_err(),
            RecommendError::UserNotFound(99)
        );
    }

    #[test]
    fn test_liked_song_lookup_failure_propagates() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_get_by_ids()
            .returning(|_| Err(StoreError::Unavailable("batch lookup failed".to_string())));
        catalog.expect_get_top_by_popularity().never();

        let mut behavior = MockUserBehaviorStore::new();
        behavior.expect_get_user().returning(|id| {
            Ok(UserHistory {
                user_id: id,
                likes: vec![like(id, "r1", 1)],
                plays: vec![],
            })
        });

        let rec = CollaborativeRecommender::new(Arc::new(catalog), Arc::new(behavior));
        assert!(matches!(
            rec.recommend(1, 5),
            Err(RecommendError::Upstream(_))
        ));
    }

    #[test]
    fn test_user_similarity() {
        let index = create_test_index();
        let rec = recommender(&index);

        // likes: {r1} vs {r1, j1} -> 1/2; plays identical -> 1.0
        let sim = rec.user_similarity(1, 2).unwrap();
        assert!((sim - (0.6 * 0.5 + 0.4 * 1.0)).abs() < 1e-12);

        // user 3 has no history at all
        assert_eq!(rec.user_similarity(1, 3).unwrap(), 0.0);
        assert_eq!(
            rec.user_similarity(1, 42).unwrap_err(),
            RecommendError::UserNotFound(42)
        );
    }
}
