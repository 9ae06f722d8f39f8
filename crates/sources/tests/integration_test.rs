//! Integration tests for the content and collaborative strategies.
//!
//! A seeded synthetic catalog is shared by both recommenders to check the
//! ranking properties hold over many songs, not just hand-built fixtures.

use catalog::{AudioFeatures, CatalogIndex, Like, Play, Song, User, UserBehaviorStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scoring::{FeatureCache, SimilarityScorer};
use sources::{CollaborativeRecommender, ContentRecommender, ScoreKind, TieBreak};
use std::collections::HashSet;
use std::sync::Arc;

const GENRES: [&str; 6] = ["pop", "rock", "jazz", "hip-hop", "classical", ""];

fn random_song(rng: &mut StdRng, i: usize) -> Song {
    Song {
        id: format!("song-{:03}", i),
        title: format!("Track {}", i),
        artist: format!("Artist {}", rng.random_range(0..15)),
        album: format!("Album {}", i / 10),
        genre: GENRES[rng.random_range(0..GENRES.len())].to_string(),
        popularity: rng.random_range(0..=100),
        duration_ms: rng.random_range(120_000..360_000),
        features: AudioFeatures {
            danceability: rng.random(),
            energy: rng.random(),
            key: rng.random_range(0..12),
            loudness: rng.random_range(-30.0..0.0),
            mode: rng.random_range(0..2),
            speechiness: rng.random(),
            acousticness: rng.random(),
            instrumentalness: rng.random(),
            liveness: rng.random(),
            valence: rng.random(),
            tempo: rng.random_range(60.0..200.0),
            time_signature: rng.random_range(3..8),
        },
    }
}

fn create_test_setup() -> Arc<CatalogIndex> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut index = CatalogIndex::new();

    for i in 0..200 {
        index.insert_song(random_song(&mut rng, i));
    }

    for user_id in 1..=5 {
        index.insert_user(User {
            id: user_id,
            username: format!("listener{}", user_id),
        });
        for n in 0..(user_id as usize * 4) {
            let song_id = format!("song-{:03}", rng.random_range(0..200));
            if n % 2 == 0 {
                index.insert_like(Like {
                    user_id,
                    song_id,
                    liked_at: 1_700_000_000 + n as i64,
                });
            } else {
                index.insert_play(Play {
                    user_id,
                    song_id,
                    play_count: rng.random_range(1..20),
                    last_played: 1_700_000_000 + n as i64,
                });
            }
        }
    }

    // user 6 liked exactly one song
    index.insert_user(User {
        id: 6,
        username: "single".to_string(),
    });
    index.insert_like(Like {
        user_id: 6,
        song_id: "song-042".to_string(),
        liked_at: 1_700_000_000,
    });

    Arc::new(index)
}

#[test]
fn test_similarity_bounds_over_catalog() {
    let index = create_test_setup();
    let scorer = SimilarityScorer::new();
    let mut cache = FeatureCache::new();

    let songs: Vec<&Song> = index.songs().take(40).collect();
    for a in &songs {
        assert_eq!(scorer.score(a, a, &mut cache), 1.0);
        for b in &songs {
            let s = scorer.score(a, b, &mut cache);
            assert!(s.is_finite());
            assert!((0.0..=1.0).contains(&s));
        }
    }
    // one vector per song, reused across all comparisons
    assert_eq!(cache.len(), songs.len());
}

#[test]
fn test_content_properties() {
    let index = create_test_setup();
    for threshold in [0.5, 0.7, 0.9] {
        let recommender = ContentRecommender::new(index.clone()).with_similarity_threshold(threshold);

        for seed in index.songs().step_by(25) {
            let results = recommender.recommend(&seed.id, 15).unwrap();

            assert!(results.len() <= 15);
            assert!(results.iter().all(|r| r.song.id != seed.id));
            assert!(results.iter().all(|r| r.score >= threshold));
            assert!(results.iter().all(|r| r.kind == ScoreKind::Content));
            for pair in results.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }

            // no hidden randomness
            assert_eq!(results, recommender.recommend(&seed.id, 15).unwrap());
        }
    }
}

#[test]
fn test_collaborative_never_returns_known_songs() {
    let index = create_test_setup();
    for tie_break in [TieBreak::Perturb, TieBreak::SongId] {
        let recommender =
            CollaborativeRecommender::new(index.clone(), index.clone()).with_tie_break(tie_break);

        for user_id in 1..=6 {
            let history = UserBehaviorStore::get_user(index.as_ref(), user_id).unwrap();
            let known: HashSet<&str> = history
                .likes
                .iter()
                .map(|l| l.song_id.as_str())
                .chain(history.plays.iter().map(|p| p.song_id.as_str()))
                .collect();

            let results = recommender.recommend(user_id, 10).unwrap();
            assert!(results.len() <= 10);
            assert!(results.iter().all(|r| !known.contains(r.song.id.as_str())));
            assert!(results.iter().all(|r| r.kind == ScoreKind::Collaborative));
        }
    }
}

#[test]
fn test_single_like_is_excluded() {
    let index = create_test_setup();
    let recommender = CollaborativeRecommender::new(index.clone(), index.clone());
    let results = recommender.recommend(6, 10).unwrap();
    assert!(results.iter().all(|r| r.song.id != "song-042"));
}

#[test]
fn test_collaborative_set_and_order_are_stable() {
    let index = create_test_setup();
    let recommender = CollaborativeRecommender::new(index.clone(), index.clone());

    let first = recommender.recommend(3, 10).unwrap();
    let second = recommender.recommend(3, 10).unwrap();

    let ids = |results: &[sources::RecommendationResult]| -> HashSet<String> {
        results.iter().map(|r| r.song.id.clone()).collect()
    };
    assert_eq!(ids(&first), ids(&second));
    for (a, b) in first.iter().zip(second.iter()) {
        assert!((a.score - b.score).abs() < 0.05);
    }
}
