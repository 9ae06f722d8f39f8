//! # Smart Orchestrator
//!
//! Picks a strategy per caller:
//! 1. Guests and users with no likes or plays get the popularity fallback
//! 2. Otherwise a seed song is chosen from the user's history
//!    (most recent like, most played with more than one play, most recent
//!    play, random like)
//! 3. No seed: collaborative only
//! 4. Seed: hybrid. If the seed has vanished from the catalog, fall back to
//!    collaborative, and to popularity if that fails too

use crate::hybrid::HybridBlender;
use catalog::{CatalogStore, SongId, UserBehaviorStore, UserId};
use sources::explain::popular_explanation;
use sources::{
    CollaborativeRecommender, Identity, RecommendError, RecommendationResult, Result, ScoreKind,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Most popular songs, for callers without usable history.
#[derive(Clone)]
pub struct PopularityFallback {
    catalog: Arc<dyn CatalogStore>,
}

impl PopularityFallback {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    /// Top `limit` songs, scored popularity / 100.
    pub fn recommend(&self, limit: usize) -> Result<Vec<RecommendationResult>> {
        let mut songs = self.catalog.get_top_by_popularity(limit)?;
        songs.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        songs.truncate(limit);

        Ok(songs
            .into_iter()
            .map(|song| {
                let score = f64::from(song.popularity) / 100.0;
                let explanation = popular_explanation(&song);
                RecommendationResult::new(song, score, ScoreKind::PopularFallback)
                    .with_explanation(explanation)
            })
            .collect())
    }
}

/// Where the seed for a hybrid blend came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    RecentLike,
    MostPlayed,
    RecentPlay,
    RandomLike,
}

#[derive(Clone)]
pub struct SmartOrchestrator {
    behavior: Arc<dyn UserBehaviorStore>,
    hybrid: HybridBlender,
    collaborative: CollaborativeRecommender,
    popular: PopularityFallback,
}

impl SmartOrchestrator {
    pub fn new(
        behavior: Arc<dyn UserBehaviorStore>,
        hybrid: HybridBlender,
        collaborative: CollaborativeRecommender,
        popular: PopularityFallback,
    ) -> Self {
        Self {
            behavior,
            hybrid,
            collaborative,
            popular,
        }
    }

    #[instrument(skip(self), fields(identity = %identity))]
    pub fn recommend(&self, identity: Identity, limit: usize) -> Result<Vec<RecommendationResult>> {
        let user_id = match identity {
            Identity::Guest => {
                info!("Guest caller, using popularity fallback");
                return self.popular.recommend(limit);
            }
            Identity::User(id) => id,
        };

        let history = self.behavior.get_user(user_id)?;
        if history.is_cold_start() {
            info!("User {} has no likes or plays, using popularity fallback", user_id);
            return self.popular.recommend(limit);
        }

        let Some((seed, source)) = self.select_seed(user_id)? else {
            info!("No seed for user {}, using collaborative", user_id);
            return self.collaborative.recommend(user_id, limit);
        };
        info!(seed = %seed, ?source, "Using hybrid strategy");

        match self.hybrid.recommend(identity, &seed, limit) {
            Ok(results) => Ok(results),
            Err(RecommendError::ItemNotFound(missing)) => {
                warn!(seed = %missing, "Seed song no longer in catalog, falling back to collaborative");
                match self.collaborative.recommend(user_id, limit) {
                    Ok(results) => Ok(results),
                    Err(err) => {
                        warn!(error = %err, "Collaborative fallback failed, using popularity");
                        self.popular.recommend(limit)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    /// First available seed in priority order.
    pub fn select_seed(&self, user_id: UserId) -> Result<Option<(SongId, SeedSource)>> {
        if let Some(like) = self.behavior.most_recent_like(user_id)? {
            return Ok(Some((like.song_id, SeedSource::RecentLike)));
        }
        if let Some(play) = self.behavior.most_played(user_id)? {
            if play.play_count > 1 {
                return Ok(Some((play.song_id, SeedSource::MostPlayed)));
            }
        }
        if let Some(play) = self.behavior.most_recent_play(user_id)? {
            return Ok(Some((play.song_id, SeedSource::RecentPlay)));
        }
        if let Some(like) = self.behavior.random_like(user_id)? {
            return Ok(Some((like.song_id, SeedSource::RandomLike)));
        }
        debug!("User {} has no seed candidates", user_id);
        Ok(None)
    }
}
