//! # Recommendation Engine
//!
//! Single entry point wiring every strategy to one pair of stores and one
//! `EngineConfig`. Each call is synchronous, owns all of its scratch state
//! and returns finalized results (scores clamped to [0, 1], ranks from 1).
//! Calls made on behalf of a user also flag the songs that user has liked.

use std::sync::Arc;
use std::time::Instant;

use catalog::{CatalogStore, SongId, UserBehaviorStore, UserId};
use sources::{
    CollaborativeRecommender, ContentRecommender, Identity, RecommendationResult, Result, finalize,
    mark_liked,
};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::hybrid::HybridBlender;
use crate::orchestrator::{PopularityFallback, SmartOrchestrator};

#[derive(Clone)]
pub struct RecommendationEngine {
    config: EngineConfig,
    behavior: Arc<dyn UserBehaviorStore>,
    content: ContentRecommender,
    collaborative: CollaborativeRecommender,
    hybrid: HybridBlender,
    smart: SmartOrchestrator,
    popular: PopularityFallback,
}

impl RecommendationEngine {
    /// Build every component from a validated config.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        behavior: Arc<dyn UserBehaviorStore>,
        config: EngineConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let content = ContentRecommender::new(catalog.clone())
            .with_similarity_threshold(config.similarity_threshold);
        let collaborative = CollaborativeRecommender::new(catalog.clone(), behavior.clone())
            .with_tie_break(config.tie_break);
        let hybrid = HybridBlender::new(content.clone(), collaborative.clone(), &config);
        let popular = PopularityFallback::new(catalog);
        let smart = SmartOrchestrator::new(
            behavior.clone(),
            hybrid.clone(),
            collaborative.clone(),
            popular.clone(),
        );

        info!(
            threshold = config.similarity_threshold,
            content_weight = config.content_weight,
            collaborative_weight = config.collaborative_weight,
            tie_break = %config.tie_break,
            "Recommendation engine ready"
        );

        Ok(Self {
            config,
            behavior,
            content,
            collaborative,
            hybrid,
            smart,
            popular,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Songs similar to `seed_id`.
    pub fn content(&self, seed_id: &str, limit: usize) -> Result<Vec<RecommendationResult>> {
        let limit = self.config.bound_limit(limit);
        self.content.recommend(seed_id, limit).map(finalize)
    }

    /// Songs matching a user's profile.
    pub fn collaborative(&self, user_id: UserId, limit: usize) -> Result<Vec<RecommendationResult>> {
        let limit = self.config.bound_limit(limit);
        let results = self.collaborative.recommend(user_id, limit).map(finalize)?;
        Ok(self.with_like_status(Identity::User(user_id), results))
    }

    /// Content for `seed_id` blended with the caller's profile.
    pub fn hybrid(
        &self,
        identity: Identity,
        seed_id: &str,
        limit: usize,
    ) -> Result<Vec<RecommendationResult>> {
        let limit = self.config.bound_limit(limit);
        let results = self.hybrid.recommend(identity, seed_id, limit).map(finalize)?;
        Ok(self.with_like_status(identity, results))
    }

    /// Let the engine pick the strategy.
    pub fn smart(&self, identity: Identity, limit: usize) -> Result<Vec<RecommendationResult>> {
        let start_time = Instant::now();
        let limit = self.config.bound_limit(limit);
        let results = self.smart.recommend(identity, limit).map(finalize)?;
        let results = self.with_like_status(identity, results);
        info!(
            "Smart recommendations for {}: {} results in {:.2?}",
            identity,
            results.len(),
            start_time.elapsed()
        );
        Ok(results)
    }

    /// Most popular songs.
    pub fn popular(&self, limit: usize) -> Result<Vec<RecommendationResult>> {
        let limit = self.config.bound_limit(limit);
        self.popular.recommend(limit).map(finalize)
    }

    /// Set `is_liked` from the caller's likes; guests like nothing.
    ///
    /// The flag is display-only, so a failed lookup leaves every result
    /// unflagged instead of failing the request.
    fn with_like_status(
        &self,
        identity: Identity,
        results: Vec<RecommendationResult>,
    ) -> Vec<RecommendationResult> {
        let Identity::User(user_id) = identity else {
            return results;
        };
        if results.is_empty() {
            return results;
        }
        match self.behavior.get_user(user_id) {
            Ok(history) => {
                let liked: HashSet<SongId> =
                    history.likes.into_iter().map(|l| l.song_id).collect();
                mark_liked(results, &liked)
            }
            Err(err) => {
                warn!(error = %err, "Could not load likes, leaving results unflagged");
                results
            }
        }
    }

    /// How alike two users' listening histories are, in [0, 1].
    pub fn user_similarity(&self, a: UserId, b: UserId) -> Result<f64> {
        self.collaborative.user_similarity(a, b)
    }
}
