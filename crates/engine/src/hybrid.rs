//! Hybrid blending of content and collaborative results.
//!
//! ## Algorithm
//! 1. Content recommendations for the seed over `2 * limit` (errors propagate)
//! 2. Collaborative recommendations over `2 * limit` for signed-in users when
//!    the collaborative weight is positive; a failure here only drops the
//!    collaborative half
//! 3. Merge by song id: `score += content * content_weight` and
//!    `score += collaborative * collaborative_weight`
//! 4. Sort descending, one smoothing pass, truncate

use crate::config::EngineConfig;
use catalog::SongId;
use sources::explain::hybrid_explanation;
use sources::smoothing::{smooth_hybrid, sort_by_score};
use sources::{
    CollaborativeRecommender, ContentRecommender, Identity, RecommendError, RecommendationResult,
    Result, ScoreKind, TieBreak,
};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Outcome of the optional collaborative half of a blend.
#[derive(Debug)]
pub enum Contribution {
    Scored(Vec<RecommendationResult>),
    /// Guest caller or zero collaborative weight
    Skipped,
    Failed(RecommendError),
}

#[derive(Clone)]
pub struct HybridBlender {
    content: ContentRecommender,
    collaborative: CollaborativeRecommender,
    content_weight: f64,
    collaborative_weight: f64,
    tie_break: TieBreak,
}

impl HybridBlender {
    pub fn new(
        content: ContentRecommender,
        collaborative: CollaborativeRecommender,
        config: &EngineConfig,
    ) -> Self {
        Self {
            content,
            collaborative,
            content_weight: config.content_weight,
            collaborative_weight: config.collaborative_weight,
            tie_break: config.tie_break,
        }
    }

    /// Blend content similarity to `seed_id` with the caller's profile.
    #[instrument(skip(self), fields(identity = %identity))]
    pub fn recommend(
        &self,
        identity: Identity,
        seed_id: &str,
        limit: usize,
    ) -> Result<Vec<RecommendationResult>> {
        let pool = limit.saturating_mul(2);

        let content = self.content.recommend(seed_id, pool)?;
        let collaborative = match self.collaborative_contribution(identity, pool) {
            Contribution::Scored(results) => results,
            Contribution::Skipped => Vec::new(),
            Contribution::Failed(err) => {
                warn!(
                    error = %err,
                    "Collaborative half of hybrid failed, continuing with content only"
                );
                Vec::new()
            }
        };
        debug!(
            "Blending {} content and {} collaborative results",
            content.len(),
            collaborative.len()
        );

        let mut merged = self.merge(content, collaborative);
        sort_by_score(&mut merged);
        smooth_hybrid(&mut merged, self.tie_break);
        merged.truncate(limit);

        for result in &mut merged {
            result.explanation = Some(hybrid_explanation(result.score.clamp(0.0, 1.0)));
        }
        Ok(merged)
    }

    /// The collaborative half, as an explicit outcome.
    pub fn collaborative_contribution(&self, identity: Identity, limit: usize) -> Contribution {
        let user_id = match identity {
            Identity::User(id) if self.collaborative_weight > 0.0 => id,
            _ => return Contribution::Skipped,
        };
        match self.collaborative.recommend(user_id, limit) {
            Ok(results) => Contribution::Scored(results),
            Err(err) => Contribution::Failed(err),
        }
    }

    /// Weighted sum per song id, in first-seen order.
    fn merge(
        &self,
        content: Vec<RecommendationResult>,
        collaborative: Vec<RecommendationResult>,
    ) -> Vec<RecommendationResult> {
        let mut merged: Vec<RecommendationResult> = Vec::new();
        let mut positions: HashMap<SongId, usize> = HashMap::new();

        let weighted = content
            .into_iter()
            .map(|r| (r, self.content_weight))
            .chain(collaborative.into_iter().map(|r| (r, self.collaborative_weight)));

        for (result, weight) in weighted {
            let contribution = result.score * weight;
            match positions.get(&result.song.id) {
                Some(&idx) => merged[idx].score += contribution,
                None => {
                    positions.insert(result.song.id.clone(), merged.len());
                    merged.push(RecommendationResult::new(
                        result.song,
                        contribution,
                        ScoreKind::Hybrid,
                    ));
                }
            }
        }
        merged
    }
}
