//! Result and identity types shared by every recommendation strategy.

use catalog::{Song, SongId, UserId};
use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Content,
    Collaborative,
    Hybrid,
    PopularFallback,
}

impl ScoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreKind::Content => "content",
            ScoreKind::Collaborative => "collaborative",
            ScoreKind::Hybrid => "hybrid",
            ScoreKind::PopularFallback => "popular_fallback",
        }
    }
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationResult {
    pub song: Song,
    pub score: f64,
    pub kind: ScoreKind,
    pub explanation: Option<String>,
    /// 1-based, assigned by `finalize`; 0 until then
    pub rank: usize,
    /// The caller has already liked this song
    pub is_liked: bool,
}

impl RecommendationResult {
    pub fn new(song: Song, score: f64, kind: ScoreKind) -> Self {
        Self {
            song,
            score,
            kind,
            explanation: None,
            rank: 0,
            is_liked: false,
        }
    }

    pub fn with_explanation(mut self, explanation: String) -> Self {
        self.explanation = Some(explanation);
        self
    }
}

/// Clamp final scores into [0, 1] and number the results from 1.
pub fn finalize(mut results: Vec<RecommendationResult>) -> Vec<RecommendationResult> {
    for (i, result) in results.iter_mut().enumerate() {
        result.score = if result.score.is_finite() {
            result.score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        result.rank = i + 1;
    }
    results
}

/// Flag every result whose song is in `liked`.
pub fn mark_liked(
    mut results: Vec<RecommendationResult>,
    liked: &HashSet<SongId>,
) -> Vec<RecommendationResult> {
    for result in &mut results {
        result.is_liked = liked.contains(&result.song.id);
    }
    results
}

/// Who is asking, resolved once at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identity {
    Guest,
    User(UserId),
}

impl Identity {
    /// `0` is the guest id.
    pub fn from_raw(id: UserId) -> Self {
        if id == 0 {
            Identity::Guest
        } else {
            Identity::User(id)
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Identity::Guest => None,
            Identity::User(id) => Some(*id),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Guest => f.write_str("guest"),
            Identity::User(id) => write!(f, "user {}", id),
        }
    }
}
