//! Ordering of near-equal scores in ranked lists.
//!
//! `TieBreak::Perturb` nudges adjacent near-ties by an index-derived amount so
//! long runs of equal scores do not render as a flat list. The nudge depends on
//! list position, so results are not permutation-stable.
//!
//! `TieBreak::SongId` leaves scores untouched and orders equal scores by
//! ascending song id.

use crate::types::RecommendationResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const COLLABORATIVE_WINDOW: f64 = 0.05;
const COLLABORATIVE_STEP: f64 = 0.01;
const HYBRID_WINDOW: f64 = 0.03;
const HYBRID_STEP: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    #[default]
    Perturb,
    SongId,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "perturb" => Ok(TieBreak::Perturb),
            "song_id" | "song-id" => Ok(TieBreak::SongId),
            other => Err(format!("Unknown tie break '{}'", other)),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::Perturb => f.write_str("perturb"),
            TieBreak::SongId => f.write_str("song_id"),
        }
    }
}

/// Descending by score; stable, so equal scores keep their input order.
pub fn sort_by_score(results: &mut [RecommendationResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Descending by score, then ascending song id.
fn sort_by_score_then_id(results: &mut [RecommendationResult]) {
    results.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.song.id.cmp(&b.song.id),
        other => other,
    });
}

/// Order collaborative results (input already sorted by score).
///
/// Perturb: for each adjacent pair within 0.05, raise the earlier one by
/// `(i % 3) * 0.01`, then re-sort once.
pub fn smooth_collaborative(results: &mut [RecommendationResult], tie_break: TieBreak) {
    match tie_break {
        TieBreak::Perturb => {
            for i in 0..results.len().saturating_sub(1) {
                if (results[i].score - results[i + 1].score).abs() < COLLABORATIVE_WINDOW {
                    results[i].score += (i % 3) as f64 * COLLABORATIVE_STEP;
                }
            }
            sort_by_score(results);
        }
        TieBreak::SongId => sort_by_score_then_id(results),
    }
}

/// Order hybrid results (input already sorted by score).
///
/// Perturb: for each adjacent pair within 0.03, lower the later one by
/// `((i + 1) % 5) * 0.005`, floored at 0. Single pass, no re-sort.
pub fn smooth_hybrid(results: &mut [RecommendationResult], tie_break: TieBreak) {
    match tie_break {
        TieBreak::Perturb => {
            for i in 0..results.len().saturating_sub(1) {
                if (results[i].score - results[i + 1].score).abs() < HYBRID_WINDOW {
                    let nudge = ((i + 1) % 5) as f64 * HYBRID_STEP;
                    results[i + 1].score = (results[i + 1].score - nudge).max(0.0);
                }
            }
        }
        TieBreak::SongId => sort_by_score_then_id(results),
    }
}
