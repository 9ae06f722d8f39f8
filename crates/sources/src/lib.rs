//! # Sources Crate
//!
//! The two base recommendation strategies and the types they share.
//!
//! ## Components
//!
//! ### ContentRecommender
//! "Songs that sound like this one": every catalog song scored against a
//! seed with `scoring::SimilarityScorer`, filtered by a similarity threshold.
//!
//! ### CollaborativeRecommender
//! "Songs that fit your profile": popular songs scored against the genres
//! and artists a user has liked, with bonuses for unexplored genres and new
//! artists. Also computes user-to-user similarity.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CollaborativeRecommender, ContentRecommender};
//! use catalog::CatalogIndex;
//! use std::sync::Arc;
//!
//! let index = Arc::new(CatalogIndex::load_from_dir(Path::new("data/sample"))?);
//!
//! let content = ContentRecommender::new(index.clone()).with_similarity_threshold(0.7);
//! let collaborative = CollaborativeRecommender::new(index.clone(), index.clone());
//!
//! let similar = content.recommend("4uLU6hMCjMI75M1A2tKUQC", 10)?;
//! let for_you = collaborative.recommend(1, 10)?;
//! ```

pub mod collaborative;
pub mod content;
pub mod error;
pub mod explain;
pub mod profile;
pub mod smoothing;
pub mod types;

pub use collaborative::CollaborativeRecommender;
pub use content::{ContentRecommender, DEFAULT_SIMILARITY_THRESHOLD};
pub use error::{RecommendError, Result};
pub use profile::{UserProfile, build_user_profile};
pub use smoothing::TieBreak;
pub use types::{Identity, RecommendationResult, ScoreKind, finalize, mark_liked};
