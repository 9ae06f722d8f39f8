//! Song-to-song scoring primitives.
//!
//! This crate provides:
//! - `FeatureVectorBuilder`: audio descriptors to a normalized 13-slot vector
//! - `FeatureCache`: per-call memo of those vectors keyed by song id
//! - `SimilarityScorer`: bounded similarity with diversity and boosts
//! - `math`: cosine / dot / norm helpers
//!
//! ## Example Usage
//! ```ignore
//! use scoring::{FeatureCache, SimilarityScorer};
//!
//! let mut cache = FeatureCache::new();
//! let score = SimilarityScorer::new().score(&seed, &candidate, &mut cache);
//! ```

pub mod features;
pub mod math;
pub mod similarity;

pub use features::{FEATURE_DIMS, FeatureCache, FeatureVector, FeatureVectorBuilder};
pub use similarity::SimilarityScorer;
