//! Engine crate for the song recommendation system.
//!
//! Wires the content and collaborative strategies from `sources` into the
//! hybrid blender, the smart orchestrator and the `RecommendationEngine`
//! facade, all driven by one immutable `EngineConfig`.
//!
//! ## Example Usage
//! ```ignore
//! use engine::{EngineConfig, RecommendationEngine};
//! use sources::Identity;
//!
//! let index = Arc::new(CatalogIndex::load_from_dir(Path::new("data/sample"))?);
//! let engine = RecommendationEngine::new(index.clone(), index, EngineConfig::from_env()?)?;
//! let results = engine.smart(Identity::from_raw(1), 10)?;
//! ```

pub mod config;
pub mod facade;
pub mod hybrid;
pub mod orchestrator;

pub use config::{ConfigError, EngineConfig};
pub use facade::RecommendationEngine;
pub use hybrid::{Contribution, HybridBlender};
pub use orchestrator::{PopularityFallback, SeedSource, SmartOrchestrator};
