//! # Catalog Crate
//!
//! Song catalog and listening history for the recommendation engine.
//!
//! ## Main Components
//!
//! - **types**: Domain types (Song, AudioFeatures, Like, Play, CatalogIndex)
//! - **store**: `CatalogStore` / `UserBehaviorStore` traits the engine reads through
//! - **parser**: Parse the `::`-separated snapshot files
//! - **index**: Load and validate a `CatalogIndex` from a directory
//! - **error**: Loader and store error types
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, CatalogStore};
//! use std::path::Path;
//!
//! let index = CatalogIndex::load_from_dir(Path::new("data/sample"))?;
//! let song = index.get_by_id("4uLU6hMCjMI75M1A2tKUQC")?;
//! println!("{} by {}", song.title, song.artist);
//! ```
//!
//! Enable the `mock` feature to get `MockCatalogStore` and
//! `MockUserBehaviorStore` (mockall) for tests in downstream crates.

pub mod error;
pub mod index;
pub mod parser;
pub mod store;
pub mod types;

pub use error::{DataLoadError, Result, StoreError, StoreResult};
pub use store::{CatalogStore, UserBehaviorStore};
#[cfg(feature = "mock")]
pub use store::{MockCatalogStore, MockUserBehaviorStore};
pub use types::{
    AudioFeatures, CatalogIndex, Like, Play, Song, SongId, Timestamp, User, UserHistory, UserId,
};
