//! Read-only capability interfaces consumed by the recommendation engine.
//!
//! The engine never talks to a database directly; it receives an
//! `Arc<dyn CatalogStore>` and an `Arc<dyn UserBehaviorStore>`. `CatalogIndex`
//! implements both over its in-memory snapshot.

use crate::error::{StoreError, StoreResult};
use crate::types::{CatalogIndex, Like, Play, Song, SongId, UserHistory, UserId};
use rand::seq::IndexedRandom;

/// Lookups over the song catalog.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait CatalogStore: Send + Sync {
    /// Fails with `StoreError::SongNotFound` if the id does not resolve.
    fn get_by_id(&self, id: &str) -> StoreResult<Song>;

    /// Songs for the ids that resolve; unknown ids are skipped.
    fn get_by_ids(&self, ids: &[SongId]) -> StoreResult<Vec<Song>>;

    /// Up to `n` songs by descending popularity.
    fn get_top_by_popularity(&self, n: usize) -> StoreResult<Vec<Song>>;

    /// The whole catalog in iteration order.
    fn get_all(&self) -> StoreResult<Vec<Song>>;
}

/// Lookups over likes and plays.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait UserBehaviorStore: Send + Sync {
    /// Fails with `StoreError::UserNotFound` if the user does not exist.
    fn get_user(&self, id: UserId) -> StoreResult<UserHistory>;

    fn most_recent_like(&self, id: UserId) -> StoreResult<Option<Like>>;

    /// Highest play count, ties broken by the most recent play.
    fn most_played(&self, id: UserId) -> StoreResult<Option<Play>>;

    fn most_recent_play(&self, id: UserId) -> StoreResult<Option<Play>>;

    /// A uniformly chosen like.
    fn random_like(&self, id: UserId) -> StoreResult<Option<Like>>;
}

impl CatalogStore for CatalogIndex {
    fn get_by_id(&self, id: &str) -> StoreResult<Song> {
        self.get_song(id)
            .cloned()
            .ok_or_else(|| StoreError::SongNotFound(id.to_string()))
    }

    fn get_by_ids(&self, ids: &[SongId]) -> StoreResult<Vec<Song>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.get_song(id))
            .cloned()
            .collect())
    }

    fn get_top_by_popularity(&self, n: usize) -> StoreResult<Vec<Song>> {
        Ok(self.songs_by_popularity().take(n).cloned().collect())
    }

    fn get_all(&self) -> StoreResult<Vec<Song>> {
        Ok(self.songs().cloned().collect())
    }
}

impl UserBehaviorStore for CatalogIndex {
    fn get_user(&self, id: UserId) -> StoreResult<UserHistory> {
        if self.find_user(id).is_none() {
            return Err(StoreError::UserNotFound(id));
        }
        Ok(UserHistory {
            user_id: id,
            likes: self.get_user_likes(id).to_vec(),
            plays: self.get_user_plays(id).to_vec(),
        })
    }

    fn most_recent_like(&self, id: UserId) -> StoreResult<Option<Like>> {
        Ok(self
            .get_user_likes(id)
            .iter()
            .max_by_key(|like| like.liked_at)
            .cloned())
    }

    fn most_played(&self, id: UserId) -> StoreResult<Option<Play>> {
        Ok(self
            .get_user_plays(id)
            .iter()
            .max_by_key(|play| (play.play_count, play.last_played))
            .cloned())
    }

    fn most_recent_play(&self, id: UserId) -> StoreResult<Option<Play>> {
        Ok(self
            .get_user_plays(id)
            .iter()
            .max_by_key(|play| play.last_played)
            .cloned())
    }

    fn random_like(&self, id: UserId) -> StoreResult<Option<Like>> {
        Ok(self.get_user_likes(id).choose(&mut rand::rng()).cloned())
    }
}
