//! Per-call aggregation of a user's listening history.
//!
//! Everything the collaborative scorer asks about a user is gathered once
//! here so the candidate loop only does set and map lookups.

use crate::error::Result;
use catalog::{CatalogStore, SongId, UserHistory, UserId};
use std::collections::{HashMap, HashSet};

/// What the collaborative scorer knows about one user.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub user_id: UserId,

    /// Songs the user already liked or played; never recommended back
    pub known_songs: HashSet<SongId>,

    /// Lower-cased genre -> number of liked songs in it
    pub genre_counts: HashMap<String, usize>,

    /// Lower-cased artists of liked songs
    pub liked_artists: HashSet<String>,

    /// Number of likes on record (including likes on delisted songs)
    pub total_likes: usize,
}

impl UserProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Liked songs in `genre`, compared case-insensitively.
    pub fn genre_likes(&self, genre: &str) -> usize {
        if genre.is_empty() {
            return 0;
        }
        self.genre_counts
            .get(&genre.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    pub fn knows(&self, song_id: &str) -> bool {
        self.known_songs.contains(song_id)
    }

    pub fn has_liked_artist(&self, artist: &str) -> bool {
        self.liked_artists.contains(&artist.to_lowercase())
    }
}

/// Build a `UserProfile` from a fetched history.
///
/// Liked songs are resolved in one `get_by_ids` call; ids that no longer
/// resolve still count toward `total_likes`.
pub fn build_user_profile(catalog: &dyn CatalogStore, history: &UserHistory) -> Result<UserProfile> {
    let mut profile = UserProfile::new(history.user_id);
    profile.total_likes = history.likes.len();

    profile
        .known_songs
        .extend(history.likes.iter().map(|l| l.song_id.clone()));
    profile
        .known_songs
        .extend(history.plays.iter().map(|p| p.song_id.clone()));

    if history.likes.is_empty() {
        return Ok(profile);
    }

    let ids: Vec<SongId> = history.likes.iter().map(|l| l.song_id.clone()).collect();
    let liked_songs = catalog.get_by_ids(&ids)?;

    for song in &liked_songs {
        if !song.genre.is_empty() {
            *profile
                .genre_counts
                .entry(song.genre.to_lowercase())
                .or_insert(0) += 1;
        }
        if !song.artist.is_empty() {
            profile.liked_artists.insert(song.artist.to_lowercase());
        }
    }

    Ok(profile)
}
