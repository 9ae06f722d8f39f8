//! Core domain types for the song catalog and listening history.
//!
//! Songs carry free-text categorical attributes plus the twelve audio
//! descriptors used for similarity scoring. Likes and plays are the only
//! behavioral signals; both are read-only inputs to the engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user. `0` is reserved for guests.
pub type UserId = u32;

/// Stable identifier of a catalog song (opaque string, usually a UUID)
pub type SongId = String;

/// Unix timestamp in seconds
pub type Timestamp = i64;

// =============================================================================
// Song-related Types
// =============================================================================

/// Audio descriptors attached to every song.
///
/// Ranges are the conventional ones (most values 0..1, `key` 0..11,
/// `loudness` roughly -60..0 dB, `tempo` roughly 0..250 BPM,
/// `time_signature` 3..7) but nothing here enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub key: u8,
    pub loudness: f64,
    pub mode: u8,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub time_signature: u8,
}

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Free text, may be empty
    pub genre: String,
    /// 0..=100
    pub popularity: u8,
    pub duration_ms: u32,
    pub features: AudioFeatures,
}

impl Song {
    /// Case-insensitive artist comparison.
    pub fn same_artist(&self, other: &Song) -> bool {
        eq_ignore_case(&self.artist, &other.artist)
    }

    /// Case-insensitive genre comparison; an empty genre never matches.
    pub fn same_genre(&self, other: &Song) -> bool {
        !self.genre.is_empty() && eq_ignore_case(&self.genre, &other.genre)
    }

    /// Both genres known and different.
    pub fn genre_differs(&self, other: &Song) -> bool {
        !self.genre.is_empty() && !other.genre.is_empty() && !self.same_genre(other)
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

// =============================================================================
// User and behavior Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// A user liked a song at `liked_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub user_id: UserId,
    pub song_id: SongId,
    pub liked_at: Timestamp,
}

/// Aggregated play counter for one (user, song) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub user_id: UserId,
    pub song_id: SongId,
    pub play_count: u32,
    pub last_played: Timestamp,
}

/// Everything the engine needs to know about one user, fetched once per call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserHistory {
    pub user_id: UserId,
    pub likes: Vec<Like>,
    pub plays: Vec<Play>,
}

impl UserHistory {
    /// No likes and no plays recorded.
    pub fn is_cold_start(&self) -> bool {
        self.likes.is_empty() && self.plays.is_empty()
    }
}

// =============================================================================
// CatalogIndex - in-memory snapshot implementing both store traits
// =============================================================================

/// Read-only snapshot of the catalog and listening history.
///
/// Built once (from files or by hand in tests), then shared behind an `Arc`.
/// Every lookup borrows; the store trait impls clone only what they return.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    // Primary data stores
    pub(crate) songs: HashMap<SongId, Song>,
    pub(crate) users: HashMap<UserId, User>,

    /// Insertion order, which is the catalog iteration order
    pub(crate) song_order: Vec<SongId>,
    /// Song ids by descending popularity, ties in catalog order
    pub(crate) popularity_order: Vec<SongId>,

    // Behavior indices
    pub(crate) user_likes: HashMap<UserId, Vec<Like>>,
    pub(crate) user_plays: HashMap<UserId, Vec<Play>>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_song(&self, id: &str) -> Option<&Song> {
        self.songs.get(id)
    }

    pub fn find_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Songs in catalog iteration order.
    pub fn songs(&self) -> impl Iterator<Item = &Song> + '_ {
        self.song_order.iter().filter_map(|id| self.songs.get(id))
    }

    /// Songs by descending popularity.
    pub fn songs_by_popularity(&self) -> impl Iterator<Item = &Song> + '_ {
        self.popularity_order
            .iter()
            .filter_map(|id| self.songs.get(id))
    }

    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn get_user_likes(&self, user_id: UserId) -> &[Like] {
        self.user_likes
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_user_plays(&self, user_id: UserId) -> &[Play] {
        self.user_plays
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Case-insensitive substring search over title, artist and genre.
    ///
    /// Exact title matches come first, then by popularity.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Song> {
        let needle = query.to_lowercase();
        let mut matches: Vec<(bool, &Song)> = self
            .songs_by_popularity()
            .filter_map(|song| {
                let title = song.title.to_lowercase();
                if title == needle {
                    Some((true, song))
                } else if title.contains(&needle)
                    || song.artist.to_lowercase().contains(&needle)
                    || song.genre.to_lowercase().contains(&needle)
                {
                    Some((false, song))
                } else {
                    None
                }
            })
            .collect();
        // stable: popularity order is kept inside each group
        matches.sort_by_key(|(exact, _)| !exact);
        matches.into_iter().take(limit).map(|(_, s)| s).collect()
    }

    /// Insert or replace a song, keeping the popularity order current.
    pub fn insert_song(&mut self, song: Song) {
        let id = song.id.clone();
        if self.songs.contains_key(&id) {
            self.popularity_order.retain(|existing| existing != &id);
        } else {
            self.song_order.push(id.clone());
        }

        let songs = &self.songs;
        let pos = self.popularity_order.partition_point(|other| {
            songs
                .get(other)
                .map(|s| s.popularity >= song.popularity)
                .unwrap_or(false)
        });
        self.popularity_order.insert(pos, id.clone());
        self.songs.insert(id, song);
    }

    /// Remove a song from the catalog (likes and plays pointing at it stay).
    pub fn remove_song(&mut self, id: &str) -> Option<Song> {
        let removed = self.songs.remove(id)?;
        self.song_order.retain(|existing| existing != id);
        self.popularity_order.retain(|existing| existing != id);
        Some(removed)
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn insert_like(&mut self, like: Like) {
        self.user_likes
            .entry(like.user_id)
            .or_insert_with(Vec::new)
            .push(like);
    }

    pub fn insert_play(&mut self, play: Play) {
        self.user_plays
            .entry(play.user_id)
            .or_insert_with(Vec::new)
            .push(play);
    }

    /// (users, songs, likes, plays) for logging and sanity checks
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        let likes = self.user_likes.values().map(|v| v.len()).sum();
        let plays = self.user_plays.values().map(|v| v.len()).sum();
        (self.users.len(), self.songs.len(), likes, plays)
    }
}
