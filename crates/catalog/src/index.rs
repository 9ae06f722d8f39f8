//! Building a `CatalogIndex` from a snapshot directory.
//!
//! The four files are parsed in parallel with nested `rayon::join`, then
//! inserted into the index and validated.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

impl CatalogIndex {
    /// Load songs, users, likes and plays from `data_dir`.
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!(data_dir = %data_dir.display(), "Loading catalog snapshot");

        let songs_path = data_dir.join("songs.dat");
        let users_path = data_dir.join("users.dat");
        let likes_path = data_dir.join("likes.dat");
        let plays_path = data_dir.join("plays.dat");

        let ((songs, users), (likes, plays)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_songs(&songs_path),
                    || parser::parse_users(&users_path),
                )
            },
            || {
                rayon::join(
                    || parser::parse_likes(&likes_path),
                    || parser::parse_plays(&plays_path),
                )
            },
        );

        let songs = songs?;
        let users = users?;
        let likes = likes?;
        let plays = plays?;

        let mut index = CatalogIndex::new();
        for song in songs {
            index.insert_song(song);
        }
        for user in users {
            index.insert_user(user);
        }
        for like in likes {
            index.insert_like(like);
        }
        for play in plays {
            index.insert_play(play);
        }

        index.validate()?;

        let (users, songs, likes, plays) = index.counts();
        info!(users, songs, likes, plays, "Catalog snapshot loaded");
        Ok(index)
    }

    /// Check referential integrity.
    ///
    /// Likes and plays must point at known users. A like or play pointing at
    /// a song that is not in the catalog is kept (songs can be delisted) and
    /// only logged.
    pub fn validate(&self) -> Result<()> {
        // catalog order, then ascending user id, so the first error reported
        // is the same on every run
        if let Some(song) = self
            .song_order
            .iter()
            .filter_map(|id| self.songs.get(id))
            .find(|s| s.popularity > 100)
        {
            return Err(DataLoadError::InvalidValue {
                field: "popularity".to_string(),
                value: song.popularity.to_string(),
            });
        }

        let mut user_ids: Vec<UserId> = self
            .user_likes
            .keys()
            .chain(self.user_plays.keys())
            .copied()
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let mut dangling = 0usize;
        for user_id in user_ids {
            if !self.users.contains_key(&user_id) {
                return Err(DataLoadError::MissingReference {
                    entity: "User".to_string(),
                    id: user_id.to_string(),
                });
            }

            let likes = self.get_user_likes(user_id);
            let plays = self.get_user_plays(user_id);
            if plays.iter().any(|p| p.play_count == 0) {
                return Err(DataLoadError::InvalidValue {
                    field: "play_count".to_string(),
                    value: "0".to_string(),
                });
            }
            dangling += likes
                .iter()
                .map(|l| &l.song_id)
                .chain(plays.iter().map(|p| &p.song_id))
                .filter(|id| !self.songs.contains_key(*id))
                .count();
        }

        if dangling > 0 {
            warn!(dangling, "Likes or plays reference songs missing from the catalog");
        }
        Ok(())
    }

    /// Number of songs per genre (lowercased, empty genre skipped).
    pub fn genre_counts(&self) -> HashMap<String, usize> {
        self.songs
            .par_iter()
            .filter(|(_, song)| !song.genre.is_empty())
            .fold(HashMap::new, |mut acc, (_, song)| {
                *acc.entry(song.genre.to_lowercase()).or_insert(0) += 1;
                acc
            })
            .reduce(HashMap::new, |mut a, b| {
                for (genre, count) in b {
                    *a.entry(genre).or_insert(0) += count;
                }
                a
            })
    }
}
