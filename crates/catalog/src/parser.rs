//! Parser for the catalog snapshot files.
//!
//! All files are UTF-8, one record per line, fields separated by `::`.
//! Blank lines and lines starting with `#` are skipped.
//!
//! - songs.dat: id::title::artist::album::genre::popularity::duration_ms::
//!   danceability::energy::key::loudness::mode::speechiness::acousticness::
//!   instrumentalness::liveness::valence::tempo::time_signature
//! - users.dat: userId::username
//! - likes.dat: userId::songId::likedAt
//! - plays.dat: userId::songId::playCount::lastPlayed

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const SONG_FIELDS: usize = 19;
const USER_FIELDS: usize = 2;
const LIKE_FIELDS: usize = 3;
const PLAY_FIELDS: usize = 4;

/// The fields of one record plus enough context to report a useful error.
struct Record<'a> {
    file: &'a str,
    line: usize,
    fields: Vec<&'a str>,
}

impl<'a> Record<'a> {
    fn text(&self, idx: usize) -> &'a str {
        self.fields[idx].trim()
    }

    fn parse<T>(&self, idx: usize, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.text(idx)
            .parse()
            .map_err(|e| DataLoadError::ParseError {
                file: self.file.to_string(),
                line: self.line,
                reason: format!("Invalid {}: {}", name, e),
            })
    }
}

/// Read `path` and run `build` over every record with exactly `expected` fields.
fn parse_records<T>(
    path: &Path,
    expected: usize,
    build: impl Fn(&Record) -> Result<T>,
) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content = fs::read_to_string(path)?;

    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split("::").collect();
        if fields.len() != expected {
            return Err(DataLoadError::FieldCountMismatch {
                file: file.clone(),
                expected,
                found: fields.len(),
                line: idx + 1,
            });
        }

        let record = Record {
            file: &file,
            line: idx + 1,
            fields,
        };
        out.push(build(&record)?);
    }
    Ok(out)
}

/// Parse the songs.dat file
pub fn parse_songs(path: &Path) -> Result<Vec<Song>> {
    parse_records(path, SONG_FIELDS, |r| {
        let popularity: u8 = r.parse(5, "popularity")?;
        if popularity > 100 {
            return Err(DataLoadError::InvalidValue {
                field: "popularity".to_string(),
                value: popularity.to_string(),
            });
        }

        Ok(Song {
            id: r.text(0).to_string(),
            title: r.text(1).to_string(),
            artist: r.text(2).to_string(),
            album: r.text(3).to_string(),
            genre: r.text(4).to_string(),
            popularity,
            duration_ms: r.parse(6, "duration_ms")?,
            features: AudioFeatures {
                danceability: r.parse(7, "danceability")?,
                energy: r.parse(8, "energy")?,
                key: r.parse(9, "key")?,
                loudness: r.parse(10, "loudness")?,
                mode: r.parse(11, "mode")?,
                speechiness: r.parse(12, "speechiness")?,
                acousticness: r.parse(13, "acousticness")?,
                instrumentalness: r.parse(14, "instrumentalness")?,
                liveness: r.parse(15, "liveness")?,
                valence: r.parse(16, "valence")?,
                tempo: r.parse(17, "tempo")?,
                time_signature: r.parse(18, "time_signature")?,
            },
        })
    })
}

/// Parse the users.dat file
pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    parse_records(path, USER_FIELDS, |r| {
        Ok(User {
            id: r.parse(0, "userId")?,
            username: r.text(1).to_string(),
        })
    })
}

/// Parse the likes.dat file
pub fn parse_likes(path: &Path) -> Result<Vec<Like>> {
    parse_records(path, LIKE_FIELDS, |r| {
        Ok(Like {
            user_id: r.parse(0, "userId")?,
            song_id: r.text(1).to_string(),
            liked_at: r.parse(2, "likedAt")?,
        })
    })
}

/// Parse the plays.dat file
pub fn parse_plays(path: &Path) -> Result<Vec<Play>> {
    parse_records(path, PLAY_FIELDS, |r| {
        Ok(Play {
            user_id: r.parse(0, "userId")?,
            song_id: r.text(1).to_string(),
            play_count: r.parse(2, "playCount")?,
            last_played: r.parse(3, "lastPlayed")?,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "catalog-parser-{}-{}",
            std::process::id(),
            name.replace('.', "-")
        ));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_songs() {
        let path = write_temp(
            "songs.dat",
            "# header comment\n\
             s1::Blinding Lights::The Weeknd::After Hours::pop::95::200040::0.514::0.73::1::-5.934::1::0.0598::0.00146::0.000095::0.0897::0.334::171.005::4\n\
             \n",
        );
        let songs = parse_songs(&path).unwrap();
        assert_eq!(songs.len(), 1);
        let song = &songs[0];
        assert_eq!(song.id, "s1");
        assert_eq!(song.artist, "The Weeknd");
        assert_eq!(song.popularity, 95);
        assert_eq!(song.features.key, 1);
        assert!((song.features.loudness + 5.934).abs() < 1e-9);
        assert_eq!(song.features.time_signature, 4);
    }

    #[test]
    fn test_parse_songs_field_count() {
        let path = write_temp("short_songs.dat", "s1::Title::Artist\n");
        let err = parse_songs(&path).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::FieldCountMismatch {
                expected: 19,
                found: 3,
                line: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_songs_rejects_popularity_over_100() {
        let path = write_temp(
            "loud_songs.dat",
            "s1::T::A::B::pop::101::1::0::0::0::0::0::0::0::0::0::0::0::4\n",
        );
        assert!(matches!(
            parse_songs(&path),
            Err(DataLoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_parse_likes_and_plays() {
        let likes = write_temp("likes.dat", "1::s1::1700000000\n2::s2::1700000100\n");
        let plays = write_temp("plays.dat", "1::s1::3::1700000500\n");

        let likes = parse_likes(&likes).unwrap();
        assert_eq!(likes.len(), 2);
        assert_eq!(likes[1].user_id, 2);

        let plays = parse_plays(&plays).unwrap();
        assert_eq!(plays[0].play_count, 3);
        assert_eq!(plays[0].last_played, 1_700_000_500);
    }

    #[test]
    fn test_parse_error_carries_line() {
        let path = write_temp("bad_users.dat", "1::ana\nnope::bob\n");
        match parse_users(&path) {
            Err(DataLoadError::ParseError { line, reason, .. }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("userId"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = parse_users(Path::new("/definitely/not/here/users.dat"));
        assert!(matches!(result, Err(DataLoadError::FileNotFound { .. })));
    }
}
