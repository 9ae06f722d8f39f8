//! Example: Build a listening profile and recommend for one user
//!
//! Run with: cargo run --package sources --example profile_and_recommend
//!
//! This example shows how to:
//! 1. Load the sample catalog snapshot
//! 2. Build a user profile from the behavior store
//! 3. Generate content recommendations from the user's most recent like
//! 4. Generate collaborative recommendations for the user
//! 5. Display the results

use catalog::{CatalogIndex, UserBehaviorStore};
use sources::{CollaborativeRecommender, ContentRecommender, build_user_profile};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("=== SongRecs Recommendation Example ===\n");

    println!("Loading sample catalog...");
    let start = Instant::now();
    let index = Arc::new(CatalogIndex::load_from_dir(Path::new("data/sample"))?);
    println!("Loaded catalog in {:?}\n", start.elapsed());

    let user_id = 1;
    let history = index.get_user(user_id)?;
    println!("Target User: {}", user_id);
    println!("  Likes: {}", history.likes.len());
    println!("  Played songs: {}\n", history.plays.len());

    println!("Building user profile...");
    let start = Instant::now();
    let profile = build_user_profile(index.as_ref(), &history)?;
    println!("Built profile in {:?}", start.elapsed());
    println!("  Known songs: {}", profile.known_songs.len());
    println!("  Liked genres: {}", profile.genre_counts.len());
    println!("  Liked artists: {}\n", profile.liked_artists.len());

    let Some(seed) = index.most_recent_like(user_id)? else {
        println!("User {} has no likes, nothing to seed content with", user_id);
        return Ok(());
    };

    println!("Content recommendations from {}...", seed.song_id);
    let start = Instant::now();
    let content = ContentRecommender::new(index.clone())
        .with_similarity_threshold(0.5)
        .recommend(&seed.song_id, 5)?;
    let content_time = start.elapsed();
    for (i, r) in content.iter().enumerate() {
        println!("  {}. {} by {} ({:.3})", i + 1, r.song.title, r.song.artist, r.score);
    }

    println!("\nCollaborative recommendations...");
    let start = Instant::now();
    let collaborative = CollaborativeRecommender::new(index.clone(), index.clone()).recommend(user_id, 5)?;
    let collaborative_time = start.elapsed();
    for (i, r) in collaborative.iter().enumerate() {
        println!("  {}. {} [{}] ({:.3})", i + 1, r.song.title, r.song.genre, r.score);
    }

    let content_ids: HashSet<_> = content.iter().map(|r| r.song.id.as_str()).collect();
    let collaborative_ids: HashSet<_> = collaborative.iter().map(|r| r.song.id.as_str()).collect();
    println!(
        "\nOverlap between strategies: {} songs",
        content_ids.intersection(&collaborative_ids).count()
    );
    println!("Content time: {:?}", content_time);
    println!("Collaborative time: {:?}", collaborative_time);

    Ok(())
}
