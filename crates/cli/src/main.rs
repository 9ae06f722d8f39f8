use anyhow::{Context, Result, anyhow};
use catalog::{CatalogIndex, SongId, UserId};
use clap::{Parser, Subcommand};
use colored::Colorize;
use engine::{EngineConfig, RecommendationEngine};
use rand::seq::IndexedRandom;
use sources::{Identity, RecommendationResult, TieBreak};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// SongRecs - Song Recommendation Engine
#[derive(Parser)]
#[command(name = "song-recs")]
#[command(about = "Song recommendations from audio similarity and listening history", long_about = None)]
struct Cli {
    /// Path to the catalog snapshot directory
    #[arg(short, long, default_value = "data/sample")]
    data_dir: PathBuf,

    /// Minimum content similarity (overrides RECS_SIMILARITY_THRESHOLD)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Hybrid content weight (overrides RECS_CONTENT_WEIGHT)
    #[arg(long, global = true)]
    content_weight: Option<f64>,

    /// Hybrid collaborative weight (overrides RECS_COLLABORATIVE_WEIGHT)
    #[arg(long, global = true)]
    collaborative_weight: Option<f64>,

    /// Ordering of near-equal scores: perturb or song_id
    #[arg(long, global = true)]
    tie_break: Option<TieBreak>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Songs that sound like a given song
    Content {
        #[arg(long)]
        song_id: SongId,

        /// Number of recommendations to return (0 uses the default)
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Show the explanation for each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// Songs matching a user's listening profile
    Collaborative {
        #[arg(long)]
        user_id: UserId,

        #[arg(long, default_value = "10")]
        limit: usize,

        #[arg(long)]
        explain: bool,
    },

    /// Content similarity blended with a user's profile (user 0 is a guest)
    Hybrid {
        #[arg(long, default_value = "0")]
        user_id: UserId,

        #[arg(long)]
        song_id: SongId,

        #[arg(long, default_value = "10")]
        limit: usize,

        #[arg(long)]
        explain: bool,
    },

    /// Let the engine pick a strategy for the user (user 0 is a guest)
    Smart {
        #[arg(long, default_value = "0")]
        user_id: UserId,

        #[arg(long, default_value = "10")]
        limit: usize,

        #[arg(long)]
        explain: bool,
    },

    /// Most popular songs
    Popular {
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show a user's likes, plays and favorite genres
    User {
        #[arg(long)]
        user_id: UserId,
    },

    /// Search songs by title, artist or genre
    Search {
        /// Case-insensitive substring to look for
        #[arg(long)]
        query: String,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Users with the most similar listening history
    SimilarUsers {
        #[arg(long)]
        user_id: UserId,

        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    println!("Loading catalog from {}...", cli.data_dir.display());
    let start = Instant::now();
    let index = Arc::new(
        CatalogIndex::load_from_dir(&cli.data_dir).context("Failed to load catalog snapshot")?,
    );
    println!("{} Loaded catalog in {:?}", "✓".green(), start.elapsed());

    let engine = RecommendationEngine::new(index.clone(), index.clone(), config)
        .context("Invalid engine configuration")?;

    match cli.command {
        Commands::Content {
            song_id,
            limit,
            explain,
        } => {
            let results = engine.content(&song_id, limit)?;
            print_recommendations(&format!("Songs like {}", song_id), &results, explain);
        }
        Commands::Collaborative {
            user_id,
            limit,
            explain,
        } => {
            let results = engine.collaborative(user_id, limit)?;
            print_recommendations(&format!("For user {}", user_id), &results, explain);
        }
        Commands::Hybrid {
            user_id,
            song_id,
            limit,
            explain,
        } => {
            let identity = Identity::from_raw(user_id);
            let results = engine.hybrid(identity, &song_id, limit)?;
            print_recommendations(
                &format!("Hybrid for {} from {}", identity, song_id),
                &results,
                explain,
            );
        }
        Commands::Smart {
            user_id,
            limit,
            explain,
        } => {
            let identity = Identity::from_raw(user_id);
            let results = engine.smart(identity, limit)?;
            print_recommendations(&format!("Picked for {}", identity), &results, explain);
        }
        Commands::Popular { limit } => {
            let results = engine.popular(limit)?;
            print_recommendations("Popular right now", &results, false);
        }
        Commands::User { user_id } => handle_user(&index, user_id)?,
        Commands::Search { query, limit } => handle_search(&index, &query, limit),
        Commands::SimilarUsers { user_id, limit } => {
            handle_similar_users(&engine, &index, user_id, limit)?
        }
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(engine, &index, requests, concurrent).await?,
    }

    Ok(())
}

/// Environment (and `.env`) first, then command line flags on top.
fn build_config(cli: &Cli) -> Result<EngineConfig> {
    let config = EngineConfig::from_env().context("Failed to read RECS_* settings")?;
    let config = apply_overrides(config, cli);
    debug!(?config, "Resolved engine config");
    Ok(config)
}

fn apply_overrides(mut config: EngineConfig, cli: &Cli) -> EngineConfig {
    if let Some(threshold) = cli.threshold {
        config = config.with_similarity_threshold(threshold);
    }
    if cli.content_weight.is_some() || cli.collaborative_weight.is_some() {
        let content = cli.content_weight.unwrap_or(config.content_weight);
        let collaborative = cli.collaborative_weight.unwrap_or(config.collaborative_weight);
        config = config.with_weights(content, collaborative);
    }
    if let Some(tie_break) = cli.tie_break {
        config = config.with_tie_break(tie_break);
    }
    config
}

/// Handle the 'user' command
fn handle_user(index: &CatalogIndex, user_id: UserId) -> Result<()> {
    let user = index
        .find_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;
    let likes = index.get_user_likes(user_id);
    let plays = index.get_user_plays(user_id);

    println!("{}", format!("User {} ({})", user.id, user.username).bold().blue());
    println!("{}Likes: {}", "• ".green(), likes.len());
    println!("{}Played songs: {}", "• ".green(), plays.len());
    println!(
        "{}Total plays: {}",
        "• ".green(),
        plays.iter().map(|p| u64::from(p.play_count)).sum::<u64>()
    );

    if likes.is_empty() && plays.is_empty() {
        println!("{}", "New listener, no history yet".yellow());
        return Ok(());
    }

    let mut recent: Vec<_> = likes.iter().collect();
    recent.sort_by(|a, b| b.liked_at.cmp(&a.liked_at));
    println!("Recent likes:");
    for like in recent.iter().take(5) {
        match index.get_song(&like.song_id) {
            Some(song) => println!("  - {} by {} [{}]", song.title, song.artist, song.genre),
            None => println!("  - {} {}", like.song_id, "(no longer in catalog)".dimmed()),
        }
    }

    let mut most_played: Vec<_> = plays.iter().collect();
    most_played.sort_by(|a, b| b.play_count.cmp(&a.play_count));
    println!("Most played:");
    for play in most_played.iter().take(5) {
        let title = index
            .get_song(&play.song_id)
            .map(|s| s.title.as_str())
            .unwrap_or(play.song_id.as_str());
        println!("  - {} ({} plays)", title, play.play_count);
    }

    let mut genres: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for like in likes {
        if let Some(song) = index.get_song(&like.song_id) {
            *genres.entry(song.genre.as_str()).or_insert(0) += 1;
        }
    }
    let mut genres: Vec<_> = genres.into_iter().collect();
    genres.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    println!("Genre preferences:");
    for (genre, count) in genres {
        println!("  - {}: {} likes", genre, count);
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(index: &CatalogIndex, query: &str, limit: usize) {
    let matches = index.search(query, limit);
    println!("{}", format!("Search results for '{}':", query).bold().blue());
    if matches.is_empty() {
        println!("{}", "No songs found".yellow());
        return;
    }
    for song in matches {
        println!(
            "{}: {} by {} [{}] popularity {}",
            song.id, song.title, song.artist, song.genre, song.popularity
        );
    }
}

/// Handle the 'similar-users' command
fn handle_similar_users(
    engine: &RecommendationEngine,
    index: &CatalogIndex,
    user_id: UserId,
    limit: usize,
) -> Result<()> {
    let mut scored = Vec::new();
    for other in index.user_ids() {
        if other == user_id {
            continue;
        }
        scored.push((other, engine.user_similarity(user_id, other)?));
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    println!("{}", format!("Listeners like user {}:", user_id).bold().blue());
    for (rank, (other, similarity)) in scored.iter().take(limit).enumerate() {
        let name = index
            .find_user(*other)
            .map(|u| u.username.as_str())
            .unwrap_or("?");
        println!(
            "{}. user {} ({}) - similarity {:.2}",
            (rank + 1).to_string().green(),
            other,
            name,
            similarity
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    engine: RecommendationEngine,
    index: &CatalogIndex,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let user_ids = index.user_ids();
    if user_ids.is_empty() || requests == 0 {
        return Err(anyhow!("Nothing to benchmark: need at least one user and one request"));
    }

    let mut rng = rand::rng();
    let targets: Vec<UserId> = (0..requests)
        .filter_map(|_| user_ids.choose(&mut rng).copied())
        .collect();

    println!(
        "Running {} smart requests, {} at a time...",
        targets.len(),
        concurrent.max(1)
    );

    let wall = Instant::now();
    let mut timings: Vec<Duration> = Vec::with_capacity(targets.len());
    for batch in targets.chunks(concurrent.max(1)) {
        let mut handles = Vec::with_capacity(batch.len());
        for &user_id in batch {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                tokio::task::spawn_blocking(move || {
                    let start = Instant::now();
                    engine.smart(Identity::User(user_id), 10)?;
                    Ok::<_, anyhow::Error>(start.elapsed())
                })
                .await?
            }));
        }
        for handle in handles {
            timings.push(handle.await??);
        }
    }
    let total_time = wall.elapsed();

    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_recommendations(header: &str, results: &[RecommendationResult], explain: bool) {
    println!("{}", format!("{}:", header).bold().blue());
    if results.is_empty() {
        println!("{}", "No recommendations".yellow());
        return;
    }
    for result in results {
        let song = &result.song;
        let liked = if result.is_liked { " ♥".red().to_string() } else { String::new() };
        println!(
            "{}. {} by {} [{}] - Score: {:.2} ({}){}",
            result.rank.to_string().green(),
            song.title,
            song.artist,
            song.genre,
            result.score,
            result.kind,
            liked
        );
        if explain {
            if let Some(explanation) = &result.explanation {
                println!("   {}", explanation.dimmed());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "song-recs",
            "--threshold",
            "0.55",
            "--collaborative-weight",
            "0.2",
            "--tie-break",
            "song_id",
            "popular",
        ]);
        let config = apply_overrides(EngineConfig::default(), &cli);

        assert_eq!(config.similarity_threshold, 0.55);
        assert_eq!(config.content_weight, 0.5);
        assert_eq!(config.collaborative_weight, 0.2);
        assert_eq!(config.tie_break, TieBreak::SongId);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::parse_from(["song-recs", "search", "--query", "neon"]);
        let base = EngineConfig::default().with_weights(0.8, 0.3);
        assert_eq!(apply_overrides(base.clone(), &cli), base);
    }
}
