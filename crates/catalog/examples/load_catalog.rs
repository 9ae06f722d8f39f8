use catalog::CatalogIndex;
use std::path::PathBuf;
use std::time::Instant;

fn main() {
    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/sample"));

    println!("Loading catalog snapshot from {}...\n", data_dir.display());

    let start = Instant::now();
    let index = CatalogIndex::load_from_dir(&data_dir).expect("Failed to load catalog");
    let elapsed = start.elapsed();

    let (users, songs, likes, plays) = index.counts();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", users);
    println!("Songs: {}", songs);
    println!("Likes: {}", likes);
    println!("Plays: {}", plays);

    let mut genres: Vec<_> = index.genre_counts().into_iter().collect();
    genres.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    println!("\nGenres:");
    for (genre, count) in genres {
        println!("  {:<12} {}", genre, count);
    }

    println!(
        "\nPerformance: {:.0} records/second",
        (songs + likes + plays) as f64 / elapsed.as_secs_f64()
    );
}
