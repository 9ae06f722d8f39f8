//! Human-readable explanation lines attached to results.

use catalog::Song;

const SEPARATOR: &str = " • ";

fn percent(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

/// Why `candidate` was recommended for `seed`.
pub fn content_explanation(seed: &Song, candidate: &Song, score: f64) -> String {
    let mut parts = vec![format!("Similarity score: {}%", percent(score))];

    if seed.same_artist(candidate) {
        parts.push(format!("Same artist: {}", seed.artist));
    }
    if seed.same_genre(candidate) {
        parts.push(format!("Same genre: {}", seed.genre));
    }

    let a = &seed.features;
    let b = &candidate.features;
    if (a.danceability - b.danceability).abs() < 0.1 {
        parts.push("Similar danceability".to_string());
    }
    if (a.energy - b.energy).abs() < 0.1 {
        parts.push("Similar energy level".to_string());
    }
    if (a.valence - b.valence).abs() < 0.15 {
        let mood = if a.valence > 0.7 {
            "upbeat/positive"
        } else if a.valence < 0.3 {
            "mellow/sad"
        } else {
            "neutral"
        };
        parts.push(format!("Similar mood: {}", mood));
    }

    if parts.len() == 1 {
        let tier = if score >= 0.8 {
            "Very high audio feature match"
        } else if score >= 0.6 {
            "Good audio feature match"
        } else {
            "Moderate audio feature match"
        };
        parts.push(tier.to_string());
    }

    parts.join(SEPARATOR)
}

pub fn collaborative_explanation(song: &Song, score: f64) -> String {
    let mut parts = vec![
        format!("Match score: {}%", percent(score)),
        "Based on your listening profile".to_string(),
    ];
    if song.popularity > 80 {
        parts.push("Highly popular".to_string());
    } else if song.popularity > 60 {
        parts.push("Popular".to_string());
    }
    parts.join(SEPARATOR)
}

pub fn hybrid_explanation(score: f64) -> String {
    [
        format!("Hybrid score: {}%", percent(score)),
        "Combines content similarity and your preferences".to_string(),
    ]
    .join(SEPARATOR)
}

pub fn popular_explanation(song: &Song) -> String {
    let mut parts = vec!["Popular right now".to_string()];
    if song.popularity > 75 {
        parts.push("Trending now".to_string());
    }
    parts.join(SEPARATOR)
}
