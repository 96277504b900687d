use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    error::{IngestError, IngestResult},
    html, ExtractedPart, ExtractedQuiz,
};
use crate::models::domain::quiz::is_box_theme;

static SEASON_WEEK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"QNpt(\d+)[_-]([^.?#]+)").expect("static regex pattern is valid")
});

/// Season and week from a results URL such as `.../QNpt3_II4.html`.
///
/// Leading `I`s are dropped from the week, and a letter followed by a digit
/// (a group stage like `J2`) becomes `G2`.
pub fn extract_season_week(url: &str) -> IngestResult<(i32, String)> {
    let caps = SEASON_WEEK.captures(url).ok_or_else(|| {
        IngestError::Parse(format!("Could not extract season and week from: {}", url))
    })?;

    let season = caps[1]
        .parse::<i32>()
        .map_err(|e| IngestError::Parse(format!("Invalid season in {}: {}", url, e)))?;

    let mut week = caps[2].trim_start_matches('I').to_string();
    let mut chars = week.chars();
    if let (Some(first), Some(second)) = (chars.next(), chars.next()) {
        if !first.is_ascii_digit() && second.is_ascii_digit() {
            week = format!("G{}", &week[first.len_utf8()..]);
        }
    }

    if week.is_empty() {
        return Err(IngestError::Parse(format!("Empty week in {}", url)));
    }
    Ok((season, week))
}

/// Assembles a quiz from an already downloaded results page.
pub fn build_quiz(url: &str, page: &str, team: &str) -> IngestResult<ExtractedQuiz> {
    let (season, week) = extract_season_week(url)?;
    let title = html::extract_page_title(page);

    let rows = match html::find_game_blob(page, team) {
        Some(blob) => html::extract_quiz_rows(&blob),
        None => Vec::new(),
    };

    let parts = rows
        .into_iter()
        .enumerate()
        .map(|(idx, mut questions)| {
            html::sort_rows(&mut questions);
            let themes = html::sorted_themes(&questions)
                .into_iter()
                .filter(|theme| !is_box_theme(theme))
                .collect();
            ExtractedPart {
                sequence: idx as i32 + 1,
                themes,
                questions,
            }
        })
        .collect();

    Ok(ExtractedQuiz {
        season,
        week,
        title,
        parts,
    })
}

pub async fn get_quiz_data(url: &str, team: &str) -> IngestResult<ExtractedQuiz> {
    // Fail on a malformed URL before touching the network.
    extract_season_week(url)?;

    let page = html::fetch_page(url).await?;
    let quiz = build_quiz(url, &page, team)?;

    log::info!(
        "Extracted '{}' (season {}, week {}): {} parts",
        quiz.title,
        quiz.season,
        quiz.week,
        quiz.parts.len()
    );
    Ok(quiz)
}

/// Reads a quiz previously extracted to JSON.
pub async fn load_quiz_data(path: impl AsRef<Path>) -> IngestResult<ExtractedQuiz> {
    let contents = tokio::fs::read_to_string(path.as_ref()).await?;
    Ok(serde_json::from_str(&contents)?)
}
