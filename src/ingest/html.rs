//! Extraction of quiz rows from a published results page.
//!
//! The page is an R Markdown report: every game sits in a
//! `<div class="level3" id=...>` section holding an htmlwidgets
//! `<script type="application/json">` payload. Each `x.data` trace of the
//! tracked team's game is one quiz part; its `text` array carries one
//! HTML-formatted row per question.

use std::{cmp::Ordering, collections::BTreeSet, time::Duration};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{
    error::{IngestError, IngestResult},
    QuizRow,
};
use crate::models::domain::quiz::is_box_theme;

pub const USER_AGENT: &str = "Mozilla/5.0";

/// Section ids holding leaderboards rather than games.
pub const EXCLUDED_SECTION_PREFIXES: [&str; 4] =
    ["mvp-global", "mvp-jornada", "temas", "classificação"];

/// Points awarded for a correct answer.
pub const GUESSED_POINTS: &str = "2";

const ANSWER_LABEL: &str = "Resposta";

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex pattern is valid")
}

static TITLE: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<title[^>]*>(.*?)</title>"));
static DIV_OPEN: Lazy<Regex> = Lazy::new(|| regex(r"(?i)<div\b([^>]*)>"));
static ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| regex(r#"(?i)\b(class|id)\s*=\s*(?:"([^"]*)"|'([^']*)')"#));
static JSON_SCRIPT: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?is)<script\b[^>]*type\s*=\s*["']application/json["'][^>]*>(.*?)</script>"#)
});
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| regex(r"(?i)<br\s*/?>"));
static BOLD: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<b\b[^>]*>(.*?)</b>"));
static ITALIC: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<i\b[^>]*>(.*?)</i>"));
static ANSWER: Lazy<Regex> = Lazy::new(|| {
    regex(&format!(
        r"(?is)<b\b[^>]*>\s*{}\s*</b>.*?<i\b[^>]*>(.*?)</i>",
        ANSWER_LABEL
    ))
});
static THEME_SCORES: Lazy<Regex> =
    Lazy::new(|| regex(r"^(.*?)\s*\(xT\s*=\s*([\d.]+),\s*xP\s*=\s*([\d.]+)\)"));
static PART_PREFIX: Lazy<Regex> = Lazy::new(|| regex(r"^Parte\s\d\s"));
static TAG: Lazy<Regex> = Lazy::new(|| regex(r"<[^>]*>"));
static ENTITY: Lazy<Regex> =
    Lazy::new(|| regex(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);"));

pub async fn fetch_page(url: &str) -> IngestResult<String> {
    let fetch_error = |source: reqwest::Error| IngestError::Fetch {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(fetch_error)?;

    let body = client
        .get(url)
        .send()
        .await
        .map_err(fetch_error)?
        .error_for_status()
        .map_err(fetch_error)?
        .bytes()
        .await
        .map_err(fetch_error)?;

    log::debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(String::from_utf8_lossy(&body).into_owned())
}

pub fn extract_page_title(html: &str) -> String {
    TITLE
        .captures(html)
        .map(|caps| text_of(&caps[1]))
        .unwrap_or_default()
}

/// Payload of the first game whose chart title mentions `team`.
pub fn find_game_blob(html: &str, team: &str) -> Option<Value> {
    for (id, section) in level3_sections(html) {
        if id.is_empty()
            || EXCLUDED_SECTION_PREFIXES
                .iter()
                .any(|prefix| id.starts_with(prefix))
        {
            continue;
        }

        let Some(payload) = JSON_SCRIPT.captures(section).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let blob: Value = match serde_json::from_str(payload.as_str().trim()) {
            Ok(blob) => blob,
            Err(e) => {
                log::debug!("Skipping section '{}': {}", id, e);
                continue;
            }
        };
        let Some(title) = blob.pointer("/x/layout/title/text").and_then(Value::as_str) else {
            continue;
        };

        if title.contains(team) {
            log::debug!("Found game for '{}' in section '{}'", team, id);
            return Some(blob);
        }
    }

    log::warn!("Did not find a game for team '{}'", team);
    None
}

/// One list of rows per quiz part. Traces without `text` are not parts;
/// rows that cannot be parsed are dropped.
pub fn extract_quiz_rows(blob: &Value) -> Vec<Vec<QuizRow>> {
    let Some(traces) = blob.pointer("/x/data").and_then(Value::as_array) else {
        log::warn!("Game payload has no x.data array");
        return Vec::new();
    };

    traces
        .iter()
        .filter_map(|trace| match trace.get("text")? {
            Value::Array(rows) => Some(
                rows.iter()
                    .filter_map(Value::as_str)
                    .filter_map(parse_row)
                    .collect(),
            ),
            Value::String(row) => Some(parse_row(row).into_iter().collect()),
            _ => Some(Vec::new()),
        })
        .collect()
}

/// `<b>Player - Team</b><br/>Theme (xT = 1.2, xP = 0.8)<br/>...<b>points</b>`
pub fn parse_row(row: &str) -> Option<QuizRow> {
    let segments: Vec<&str> = LINE_BREAK.split(row).collect();
    if segments.len() < 2 {
        return None;
    }

    let player_and_team = first_bold(segments[0])?;
    let mut names = player_and_team.splitn(3, " - ");
    let (player, team) = (names.next()?, names.next()?);
    let points = first_bold(segments.last()?)?;

    let theme_line = text_of(segments[1]);
    let caps = THEME_SCORES.captures(&theme_line)?;
    let theme = PART_PREFIX.replace(caps[1].trim(), "").trim().to_string();
    let xt = caps[2].parse::<f64>().ok()?;
    let xp = caps[3].parse::<f64>().ok()?;

    let question = ITALIC
        .captures(row)
        .map(|c| text_of(&c[1]))
        .unwrap_or_default();
    let answer = ANSWER
        .captures(row)
        .map(|c| text_of(&c[1]))
        .unwrap_or_default();

    Some(QuizRow {
        theme,
        xt: Some(xt),
        xp: Some(xp),
        question,
        answer,
        player: Some(player.trim().to_string()),
        team: Some(team.trim().to_string()),
        guessed: points == GUESSED_POINTS,
    })
}

/// Alphabetical by theme, Mystery Box themes last.
pub fn sort_rows(rows: &mut [QuizRow]) {
    rows.sort_by(|a, b| theme_order(&a.theme, &b.theme));
}

pub fn sorted_themes(rows: &[QuizRow]) -> Vec<String> {
    let mut themes: Vec<String> = rows
        .iter()
        .map(|row| row.theme.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    themes.sort_by(|a, b| theme_order(a, b));
    themes
}

fn theme_order(a: &str, b: &str) -> Ordering {
    is_box_theme(a)
        .cmp(&is_box_theme(b))
        .then_with(|| a.cmp(b))
}

/// `(id, markup)` for every level3 section; a section ends where the next
/// one starts.
fn level3_sections(html: &str) -> Vec<(String, &str)> {
    let openings: Vec<(usize, usize, String)> = DIV_OPEN
        .captures_iter(html)
        .filter_map(|caps| {
            let tag = caps.get(0)?;
            let (classes, id) = class_and_id(caps.get(1)?.as_str());
            classes
                .split_whitespace()
                .any(|class| class == "level3")
                .then(|| (tag.start(), tag.end(), id))
        })
        .collect();

    openings
        .iter()
        .enumerate()
        .map(|(idx, (_, body_start, id))| {
            let end = openings
                .get(idx + 1)
                .map(|(next_start, _, _)| *next_start)
                .unwrap_or(html.len());
            (id.clone(), &html[*body_start..end])
        })
        .collect()
}

fn class_and_id(attributes: &str) -> (String, String) {
    let mut classes = String::new();
    let mut id = String::new();

    for caps in ATTRIBUTE.captures_iter(attributes) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| decode_entities(m.as_str()))
            .unwrap_or_default();
        if caps[1].eq_ignore_ascii_case("class") {
            classes = value;
        } else {
            id = value;
        }
    }
    (classes, id)
}

fn first_bold(fragment: &str) -> Option<String> {
    BOLD.captures(fragment).map(|caps| text_of(&caps[1]))
}

/// Visible text of an HTML fragment.
fn text_of(fragment: &str) -> String {
    let spaced = LINE_BREAK.replace_all(fragment, " ");
    let stripped = TAG.replace_all(&spaced, "");
    decode_entities(&stripped).trim().to_string()
}

pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "aacute" => 'á',
        "Aacute" => 'Á',
        "agrave" => 'à',
        "Agrave" => 'À',
        "acirc" => 'â',
        "Acirc" => 'Â',
        "atilde" => 'ã',
        "Atilde" => 'Ã',
        "ccedil" => 'ç',
        "Ccedil" => 'Ç',
        "eacute" => 'é',
        "Eacute" => 'É',
        "ecirc" => 'ê',
        "Ecirc" => 'Ê',
        "iacute" => 'í',
        "Iacute" => 'Í',
        "oacute" => 'ó',
        "Oacute" => 'Ó',
        "ocirc" => 'ô',
        "Ocirc" => 'Ô',
        "otilde" => 'õ',
        "Otilde" => 'Õ',
        "uacute" => 'ú',
        "Uacute" => 'Ú',
        "uuml" => 'ü',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    pub const ROW_GUESSED: &str = "<b>Ana Silva - José Figueiras</b><br />Parte 1 Cinema (xT = 1.2, xP = 0.8)<br /><i>Who directed Vertigo?</i><br /><b>Resposta</b>: <i>Alfred Hitchcock</i><br /><b>2</b>";
    pub const ROW_BOX: &str = "<b>Rui Costa - Jos&eacute; Figueiras</b><br/>Mystery Box (xT = 0.5, xP = 1.0)<br/><i>Capital of Peru?</i><br/><b>Resposta</b> <i>Lima &amp; Callao</i><br/><b>0</b>";
    pub const ROW_MISSED: &str = "<b>Equipa - José Figueiras</b><br>Art (xT = 0.4, xP = 0.2)<br><i>Who painted Guernica?</i><br><b>Resposta</b>: <i>Picasso</i><br><b>1</b>";

    pub fn game_payload(title: &str) -> Value {
        json!({
            "x": {
                "layout": { "title": { "text": title } },
                "data": [
                    { "text": [ROW_BOX, ROW_GUESSED, "<b>broken</b>"] },
                    { "name": "legend only" },
                    { "text": [ROW_MISSED] }
                ]
            }
        })
    }

    pub fn results_page(team_title: &str) -> String {
        let decoy = json!({ "x": { "layout": { "title": { "text": team_title } }, "data": [] } });
        let rivals = json!({ "x": { "layout": { "title": { "text": "Rivals FC" } }, "data": [] } });
        format!(
            r#"<html><head><title> Quiz Night &amp; Friends </title></head><body>
<div class="section level3" id="mvp-global"><script type="application/json">{decoy}</script></div>
<div class="section level3" id="jogo-1"><p>chart</p><script type="application/json">not json</script></div>
<div class="section level3" id="jogo-2"><script type="application/json">{rivals}</script></div>
<div class="section level3" id="jogo-3"><div class="html-widget"><script type="application/json" data-for="w3">{game}</script></div></div>
</body></html>"#,
            decoy = decoy,
            rivals = rivals,
            game = game_payload(team_title),
        )
    }
}
