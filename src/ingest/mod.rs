//! Quiz result ingestion: scrape a results page, assemble the quiz and
//! persist it through the services.

pub mod error;
pub mod html;
pub mod importer;
pub mod parser;

use serde::{Deserialize, Serialize};

pub use error::{IngestError, IngestResult};
pub use importer::{BatchSummary, ImportSummary, QuizImporter};
pub use parser::{extract_season_week, get_quiz_data, load_quiz_data};

/// One question as it appeared on the results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRow {
    pub theme: String,
    #[serde(rename = "xT", default)]
    pub xt: Option<f64>,
    #[serde(rename = "xP", default)]
    pub xp: Option<f64>,
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub guessed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPart {
    /// 1-based.
    pub sequence: i32,
    /// Sorted, Mystery Box themes excluded.
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub questions: Vec<QuizRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedQuiz {
    pub season: i32,
    pub week: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub parts: Vec<ExtractedPart>,
}
