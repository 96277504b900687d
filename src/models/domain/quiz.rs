use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Themes starting with this prefix are the special "box" questions.
pub const MYSTERY_BOX_PREFIX: &str = "Mystery Box";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub season: i32,
    pub week: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn new(season: i32, week: &str) -> Self {
        Quiz {
            id: Uuid::new_v4().to_string(),
            season,
            week: week.to_string(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn label(&self) -> String {
        format!("Season {} - Week {}", self.season, self.week)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizPart {
    pub id: String,
    pub quiz_id: String,
    pub sequence: i32,
    /// Path of an attached slide deck, if one was uploaded for this part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slides_path: Option<String>,
}

impl QuizPart {
    pub fn new(quiz_id: &str, sequence: i32) -> Self {
        QuizPart {
            id: Uuid::new_v4().to_string(),
            quiz_id: quiz_id.to_string(),
            sequence,
            slides_path: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub quiz_part_id: String,
}

impl Topic {
    pub fn new(quiz_part_id: &str, title: &str) -> Self {
        Topic {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            quiz_part_id: quiz_part_id.to_string(),
        }
    }

    pub fn is_box(&self) -> bool {
        is_box_theme(&self.title)
    }
}

pub fn is_box_theme(theme: &str) -> bool {
    theme.starts_with(MYSTERY_BOX_PREFIX)
}
