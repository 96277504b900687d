use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user's verdict on one question. Unique per (user, question).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserAnswer {
    pub id: String,
    pub user_id: String,
    pub question_id: String,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAnswer {
    pub fn new(user_id: &str, question_id: &str, is_correct: bool) -> Self {
        let now = Utc::now();
        UserAnswer {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            question_id: question_id.to_string(),
            is_correct,
            created_at: now,
            updated_at: now,
        }
    }
}
