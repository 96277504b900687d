use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub topic_id: String,
    #[serde(default)]
    pub category_ids: Vec<String>,
    pub statement: String,
    pub answer: String,
    #[serde(default)]
    pub is_box: bool,
}

impl Question {
    pub fn new(topic_id: &str, statement: &str, answer: &str, is_box: bool) -> Self {
        Question {
            id: Uuid::new_v4().to_string(),
            topic_id: topic_id.to_string(),
            category_ids: Vec::new(),
            statement: statement.to_string(),
            answer: answer.to_string(),
            is_box,
        }
    }

    pub fn has_category(&self) -> bool {
        !self.category_ids.is_empty()
    }

    /// Adds categories not already attached, keeping insertion order.
    pub fn add_categories<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        for id in ids {
            if !self.category_ids.contains(&id) {
                self.category_ids.push(id);
            }
        }
    }

    pub fn short_statement(&self) -> String {
        if self.statement.chars().count() > 75 {
            let head: String = self.statement.chars().take(75).collect();
            format!("{}...", head)
        } else {
            self.statement.clone()
        }
    }
}
