use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    /// Id of the answered question.
    #[validate(length(min = 1, message = "question is required"))]
    pub question: String,

    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1))]
    pub topic_id: String,

    #[validate(length(min = 1, max = 1000))]
    pub statement: String,

    #[validate(length(min = 1, max = 255))]
    pub answer: String,

    #[serde(default)]
    pub category_ids: Vec<String>,

    /// Defaults to whether the topic is a "Mystery Box" topic.
    #[serde(default)]
    pub is_box: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateQuestionCategoriesRequest {
    #[validate(length(min = 1, message = "category_ids must not be empty"))]
    pub category_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkUpdateQuestionCategoriesRequest {
    #[validate(length(min = 1, message = "question_ids must not be empty"))]
    pub question_ids: Vec<String>,

    #[validate(length(min = 1, message = "category_ids must not be empty"))]
    pub category_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TopicCategorizationRequest {
    #[validate(length(min = 1, message = "first_half_topics must not be empty"))]
    pub first_half_topics: Vec<String>,

    #[validate(length(min = 1, message = "second_half_topics must not be empty"))]
    pub second_half_topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AptitudeRequest {
    #[validate(length(min = 1, message = "user_ids must not be empty"))]
    pub user_ids: Vec<String>,

    /// Repeating a category id raises its weight.
    #[validate(length(min = 1, message = "category_ids must not be empty"))]
    pub category_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TopicSpec {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(length(min = 1, message = "category_ids must not be empty"))]
    pub category_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TopicExpectationRequest {
    #[validate(length(min = 1, message = "user_ids must not be empty"))]
    pub user_ids: Vec<String>,

    #[validate(length(min = 1, message = "topics must not be empty"), nested)]
    pub topics: Vec<TopicSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryStatsQuery {
    /// `me` or a user id; all respondents when absent.
    pub user: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_answer_requires_question_id() {
        let request = SubmitAnswerRequest {
            question: String::new(),
            is_correct: true,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn submit_answer_rejects_missing_is_correct() {
        let parsed = serde_json::from_str::<SubmitAnswerRequest>(r#"{"question":"q-1"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn topic_categorization_rejects_empty_halves() {
        let request = TopicCategorizationRequest {
            first_half_topics: vec!["History".to_string()],
            second_half_topics: vec![],
        };
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("second_half_topics"));
    }

    #[test]
    fn topic_expectation_validates_nested_topics() {
        let request = TopicExpectationRequest {
            user_ids: vec!["u-1".to_string()],
            topics: vec![TopicSpec {
                name: "Sports".to_string(),
                category_ids: vec![],
            }],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn create_question_defaults_optional_fields() {
        let json = r#"{"topic_id":"t-1","statement":"Who?","answer":"Me"}"#;
        let request: CreateQuestionRequest = serde_json::from_str(json).unwrap();
        assert!(request.category_ids.is_empty());
        assert!(request.is_box.is_none());
        assert!(request.validate().is_ok());
    }
}
