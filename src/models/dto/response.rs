use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{Category, CategoryGroup, Question, Quiz, QuizPart, Team, Topic, User, UserAnswer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAnswerDto {
    pub id: String,
    pub question: String,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserAnswer> for UserAnswerDto {
    fn from(answer: UserAnswer) -> Self {
        UserAnswerDto {
            id: answer.id,
            question: answer.question_id,
            is_correct: answer.is_correct,
            created_at: answer.created_at,
            updated_at: answer.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        CategoryDto {
            id: category.id.clone(),
            name: category.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroupDto {
    pub id: String,
    pub name: String,
    pub categories: Vec<CategoryDto>,
}

impl CategoryGroupDto {
    pub fn new(group: &CategoryGroup, categories: &[Category]) -> Self {
        CategoryGroupDto {
            id: group.id.clone(),
            name: group.name.clone(),
            categories: categories
                .iter()
                .filter(|c| c.group_id == group.id)
                .map(CategoryDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDto {
    pub id: String,
    pub statement: String,
    pub answer: String,
    pub is_box: bool,
    pub categories: Vec<CategoryDto>,
}

impl QuestionDto {
    pub fn new(question: &Question, categories: &[Category]) -> Self {
        QuestionDto {
            id: question.id.clone(),
            statement: question.statement.clone(),
            answer: question.answer.clone(),
            is_box: question.is_box,
            categories: question
                .category_ids
                .iter()
                .filter_map(|id| categories.iter().find(|c| &c.id == id))
                .map(CategoryDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicDto {
    pub id: String,
    pub title: String,
    pub questions: Vec<QuestionDto>,
}

impl TopicDto {
    pub fn new(topic: &Topic, questions: Vec<QuestionDto>) -> Self {
        TopicDto {
            id: topic.id.clone(),
            title: topic.title.clone(),
            questions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizPartDto {
    pub id: String,
    pub sequence: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slides_path: Option<String>,
    pub topics: Vec<TopicDto>,
}

impl QuizPartDto {
    pub fn new(part: &QuizPart, topics: Vec<TopicDto>) -> Self {
        QuizPartDto {
            id: part.id.clone(),
            sequence: part.sequence,
            slides_path: part.slides_path.clone(),
            topics,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDto {
    pub id: String,
    pub season: i32,
    pub week: String,
    pub parts: Vec<QuizPartDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummaryDto {
    pub id: String,
    pub season: i32,
    pub week: String,
}

impl From<&Quiz> for QuizSummaryDto {
    fn from(quiz: &Quiz) -> Self {
        QuizSummaryDto {
            id: quiz.id.clone(),
            season: quiz.season,
            week: quiz.week.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizProgressDto {
    pub id: String,
    pub season: i32,
    pub week: String,
    /// Percentage of the quiz's questions the user has answered.
    pub progress: f64,
    /// Percentage of the answered questions that were correct.
    pub correct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomTopicResponse {
    pub message: String,
    pub result: Option<TopicDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatsDto {
    pub category_id: String,
    pub category_name: String,
    pub category_group_id: String,
    #[serde(rename = "xC")]
    pub xc: f64,
    pub answered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredCategoryStatsDto {
    pub category_name: String,
    #[serde(rename = "xC")]
    pub xc: f64,
    pub answered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroupStatsDto {
    pub group_id: String,
    pub group_name: String,
    #[serde(rename = "xC")]
    pub xc: f64,
    pub answered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserScoreDto {
    pub user: String,
    #[serde(rename = "xC")]
    pub xc: f64,
    pub answered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryUserStatsDto {
    pub category_name: String,
    pub users: Vec<UserScoreDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AptitudeDto {
    pub user_id: String,
    pub aptitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicScoreDto {
    pub topic: String,
    #[serde(rename = "xT")]
    pub xt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTopicScoresDto {
    pub user_id: String,
    pub topics: Vec<TopicScoreDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamTopicScoresDto {
    pub topics: Vec<TopicScoreDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicExpectationResponse {
    pub team: TeamTopicScoresDto,
    pub users: Vec<UserTopicScoresDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStatsDto {
    pub question_id: String,
    #[serde(rename = "xP")]
    pub xp: f64,
    pub answered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedTopicDto {
    pub topic: String,
    pub categories: Vec<CategoryDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCategorizationResponse {
    pub first_half_categories: Vec<CategorizedTopicDto>,
    pub second_half_categories: Vec<CategorizedTopicDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListDto {
    pub id: String,
    pub username: String,
    pub full_name: String,
}

impl From<&User> for UserListDto {
    fn from(user: &User) -> Self {
        UserListDto {
            id: user.id.clone(),
            username: user.username.clone(),
            full_name: user.full_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSummaryDto {
    pub id: String,
    pub name: String,
}

impl From<&Team> for TeamSummaryDto {
    fn from(team: &Team) -> Self {
        TeamSummaryDto {
            id: team.id.clone(),
            name: team.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetailDto {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub is_staff: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub groups: Vec<TeamSummaryDto>,
}

impl UserDetailDto {
    pub fn new(user: &User, teams: &[Team]) -> Self {
        UserDetailDto {
            id: user.id.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            email: user.email.clone(),
            is_staff: user.is_staff,
            last_login: user.last_login,
            groups: teams
                .iter()
                .filter(|t| user.is_member_of(&t.id))
                .map(TeamSummaryDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamDto {
    pub id: String,
    pub name: String,
    pub users: Vec<UserListDto>,
}
