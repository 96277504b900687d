pub mod answer_service;
pub mod auth_service;
pub mod categorization_service;
pub mod llm;
pub mod quiz_service;
pub mod similarity;
pub mod stats;
pub mod stats_service;
pub mod user_service;

pub use answer_service::AnswerService;
pub use auth_service::AuthService;
pub use categorization_service::{CategorizationService, QuestionHook};
pub use quiz_service::QuizService;
pub use stats_service::{AnswerScope, StatsService};
pub use user_service::UserService;
