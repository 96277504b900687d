pub mod answer_repository;
pub mod category_repository;
pub mod question_repository;
pub mod quiz_repository;
pub mod team_repository;
pub mod user_repository;

use mongodb::{bson::Document, options::IndexOptions, IndexModel};

pub use answer_repository::{AnswerRepository, MongoAnswerRepository};
pub use category_repository::{CategoryRepository, MongoCategoryRepository};
pub use question_repository::{MongoQuestionRepository, QuestionRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
pub use team_repository::{MongoTeamRepository, TeamRepository};
pub use user_repository::{MongoUserRepository, UserRepository};

/// Named unique index over `keys`.
pub(crate) fn unique_index(keys: Document, name: &str) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .unique(true)
                .name(name.to_string())
                .build(),
        )
        .build()
}

pub(crate) fn lookup_index(keys: Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}
