use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection};

use super::unique_index;
use crate::{
    db::{self, Database},
    errors::{AppError, AppResult},
    models::domain::Question,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn create(&self, question: Question) -> AppResult<Question>;
    /// Matches on (topic, statement); the flag is true when `question` was inserted.
    async fn get_or_create(&self, question: Question) -> AppResult<(Question, bool)>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Question>>;
    async fn find_by_topics(&self, topic_ids: &[String]) -> AppResult<Vec<Question>>;
    async fn find_all(&self) -> AppResult<Vec<Question>>;
    /// Replaces the question's categories.
    async fn set_categories(&self, id: &str, category_ids: &[String]) -> AppResult<()>;
    /// Returns the number of deleted questions.
    async fn delete_by_topics(&self, topic_ids: &[String]) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuestionRepository {
    collection: Collection<Question>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection(db::QUESTIONS);
        Self { collection }
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn create(&self, question: Question) -> AppResult<Question> {
        self.collection.insert_one(&question).await?;
        Ok(question)
    }

    async fn get_or_create(&self, question: Question) -> AppResult<(Question, bool)> {
        let filter = doc! { "topic_id": &question.topic_id, "statement": &question.statement };
        if let Some(existing) = self.collection.find_one(filter).await? {
            return Ok((existing, false));
        }
        self.collection.insert_one(&question).await?;
        Ok((question, true))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        let question = self.collection.find_one(doc! { "id": id }).await?;
        Ok(question)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Question>> {
        let cursor = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?;
        let questions: Vec<Question> = cursor.try_collect().await?;
        Ok(questions)
    }

    async fn find_by_topics(&self, topic_ids: &[String]) -> AppResult<Vec<Question>> {
        let cursor = self
            .collection
            .find(doc! { "topic_id": { "$in": topic_ids.to_vec() } })
            .await?;
        let questions: Vec<Question> = cursor.try_collect().await?;
        Ok(questions)
    }

    async fn find_all(&self) -> AppResult<Vec<Question>> {
        let cursor = self.collection.find(doc! {}).await?;
        let questions: Vec<Question> = cursor.try_collect().await?;
        Ok(questions)
    }

    async fn set_categories(&self, id: &str, category_ids: &[String]) -> AppResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "id": id },
                doc! { "$set": { "category_ids": category_ids.to_vec() } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::missing("Question", id));
        }
        Ok(())
    }

    async fn delete_by_topics(&self, topic_ids: &[String]) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "topic_id": { "$in": topic_ids.to_vec() } })
            .await?;
        Ok(result.deleted_count)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        self.collection
            .create_indexes(vec![
                unique_index(doc! { "id": 1 }, "question_id_unique"),
                unique_index(
                    doc! { "topic_id": 1, "statement": 1 },
                    "question_topic_statement_unique",
                ),
            ])
            .await?;
        log::info!("Ensured indexes on {}", db::QUESTIONS);

        Ok(())
    }
}
