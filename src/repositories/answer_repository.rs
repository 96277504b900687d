use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::UpdateOptions,
    Collection,
};
use uuid::Uuid;

use super::{lookup_index, unique_index};

use crate::{
    db::{self, Database},
    errors::{AppError, AppResult},
    models::domain::UserAnswer,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Inserts or updates the single answer of `user_id` to `question_id`.
    /// Returns the stored answer and whether it was created.
    async fn upsert(
        &self,
        user_id: &str,
        question_id: &str,
        is_correct: bool,
    ) -> AppResult<(UserAnswer, bool)>;
    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<UserAnswer>>;
    async fn find_by_users(&self, user_ids: &[String]) -> AppResult<Vec<UserAnswer>>;
    async fn find_by_question(&self, question_id: &str) -> AppResult<Vec<UserAnswer>>;
    async fn find_all(&self) -> AppResult<Vec<UserAnswer>>;
    async fn delete_by_questions(&self, question_ids: &[String]) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoAnswerRepository {
    collection: Collection<UserAnswer>,
}

impl MongoAnswerRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection(db::USER_ANSWERS);
        Self { collection }
    }

    async fn find_many(&self, filter: mongodb::bson::Document) -> AppResult<Vec<UserAnswer>> {
        let cursor = self.collection.find(filter).await?;
        let answers: Vec<UserAnswer> = cursor.try_collect().await?;
        Ok(answers)
    }
}

#[async_trait]
impl AnswerRepository for MongoAnswerRepository {
    async fn upsert(
        &self,
        user_id: &str,
        question_id: &str,
        is_correct: bool,
    ) -> AppResult<(UserAnswer, bool)> {
        let filter = doc! { "user_id": user_id, "question_id": question_id };
        let now = to_bson(&Utc::now())?;
        let update = doc! {
            "$set": { "is_correct": is_correct, "updated_at": now.clone() },
            "$setOnInsert": { "id": Uuid::new_v4().to_string(), "created_at": now },
        };
        let options = UpdateOptions::builder().upsert(true).build();

        let result = self
            .collection
            .update_one(filter.clone(), update)
            .with_options(options)
            .await?;
        let created = result.upserted_id.is_some();

        let answer = self.collection.find_one(filter).await?.ok_or_else(|| {
            AppError::DatabaseError(format!(
                "Answer of user '{}' to question '{}' missing after upsert",
                user_id, question_id
            ))
        })?;

        Ok((answer, created))
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<UserAnswer>> {
        self.find_many(doc! { "user_id": user_id }).await
    }

    async fn find_by_users(&self, user_ids: &[String]) -> AppResult<Vec<UserAnswer>> {
        self.find_many(doc! { "user_id": { "$in": user_ids.to_vec() } })
            .await
    }

    async fn find_by_question(&self, question_id: &str) -> AppResult<Vec<UserAnswer>> {
        self.find_many(doc! { "question_id": question_id }).await
    }

    async fn find_all(&self) -> AppResult<Vec<UserAnswer>> {
        self.find_many(doc! {}).await
    }

    async fn delete_by_questions(&self, question_ids: &[String]) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "question_id": { "$in": question_ids.to_vec() } })
            .await?;
        Ok(result.deleted_count)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        self.collection
            .create_indexes(vec![
                unique_index(doc! { "user_id": 1, "question_id": 1 }, "user_question_unique"),
                lookup_index(doc! { "question_id": 1 }),
            ])
            .await?;
        log::info!("Ensured indexes on {}", db::USER_ANSWERS);

        Ok(())
    }
}
