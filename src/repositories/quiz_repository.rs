use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection};

use super::unique_index;
use crate::{
    db::{self, Database},
    errors::{AppError, AppResult},
    models::domain::{Quiz, QuizPart, Topic},
};

/// Quizzes with their parts and topics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>>;
    /// Ordered by season, then week.
    async fn find_all(&self) -> AppResult<Vec<Quiz>>;
    /// Returns the quiz and whether it was created.
    async fn get_or_create(&self, season: i32, week: &str) -> AppResult<(Quiz, bool)>;
    /// Removes the quiz with its parts and topics.
    async fn delete(&self, id: &str) -> AppResult<()>;

    /// Ordered by sequence.
    async fn find_parts(&self, quiz_id: &str) -> AppResult<Vec<QuizPart>>;
    async fn find_all_parts(&self) -> AppResult<Vec<QuizPart>>;
    async fn get_or_create_part(&self, quiz_id: &str, sequence: i32) -> AppResult<QuizPart>;

    async fn find_topic(&self, id: &str) -> AppResult<Option<Topic>>;
    async fn find_topics(&self, part_ids: &[String]) -> AppResult<Vec<Topic>>;
    async fn find_all_topics(&self) -> AppResult<Vec<Topic>>;
    async fn get_or_create_topic(&self, part_id: &str, title: &str) -> AppResult<Topic>;

    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuizRepository {
    quizzes: Collection<Quiz>,
    parts: Collection<QuizPart>,
    topics: Collection<Topic>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            quizzes: db.collection(db::QUIZZES),
            parts: db.collection(db::QUIZ_PARTS),
            topics: db.collection(db::TOPICS),
        }
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let quiz = self.quizzes.find_one(doc! { "id": id }).await?;
        Ok(quiz)
    }

    async fn find_all(&self) -> AppResult<Vec<Quiz>> {
        let cursor = self
            .quizzes
            .find(doc! {})
            .sort(doc! { "season": 1, "week": 1 })
            .await?;
        let quizzes: Vec<Quiz> = cursor.try_collect().await?;
        Ok(quizzes)
    }

    async fn get_or_create(&self, season: i32, week: &str) -> AppResult<(Quiz, bool)> {
        let filter = doc! { "season": season, "week": week };
        if let Some(quiz) = self.quizzes.find_one(filter).await? {
            return Ok((quiz, false));
        }
        let quiz = Quiz::new(season, week);
        self.quizzes.insert_one(&quiz).await?;
        Ok((quiz, true))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let part_ids: Vec<String> = self
            .find_parts(id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        self.topics
            .delete_many(doc! { "quiz_part_id": { "$in": part_ids } })
            .await?;
        self.parts.delete_many(doc! { "quiz_id": id }).await?;

        let result = self.quizzes.delete_one(doc! { "id": id }).await?;
        if result.deleted_count == 0 {
            return Err(AppError::missing("Quiz", id));
        }
        Ok(())
    }

    async fn find_parts(&self, quiz_id: &str) -> AppResult<Vec<QuizPart>> {
        let cursor = self
            .parts
            .find(doc! { "quiz_id": quiz_id })
            .sort(doc! { "sequence": 1 })
            .await?;
        let parts: Vec<QuizPart> = cursor.try_collect().await?;
        Ok(parts)
    }

    async fn find_all_parts(&self) -> AppResult<Vec<QuizPart>> {
        let cursor = self.parts.find(doc! {}).await?;
        let parts: Vec<QuizPart> = cursor.try_collect().await?;
        Ok(parts)
    }

    async fn get_or_create_part(&self, quiz_id: &str, sequence: i32) -> AppResult<QuizPart> {
        let filter = doc! { "quiz_id": quiz_id, "sequence": sequence };
        if let Some(part) = self.parts.find_one(filter).await? {
            return Ok(part);
        }
        let part = QuizPart::new(quiz_id, sequence);
        self.parts.insert_one(&part).await?;
        Ok(part)
    }

    async fn find_topic(&self, id: &str) -> AppResult<Option<Topic>> {
        let topic = self.topics.find_one(doc! { "id": id }).await?;
        Ok(topic)
    }

    async fn find_topics(&self, part_ids: &[String]) -> AppResult<Vec<Topic>> {
        let cursor = self
            .topics
            .find(doc! { "quiz_part_id": { "$in": part_ids.to_vec() } })
            .await?;
        let topics: Vec<Topic> = cursor.try_collect().await?;
        Ok(topics)
    }

    async fn find_all_topics(&self) -> AppResult<Vec<Topic>> {
        let cursor = self.topics.find(doc! {}).await?;
        let topics: Vec<Topic> = cursor.try_collect().await?;
        Ok(topics)
    }

    async fn get_or_create_topic(&self, part_id: &str, title: &str) -> AppResult<Topic> {
        let filter = doc! { "quiz_part_id": part_id, "title": title };
        if let Some(topic) = self.topics.find_one(filter).await? {
            return Ok(topic);
        }
        let topic = Topic::new(part_id, title);
        self.topics.insert_one(&topic).await?;
        Ok(topic)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        self.quizzes
            .create_indexes(vec![
                unique_index(doc! { "id": 1 }, "quiz_id_unique"),
                unique_index(doc! { "season": 1, "week": 1 }, "quiz_season_week_unique"),
            ])
            .await?;
        self.parts
            .create_indexes(vec![
                unique_index(doc! { "id": 1 }, "quiz_part_id_unique"),
                unique_index(doc! { "quiz_id": 1, "sequence": 1 }, "quiz_part_sequence_unique"),
            ])
            .await?;
        self.topics
            .create_index(unique_index(doc! { "id": 1 }, "topic_id_unique"))
            .await?;

        log::info!(
            "Ensured indexes on {}, {}, {}",
            db::QUIZZES,
            db::QUIZ_PARTS,
            db::TOPICS
        );
        Ok(())
    }
}
