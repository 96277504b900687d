use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, Document},
    Collection,
};

use super::unique_index;

use crate::{
    db::{self, Database},
    errors::{AppError, AppResult},
    models::domain::User,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>>;
    async fn find_all(&self) -> AppResult<Vec<User>>;
    async fn find_by_teams(&self, team_ids: &[String]) -> AppResult<Vec<User>>;
    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(db::USERS),
        }
    }

    async fn by_username(&self, filter: Document) -> AppResult<Vec<User>> {
        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "username": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        if self.find_by_username(&user.username).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "User with username '{}' already exists",
                user.username
            )));
        }
        self.collection.insert_one(&user).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "id": id }).await?)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "username": username }).await?)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        self.by_username(doc! { "id": { "$in": ids.to_vec() } }).await
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        self.by_username(doc! {}).await
    }

    async fn find_by_teams(&self, team_ids: &[String]) -> AppResult<Vec<User>> {
        self.by_username(doc! { "team_ids": { "$in": team_ids.to_vec() } }).await
    }

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> AppResult<()> {
        let result = self
            .collection
            .update_one(doc! { "id": id }, doc! { "$set": { "last_login": to_bson(&at)? } })
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::missing("User", id));
        }
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        self.collection
            .create_indexes(vec![
                unique_index(doc! { "id": 1 }, "user_id_unique"),
                unique_index(doc! { "username": 1 }, "user_username_unique"),
            ])
            .await?;
        log::info!("Ensured indexes on {}", db::USERS);
        Ok(())
    }
}
