use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection};

use super::unique_index;
use crate::{
    db::{self, Database},
    errors::AppResult,
    models::domain::Team,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn create(&self, team: Team) -> AppResult<Team>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Team>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Team>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoTeamRepository {
    collection: Collection<Team>,
}

impl MongoTeamRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection(db::TEAMS);
        Self { collection }
    }
}

#[async_trait]
impl TeamRepository for MongoTeamRepository {
    async fn create(&self, team: Team) -> AppResult<Team> {
        self.collection.insert_one(&team).await?;
        Ok(team)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Team>> {
        let team = self.collection.find_one(doc! { "id": id }).await?;
        Ok(team)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Team>> {
        let cursor = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .sort(doc! { "name": 1 })
            .await?;
        let teams: Vec<Team> = cursor.try_collect().await?;
        Ok(teams)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        self.collection
            .create_index(unique_index(doc! { "id": 1 }, "team_id_unique"))
            .await?;
        log::info!("Ensured indexes on {}", db::TEAMS);

        Ok(())
    }
}
