use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, IndexModel};

use super::unique_index;
use crate::{
    db::{self, Database},
    errors::AppResult,
    models::domain::{Category, CategoryGroup},
};

/// Category groups and their categories. Listings are ordered by name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_groups(&self) -> AppResult<Vec<CategoryGroup>>;
    async fn find_all(&self) -> AppResult<Vec<Category>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Category>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Category>>;
    async fn get_or_create_group(&self, name: &str) -> AppResult<CategoryGroup>;
    async fn get_or_create(&self, name: &str, group_id: &str) -> AppResult<Category>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoCategoryRepository {
    groups: Collection<CategoryGroup>,
    categories: Collection<Category>,
}

impl MongoCategoryRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            groups: db.collection(db::CATEGORY_GROUPS),
            categories: db.collection(db::CATEGORIES),
        }
    }
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    async fn find_groups(&self) -> AppResult<Vec<CategoryGroup>> {
        let cursor = self.groups.find(doc! {}).sort(doc! { "name": 1 }).await?;
        let groups: Vec<CategoryGroup> = cursor.try_collect().await?;
        Ok(groups)
    }

    async fn find_all(&self) -> AppResult<Vec<Category>> {
        let cursor = self
            .categories
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await?;
        let categories: Vec<Category> = cursor.try_collect().await?;
        Ok(categories)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Category>> {
        let category = self.categories.find_one(doc! { "id": id }).await?;
        Ok(category)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Category>> {
        let cursor = self
            .categories
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .sort(doc! { "name": 1 })
            .await?;
        let categories: Vec<Category> = cursor.try_collect().await?;
        Ok(categories)
    }

    async fn get_or_create_group(&self, name: &str) -> AppResult<CategoryGroup> {
        if let Some(group) = self.groups.find_one(doc! { "name": name }).await? {
            return Ok(group);
        }
        let group = CategoryGroup::new(name);
        self.groups.insert_one(&group).await?;
        Ok(group)
    }

    async fn get_or_create(&self, name: &str, group_id: &str) -> AppResult<Category> {
        if let Some(category) = self.categories.find_one(doc! { "name": name }).await? {
            return Ok(category);
        }
        let category = Category::new(name, group_id);
        self.categories.insert_one(&category).await?;
        Ok(category)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        self.groups.create_indexes(unique_id_and_name("category_group")).await?;
        log::info!("Ensured indexes on {}", db::CATEGORY_GROUPS);

        self.categories.create_indexes(unique_id_and_name("category")).await?;
        log::info!("Ensured indexes on {}", db::CATEGORIES);

        Ok(())
    }
}

fn unique_id_and_name(prefix: &str) -> Vec<IndexModel> {
    ["id", "name"]
        .into_iter()
        .map(|field| unique_index(doc! { field: 1 }, &format!("{}_{}_unique", prefix, field)))
        .collect()
}
