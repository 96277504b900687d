use std::time::Duration;

use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};

use crate::{config::Config, errors::AppResult};

pub const QUIZZES: &str = "quizzes";
pub const QUIZ_PARTS: &str = "quiz_parts";
pub const TOPICS: &str = "topics";
pub const QUESTIONS: &str = "questions";
pub const CATEGORIES: &str = "categories";
pub const CATEGORY_GROUPS: &str = "category_groups";
pub const USER_ANSWERS: &str = "user_answers";
pub const USERS: &str = "users";
pub const TEAMS: &str = "teams";

const APP_NAME: &str = "quizstats-server";
const TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the application's MongoDB database.
#[derive(Clone)]
pub struct Database {
    client: Client,
    inner: mongodb::Database,
}

impl Database {
    /// Connects and pings the server so a bad connection string fails at startup.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.app_name = Some(APP_NAME.to_string());
        options.max_pool_size = Some(10);
        options.min_pool_size = Some(2);
        options.connect_timeout = Some(TIMEOUT);
        options.server_selection_timeout = Some(TIMEOUT);

        let client = Client::with_options(options)?;
        let db = Self {
            inner: client.database(&config.mongo_db_name),
            client,
        };
        db.ping().await?;

        log::info!("Connected to MongoDB database '{}'", db.name());
        Ok(db)
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.inner.collection(name)
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }
}
