use std::{sync::Arc, time::Duration};

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        AnswerRepository, CategoryRepository, MongoAnswerRepository, MongoCategoryRepository,
        MongoQuestionRepository, MongoQuizRepository, MongoTeamRepository, MongoUserRepository,
        QuestionRepository, QuizRepository, TeamRepository, UserRepository,
    },
    services::{
        llm::{InMemoryResponseCache, LlmClient, OpenAiLlmClient},
        AnswerService, AuthService, CategorizationService, QuizService, StatsService, UserService,
    },
};

/// Every store the services read from.
#[derive(Clone)]
pub struct Repositories {
    pub quizzes: Arc<dyn QuizRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub answers: Arc<dyn AnswerRepository>,
    pub users: Arc<dyn UserRepository>,
    pub teams: Arc<dyn TeamRepository>,
}

impl Repositories {
    pub fn mongo(db: &Database) -> Self {
        Self {
            quizzes: Arc::new(MongoQuizRepository::new(db)),
            questions: Arc::new(MongoQuestionRepository::new(db)),
            categories: Arc::new(MongoCategoryRepository::new(db)),
            answers: Arc::new(MongoAnswerRepository::new(db)),
            users: Arc::new(MongoUserRepository::new(db)),
            teams: Arc::new(MongoTeamRepository::new(db)),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        self.quizzes.ensure_indexes().await?;
        self.questions.ensure_indexes().await?;
        self.categories.ensure_indexes().await?;
        self.answers.ensure_indexes().await?;
        self.users.ensure_indexes().await?;
        self.teams.ensure_indexes().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub quiz_service: Arc<QuizService>,
    pub answer_service: Arc<AnswerService>,
    pub stats_service: Arc<StatsService>,
    pub categorization_service: Arc<CategorizationService>,
    pub jwt_service: Arc<JwtService>,
    pub repositories: Repositories,
    pub config: Arc<Config>,
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let repositories = Repositories::mongo(&db);
        repositories.ensure_indexes().await?;

        let llm = llm_client(&config);
        Ok(Self::from_parts(config, repositories, llm, Some(db)))
    }

    /// Wires services over the given repositories. Question creation runs
    /// the categorization hook only when an LLM client is supplied.
    pub fn from_parts(
        config: Config,
        repositories: Repositories,
        llm: Option<Arc<dyn LlmClient>>,
        db: Option<Database>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
            config.jwt_refresh_expiration_hours,
        ));

        let categorization_service = Arc::new(CategorizationService::new(
            llm,
            repositories.categories.clone(),
            repositories.questions.clone(),
        ));

        let mut quiz_service = QuizService::new(
            repositories.quizzes.clone(),
            repositories.questions.clone(),
            repositories.categories.clone(),
            repositories.answers.clone(),
        );
        if categorization_service.is_enabled() {
            quiz_service = quiz_service.with_hook(categorization_service.clone());
        }

        Self {
            auth_service: Arc::new(AuthService::new(
                repositories.users.clone(),
                jwt_service.clone(),
            )),
            user_service: Arc::new(UserService::new(
                repositories.users.clone(),
                repositories.teams.clone(),
                repositories.answers.clone(),
            )),
            quiz_service: Arc::new(quiz_service),
            answer_service: Arc::new(AnswerService::new(
                repositories.answers.clone(),
                repositories.questions.clone(),
            )),
            stats_service: Arc::new(StatsService::new(
                repositories.answers.clone(),
                repositories.questions.clone(),
                repositories.categories.clone(),
                repositories.quizzes.clone(),
                repositories.users.clone(),
            )),
            categorization_service,
            jwt_service,
            repositories,
            config: Arc::new(config),
            db,
        }
    }
}

/// OpenAI client when an API key is configured, cached unless disabled.
pub fn llm_client(config: &Config) -> Option<Arc<dyn LlmClient>> {
    let Some(api_key) = &config.openai_api_key else {
        log::warn!("OPENAI_API_KEY not set; automatic categorization disabled");
        return None;
    };

    let mut client = OpenAiLlmClient::new(api_key, &config.openai_model);
    if config.llm_cache_enabled {
        client = client.with_cache(
            Arc::new(InMemoryResponseCache::new()),
            Duration::from_secs(config.llm_cache_ttl_secs),
        );
    }
    Some(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn llm_client_requires_api_key() {
        let config = Config::test_config();
        assert!(llm_client(&config).is_none());
    }
}
