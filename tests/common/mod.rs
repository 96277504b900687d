#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quizstats_server::{
    app_state::{AppState, Repositories},
    auth::hash_password,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{
        Category, CategoryGroup, Question, Quiz, QuizPart, Team, Topic, User, UserAnswer,
    },
    repositories::{
        AnswerRepository, CategoryRepository, QuestionRepository, QuizRepository,
        TeamRepository, UserRepository,
    },
    services::llm::LlmClient,
};

pub const PASSWORD: &str = "correct horse battery";

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(AppError::AlreadyExists(format!(
                "User with username '{}' already exists",
                user.username
            )));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        let mut found: Vec<User> = self
            .users
            .read()
            .await
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(found)
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let mut all = self.users.read().await.clone();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }

    async fn find_by_teams(&self, team_ids: &[String]) -> AppResult<Vec<User>> {
        let mut found: Vec<User> = self
            .users
            .read()
            .await
            .iter()
            .filter(|u| u.team_ids.iter().any(|id| team_ids.contains(id)))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(found)
    }

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::missing("User", id))?;
        user.last_login = Some(at);
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryTeamRepository {
    teams: RwLock<Vec<Team>>,
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn create(&self, team: Team) -> AppResult<Team> {
        let mut teams = self.teams.write().await;
        if teams.iter().any(|t| t.name == team.name) {
            return Err(AppError::AlreadyExists(format!(
                "Team '{}' already exists",
                team.name
            )));
        }
        teams.push(team.clone());
        Ok(team)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Team>> {
        Ok(self.teams.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Team>> {
        let mut found: Vec<Team> = self
            .teams
            .read()
            .await
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    groups: RwLock<Vec<CategoryGroup>>,
    categories: RwLock<Vec<Category>>,
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_groups(&self) -> AppResult<Vec<CategoryGroup>> {
        let mut groups = self.groups.read().await.clone();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn find_all(&self) -> AppResult<Vec<Category>> {
        let mut categories = self.categories.read().await.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Category>> {
        Ok(self
            .categories
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Category>> {
        let mut found: Vec<Category> = self
            .categories
            .read()
            .await
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn get_or_create_group(&self, name: &str) -> AppResult<CategoryGroup> {
        let mut groups = self.groups.write().await;
        if let Some(group) = groups.iter().find(|g| g.name == name) {
            return Ok(group.clone());
        }
        let group = CategoryGroup::new(name);
        groups.push(group.clone());
        Ok(group)
    }

    async fn get_or_create(&self, name: &str, group_id: &str) -> AppResult<Category> {
        let mut categories = self.categories.write().await;
        if let Some(category) = categories.iter().find(|c| c.name == name) {
            return Ok(category.clone());
        }
        let category = Category::new(name, group_id);
        categories.push(category.clone());
        Ok(category)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: RwLock<Vec<Quiz>>,
    parts: RwLock<Vec<QuizPart>>,
    topics: RwLock<Vec<Topic>>,
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        Ok(self.quizzes.read().await.iter().find(|q| q.id == id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Quiz>> {
        let mut quizzes = self.quizzes.read().await.clone();
        quizzes.sort_by(|a, b| a.season.cmp(&b.season).then_with(|| a.week.cmp(&b.week)));
        Ok(quizzes)
    }

    async fn get_or_create(&self, season: i32, week: &str) -> AppResult<(Quiz, bool)> {
        let mut quizzes = self.quizzes.write().await;
        if let Some(quiz) = quizzes.iter().find(|q| q.season == season && q.week == week) {
            return Ok((quiz.clone(), false));
        }
        let quiz = Quiz::new(season, week);
        quizzes.push(quiz.clone());
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
            .write()
            .await
            .retain(|t| !part_ids.contains(&t.quiz_part_id));
        self.parts.write().await.retain(|p| p.quiz_id != id);

        let mut quizzes = self.quizzes.write().await;
        let before = quizzes.len();
        quizzes.retain(|q| q.id != id);
        if quizzes.len() == before {
            return Err(AppError::missing("Quiz", id));
        }
        Ok(())
    }

    async fn find_parts(&self, quiz_id: &str) -> AppResult<Vec<QuizPart>> {
        let mut parts: Vec<QuizPart> = self
            .parts
            .read()
            .await
            .iter()
            .filter(|p| p.quiz_id == quiz_id)
            .cloned()
            .collect();
        parts.sort_by_key(|p| p.sequence);
        Ok(parts)
    }

    async fn find_all_parts(&self) -> AppResult<Vec<QuizPart>> {
        Ok(self.parts.read().await.clone())
    }

    async fn get_or_create_part(&self, quiz_id: &str, sequence: i32) -> AppResult<QuizPart> {
        let mut parts = self.parts.write().await;
        if let Some(part) = parts
            .iter()
            .find(|p| p.quiz_id == quiz_id && p.sequence == sequence)
        {
            return Ok(part.clone());
        }
        let part = QuizPart::new(quiz_id, sequence);
        parts.push(part.clone());
        Ok(part)
    }

    async fn find_topic(&self, id: &str) -> AppResult<Option<Topic>> {
        Ok(self.topics.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn find_topics(&self, part_ids: &[String]) -> AppResult<Vec<Topic>> {
        Ok(self
            .topics
            .read()
            .await
            .iter()
            .filter(|t| part_ids.contains(&t.quiz_part_id))
            .cloned()
            .collect())
    }

    async fn find_all_topics(&self) -> AppResult<Vec<Topic>> {
        Ok(self.topics.read().await.clone())
    }

    async fn get_or_create_topic(&self, part_id: &str, title: &str) -> AppResult<Topic> {
        let mut topics = self.topics.write().await;
        if let Some(topic) = topics
            .iter()
            .find(|t| t.quiz_part_id == part_id && t.title == title)
        {
            return Ok(topic.clone());
        }
        let topic = Topic::new(part_id, title);
        topics.push(topic.clone());
        Ok(topic)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryQuestionRepository {
    questions: RwLock<Vec<Question>>,
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn create(&self, question: Question) -> AppResult<Question> {
        self.questions.write().await.push(question.clone());
        Ok(question)
    }

    async fn get_or_create(&self, question: Question) -> AppResult<(Question, bool)> {
        let mut questions = self.questions.write().await;
        if let Some(existing) = questions
            .iter()
            .find(|q| q.topic_id == question.topic_id && q.statement == question.statement)
        {
            return Ok((existing.clone(), false));
        }
        questions.push(question.clone());
        Ok((question, true))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        Ok(self
            .questions
            .read()
            .await
            .iter()
            .find(|q| q.id == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Question>> {
        Ok(self
            .questions
            .read()
            .await
            .iter()
            .filter(|q| ids.contains(&q.id))
            .cloned()
            .collect())
    }

    async fn find_by_topics(&self, topic_ids: &[String]) -> AppResult<Vec<Question>> {
        Ok(self
            .questions
            .read()
            .await
            .iter()
            .filter(|q| topic_ids.contains(&q.topic_id))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> AppResult<Vec<Question>> {
        Ok(self.questions.read().await.clone())
    }

    async fn set_categories(&self, id: &str, category_ids: &[String]) -> AppResult<()> {
        let mut questions = self.questions.write().await;
        let question = questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| AppError::missing("Question", id))?;
        question.category_ids = category_ids.to_vec();
        Ok(())
    }

    async fn delete_by_topics(&self, topic_ids: &[String]) -> AppResult<u64> {
        let mut questions = self.questions.write().await;
        let before = questions.len();
        questions.retain(|q| !topic_ids.contains(&q.topic_id));
        Ok((before - questions.len()) as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAnswerRepository {
    answers: RwLock<Vec<UserAnswer>>,
}

#[async_trait]
impl AnswerRepository for InMemoryAnswerRepository {
    async fn upsert(
        &self,
        user_id: &str,
        question_id: &str,
        is_correct: bool,
    ) -> AppResult<(UserAnswer, bool)> {
        let mut answers = self.answers.write().await;
        if let Some(answer) = answers
            .iter_mut()
            .find(|a| a.user_id == user_id && a.question_id == question_id)
        {
            answer.is_correct = is_correct;
            answer.updated_at = Utc::now();
            return Ok((answer.clone(), false));
        }
        let answer = UserAnswer::new(user_id, question_id, is_correct);
        answers.push(answer.clone());
        Ok((answer, true))
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<UserAnswer>> {
        Ok(self
            .answers
            .read()
            .await
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_users(&self, user_ids: &[String]) -> AppResult<Vec<UserAnswer>> {
        Ok(self
            .answers
            .read()
            .await
            .iter()
            .filter(|a| user_ids.contains(&a.user_id))
            .cloned()
            .collect())
    }

    async fn find_by_question(&self, question_id: &str) -> AppResult<Vec<UserAnswer>> {
        Ok(self
            .answers
            .read()
            .await
            .iter()
            .filter(|a| a.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> AppResult<Vec<UserAnswer>> {
        Ok(self.answers.read().await.clone())
    }

    async fn delete_by_questions(&self, question_ids: &[String]) -> AppResult<u64> {
        let mut answers = self.answers.write().await;
        let before = answers.len();
        answers.retain(|a| !question_ids.contains(&a.question_id));
        Ok((before - answers.len()) as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Canned LLM that always gives the same reply.
pub struct FixedLlmClient(pub Option<String>);

#[async_trait]
impl LlmClient for FixedLlmClient {
    async fn ask(&self, _prompt: &str) -> AppResult<Option<String>> {
        Ok(self.0.clone())
    }
}

/// In-memory stores with typed handles for seeding.
pub struct TestStores {
    pub users: Arc<InMemoryUserRepository>,
    pub teams: Arc<InMemoryTeamRepository>,
    pub categories: Arc<InMemoryCategoryRepository>,
    pub quizzes: Arc<InMemoryQuizRepository>,
    pub questions: Arc<InMemoryQuestionRepository>,
    pub answers: Arc<InMemoryAnswerRepository>,
}

impl TestStores {
    pub fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::default()),
            teams: Arc::new(InMemoryTeamRepository::default()),
            categories: Arc::new(InMemoryCategoryRepository::default()),
            quizzes: Arc::new(InMemoryQuizRepository::default()),
            questions: Arc::new(InMemoryQuestionRepository::default()),
            answers: Arc::new(InMemoryAnswerRepository::default()),
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            quizzes: self.quizzes.clone(),
            questions: self.questions.clone(),
            categories: self.categories.clone(),
            answers: self.answers.clone(),
            users: self.users.clone(),
            teams: self.teams.clone(),
        }
    }

    pub fn state(&self) -> AppState {
        self.state_with_llm(None)
    }

    pub fn state_with_llm(&self, llm: Option<Arc<dyn LlmClient>>) -> AppState {
        AppState::from_parts(Config::test_config(), self.repositories(), llm, None)
    }

    pub async fn add_user(&self, first_name: &str, last_name: &str, username: &str) -> User {
        let user = User::new(
            first_name,
            last_name,
            username,
            &format!("{}@example.com", username),
        )
        .with_password_hash(hash_password(PASSWORD).expect("hash password"));
        self.users.create(user).await.expect("create user")
    }

    pub async fn add_staff(&self, username: &str) -> User {
        let user = User::new("Staff", "Member", username, &format!("{}@example.com", username))
            .staff();
        self.users.create(user).await.expect("create staff")
    }

    pub async fn add_team(&self, name: &str, members: &[&User]) -> Team {
        let team = self.teams.create(Team::new(name)).await.expect("create team");
        let mut users = self.users.users.write().await;
        for member in members {
            if let Some(user) = users.iter_mut().find(|u| u.id == member.id) {
                user.team_ids.push(team.id.clone());
            }
        }
        team
    }

    pub async fn add_category(&self, group: &str, name: &str) -> Category {
        let group = self
            .categories
            .get_or_create_group(group)
            .await
            .expect("create group");
        self.categories
            .get_or_create(name, &group.id)
            .await
            .expect("create category")
    }

    /// One quiz, one part, one topic per title.
    pub async fn add_quiz(&self, season: i32, week: &str, titles: &[&str]) -> (Quiz, Vec<Topic>) {
        let (quiz, _) = self.quizzes.get_or_create(season, week).await.expect("quiz");
        let part = self
            .quizzes
            .get_or_create_part(&quiz.id, 1)
            .await
            .expect("part");
        let mut topics = Vec::new();
        for title in titles {
            topics.push(
                self.quizzes
                    .get_or_create_topic(&part.id, title)
                    .await
                    .expect("topic"),
            );
        }
        (quiz, topics)
    }

    pub async fn add_question(&self, topic: &Topic, categories: &[&Category]) -> Question {
        let mut question = Question::new(
            &topic.id,
            &format!("Question about {}?", topic.title),
            "Answer",
            topic.is_box(),
        );
        question.add_categories(categories.iter().map(|c| c.id.clone()));
        self.questions.create(question).await.expect("create question")
    }

    pub async fn answer(&self, user: &User, question: &Question, is_correct: bool) {
        self.answers
            .upsert(&user.id, &question.id, is_correct)
            .await
            .expect("answer");
    }
}

pub fn bearer(state: &AppState, user: &User) -> (&'static str, String) {
    let token = state.jwt_service.issue_access(user).expect("token");
    ("Authorization", format!("Bearer {}", token))
}
