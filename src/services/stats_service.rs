use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Question, UserAnswer},
        dto::{
            request::{AptitudeRequest, TopicExpectationRequest},
            response::{
                AnsweredCategoryStatsDto, AptitudeDto, CategoryGroupStatsDto, CategoryStatsDto,
                CategoryUserStatsDto, QuestionStatsDto, QuizProgressDto, TopicExpectationResponse,
            },
        },
    },
    repositories::{
        AnswerRepository, CategoryRepository, QuestionRepository, QuizRepository, UserRepository,
    },
    services::stats::{self, AnswerRecord},
};

/// Whose answers a statistic is computed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerScope {
    Everyone,
    User(String),
    Users(Vec<String>),
}

pub struct StatsService {
    answers: Arc<dyn AnswerRepository>,
    questions: Arc<dyn QuestionRepository>,
    categories: Arc<dyn CategoryRepository>,
    quizzes: Arc<dyn QuizRepository>,
    users: Arc<dyn UserRepository>,
}

impl StatsService {
    pub fn new(
        answers: Arc<dyn AnswerRepository>,
        questions: Arc<dyn QuestionRepository>,
        categories: Arc<dyn CategoryRepository>,
        quizzes: Arc<dyn QuizRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            answers,
            questions,
            categories,
            quizzes,
            users,
        }
    }

    async fn answers_in(&self, scope: &AnswerScope) -> AppResult<Vec<UserAnswer>> {
        match scope {
            AnswerScope::Everyone => self.answers.find_all().await,
            AnswerScope::User(id) => self.answers.find_by_user(id).await,
            AnswerScope::Users(ids) => self.answers.find_by_users(ids).await,
        }
    }

    /// Answers joined with the categories of their questions.
    async fn records(&self, scope: &AnswerScope) -> AppResult<Vec<AnswerRecord>> {
        let answers = self.answers_in(scope).await?;
        let question_ids: Vec<String> = answers
            .iter()
            .map(|a| a.question_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let questions: HashMap<String, Question> = self
            .questions
            .find_by_ids(&question_ids)
            .await?
            .into_iter()
            .map(|q| (q.id.clone(), q))
            .collect();

        Ok(answers
            .iter()
            .filter_map(|a| questions.get(&a.question_id).map(|q| AnswerRecord::new(a, q)))
            .collect())
    }

    async fn ensure_users_exist(&self, user_ids: &[String]) -> AppResult<()> {
        let found = self.users.find_by_ids(user_ids).await?;
        if let Some(missing) = user_ids.iter().find(|id| !found.iter().any(|u| &u.id == *id)) {
            return Err(AppError::ValidationError(format!("Invalid user id '{}'", missing)));
        }
        Ok(())
    }

    pub async fn category_stats(
        &self,
        category_id: &str,
        scope: &AnswerScope,
    ) -> AppResult<CategoryStatsDto> {
        let category = self
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| AppError::missing("Category", category_id))?;

        let records = self.records(scope).await?;
        Ok(stats::single_category_stats(&records, &category))
    }

    pub async fn all_category_stats(&self, scope: &AnswerScope) -> AppResult<Vec<CategoryStatsDto>> {
        let records = self.records(scope).await?;
        let categories = self.categories.find_all().await?;
        let groups = self.categories.find_groups().await?;
        Ok(stats::category_stats(&records, &categories, &groups))
    }

    pub async fn answered_category_stats(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<AnsweredCategoryStatsDto>> {
        let records = self.records(&AnswerScope::User(user_id.to_string())).await?;
        let categories = self.categories.find_all().await?;
        Ok(stats::answered_category_stats(&records, &categories))
    }

    /// Group stats best first.
    pub async fn ranked_group_stats(
        &self,
        scope: &AnswerScope,
    ) -> AppResult<Vec<CategoryGroupStatsDto>> {
        let mut group_stats = self.group_stats(scope).await?;
        group_stats.sort_by(|a, b| b.xc.total_cmp(&a.xc));
        Ok(group_stats)
    }

    /// Group stats in group order.
    pub async fn group_stats(&self, scope: &AnswerScope) -> AppResult<Vec<CategoryGroupStatsDto>> {
        let records = self.records(scope).await?;
        let categories = self.categories.find_all().await?;
        let groups = self.categories.find_groups().await?;
        Ok(stats::category_group_stats(&records, &categories, &groups))
    }

    pub async fn category_user_stats(&self) -> AppResult<Vec<CategoryUserStatsDto>> {
        let records = self.records(&AnswerScope::Everyone).await?;
        let categories = self.categories.find_all().await?;
        let users = self.users.find_all().await?;
        Ok(stats::category_user_stats(&records, &categories, &users))
    }

    /// Aptitude per requested user, lowest first.
    pub async fn aptitude(&self, request: AptitudeRequest) -> AppResult<Vec<AptitudeDto>> {
        request.validate()?;
        self.ensure_users_exist(&request.user_ids).await?;

        let weights = stats::category_weights(&request.category_ids);
        let records = self
            .records(&AnswerScope::Users(request.user_ids.clone()))
            .await?;

        let mut result: Vec<AptitudeDto> = request
            .user_ids
            .iter()
            .map(|user_id| {
                let own: Vec<AnswerRecord> = records
                    .iter()
                    .filter(|r| &r.user_id == user_id)
                    .cloned()
                    .collect();
                AptitudeDto {
                    user_id: user_id.clone(),
                    aptitude: stats::aptitude(&own, &weights),
                }
            })
            .collect();

        result.sort_by(|a, b| a.aptitude.total_cmp(&b.aptitude));
        Ok(result)
    }

    pub async fn topic_expectations(
        &self,
        request: TopicExpectationRequest,
    ) -> AppResult<TopicExpectationResponse> {
        request.validate()?;
        self.ensure_users_exist(&request.user_ids).await?;

        let records = self
            .records(&AnswerScope::Users(request.user_ids.clone()))
            .await?;
        Ok(stats::topic_expectations(
            &records,
            &request.user_ids,
            &request.topics,
        ))
    }

    pub async fn question_stats(&self, question_id: &str) -> AppResult<QuestionStatsDto> {
        if self.questions.find_by_id(question_id).await?.is_none() {
            return Err(AppError::missing("Question", question_id));
        }
        let answers = self.answers.find_by_question(question_id).await?;
        Ok(stats::question_xp(question_id, &answers))
    }

    /// Per quiz, how much of it `user_id` has answered and how well.
    pub async fn quiz_progress(&self, user_id: &str) -> AppResult<Vec<QuizProgressDto>> {
        let quizzes = self.quizzes.find_all().await?;
        let parts = self.quizzes.find_all_parts().await?;
        let topics = self.quizzes.find_all_topics().await?;
        let questions = self.questions.find_all().await?;
        let answers: HashMap<String, bool> = self
            .answers
            .find_by_user(user_id)
            .await?
            .into_iter()
            .map(|a| (a.question_id, a.is_correct))
            .collect();

        let quiz_of_part: HashMap<&str, &str> = parts
            .iter()
            .map(|p| (p.id.as_str(), p.quiz_id.as_str()))
            .collect();
        let quiz_of_topic: HashMap<&str, &str> = topics
            .iter()
            .filter_map(|t| {
                quiz_of_part
                    .get(t.quiz_part_id.as_str())
                    .map(|quiz_id| (t.id.as_str(), *quiz_id))
            })
            .collect();

        // quiz id -> (total, answered, correct)
        let mut counts: HashMap<&str, (usize, usize, usize)> = HashMap::new();
        for question in &questions {
            let Some(quiz_id) = quiz_of_topic.get(question.topic_id.as_str()) else {
                continue;
            };
            let entry = counts.entry(*quiz_id).or_default();
            entry.0 += 1;
            if let Some(is_correct) = answers.get(&question.id) {
                entry.1 += 1;
                if *is_correct {
                    entry.2 += 1;
                }
            }
        }

        Ok(quizzes
            .iter()
            .map(|quiz| {
                let (total, answered, correct) =
                    counts.get(quiz.id.as_str()).copied().unwrap_or_default();
                let (progress, correct) = stats::quiz_progress(total, answered, correct);
                QuizProgressDto {
                    id: quiz.id.clone(),
                    season: quiz.season,
                    week: quiz.week.clone(),
                    progress,
                    correct,
                }
            })
            .collect())
    }
}
