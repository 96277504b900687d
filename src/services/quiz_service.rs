use std::{collections::HashSet, sync::Arc};

use rand::seq::SliceRandom;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{quiz::is_box_theme, Category, Question, Quiz, QuizPart, Topic},
        dto::{
            request::{
                BulkUpdateQuestionCategoriesRequest, CreateQuestionRequest,
                UpdateQuestionCategoriesRequest,
            },
            response::{
                CategoryDto, CategoryGroupDto, MessageResponse, QuestionDto, QuizDto,
                QuizPartDto, QuizSummaryDto, RandomTopicResponse, TopicDto,
            },
        },
    },
    repositories::{AnswerRepository, CategoryRepository, QuestionRepository, QuizRepository},
    services::categorization_service::QuestionHook,
};

/// Box topics last, alphabetical otherwise.
pub fn sort_topics(topics: &mut [Topic]) {
    topics.sort_by(|a, b| {
        a.is_box()
            .cmp(&b.is_box())
            .then_with(|| a.title.cmp(&b.title))
    });
}

pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
    questions: Arc<dyn QuestionRepository>,
    categories: Arc<dyn CategoryRepository>,
    answers: Arc<dyn AnswerRepository>,
    hook: Option<Arc<dyn QuestionHook>>,
}

impl QuizService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        questions: Arc<dyn QuestionRepository>,
        categories: Arc<dyn CategoryRepository>,
        answers: Arc<dyn AnswerRepository>,
    ) -> Self {
        Self {
            quizzes,
            questions,
            categories,
            answers,
            hook: None,
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn QuestionHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub async fn get_quiz(&self, id: &str) -> AppResult<Quiz> {
        let quiz = self
            .quizzes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::missing("Quiz", id))?;

        Ok(quiz)
    }

    pub async fn list_quizzes(&self) -> AppResult<Vec<QuizSummaryDto>> {
        let quizzes = self.quizzes.find_all().await?;
        Ok(quizzes.iter().map(QuizSummaryDto::from).collect())
    }

    pub async fn quiz_detail(&self, id: &str) -> AppResult<QuizDto> {
        self.build_quiz(id, None).await
    }

    /// Only the questions `user_id` has not answered; topics left without
    /// questions are dropped.
    pub async fn unanswered_quiz_detail(&self, id: &str, user_id: &str) -> AppResult<QuizDto> {
        let answered: HashSet<String> = self
            .answers
            .find_by_user(user_id)
            .await?
            .into_iter()
            .map(|a| a.question_id)
            .collect();

        self.build_quiz(id, Some(&answered)).await
    }

    async fn build_quiz(&self, id: &str, answered: Option<&HashSet<String>>) -> AppResult<QuizDto> {
        let quiz = self.get_quiz(id).await?;
        let parts = self.quizzes.find_parts(&quiz.id).await?;
        let part_ids: Vec<String> = parts.iter().map(|p| p.id.clone()).collect();

        let mut topics = self.quizzes.find_topics(&part_ids).await?;
        sort_topics(&mut topics);
        let topic_ids: Vec<String> = topics.iter().map(|t| t.id.clone()).collect();

        let questions = self.questions.find_by_topics(&topic_ids).await?;
        let categories = self.categories.find_all().await?;

        let parts = parts
            .iter()
            .map(|part| {
                let part_topics = topics
                    .iter()
                    .filter(|t| t.quiz_part_id == part.id)
                    .filter_map(|topic| {
                        let topic_questions: Vec<QuestionDto> = questions
                            .iter()
                            .filter(|q| q.topic_id == topic.id)
                            .filter(|q| answered.map_or(true, |done| !done.contains(&q.id)))
                            .map(|q| QuestionDto::new(q, &categories))
                            .collect();

                        if answered.is_some() && topic_questions.is_empty() {
                            None
                        } else {
                            Some(TopicDto::new(topic, topic_questions))
                        }
                    })
                    .collect();
                QuizPartDto::new(part, part_topics)
            })
            .collect();

        Ok(QuizDto {
            id: quiz.id,
            season: quiz.season,
            week: quiz.week,
            parts,
        })
    }

    /// A random topic that still has questions `user_id` has not answered.
    pub async fn random_unanswered_topic(&self, user_id: &str) -> AppResult<RandomTopicResponse> {
        let answered: HashSet<String> = self
            .answers
            .find_by_user(user_id)
            .await?
            .into_iter()
            .map(|a| a.question_id)
            .collect();
        let questions = self.questions.find_all().await?;

        let open_topic_ids: HashSet<&str> = questions
            .iter()
            .filter(|q| !answered.contains(&q.id))
            .map(|q| q.topic_id.as_str())
            .collect();

        let topics = self.quizzes.find_all_topics().await?;
        let candidates: Vec<&Topic> = topics
            .iter()
            .filter(|t| open_topic_ids.contains(t.id.as_str()))
            .collect();

        let Some(topic) = candidates.choose(&mut rand::thread_rng()) else {
            return Ok(RandomTopicResponse {
                message: "No unanswered topics left".to_string(),
                result: None,
            });
        };

        let categories = self.categories.find_all().await?;
        let topic_questions = questions
            .iter()
            .filter(|q| q.topic_id == topic.id)
            .map(|q| QuestionDto::new(q, &categories))
            .collect();

        Ok(RandomTopicResponse {
            message: "Random unanswered topic".to_string(),
            result: Some(TopicDto::new(topic, topic_questions)),
        })
    }

    pub async fn list_categories(&self) -> AppResult<Vec<CategoryDto>> {
        let categories = self.categories.find_all().await?;
        Ok(categories.iter().map(CategoryDto::from).collect())
    }

    pub async fn category_groups(&self) -> AppResult<Vec<CategoryGroupDto>> {
        let groups = self.categories.find_groups().await?;
        let categories = self.categories.find_all().await?;
        Ok(groups
            .iter()
            .map(|group| CategoryGroupDto::new(group, &categories))
            .collect())
    }

    /// Unknown ids are a client error.
    async fn resolve_categories(&self, ids: &[String]) -> AppResult<Vec<Category>> {
        let mut unique: Vec<String> = Vec::new();
        for id in ids {
            if !unique.contains(id) {
                unique.push(id.clone());
            }
        }

        let found = self.categories.find_by_ids(&unique).await?;
        if let Some(missing) = unique.iter().find(|id| !found.iter().any(|c| &c.id == *id)) {
            return Err(AppError::ValidationError(format!(
                "Invalid category id '{}'",
                missing
            )));
        }
        Ok(found)
    }

    pub async fn get_or_create_quiz(&self, season: i32, week: &str) -> AppResult<(Quiz, bool)> {
        self.quizzes.get_or_create(season, week).await
    }

    pub async fn get_or_create_part(&self, quiz_id: &str, sequence: i32) -> AppResult<QuizPart> {
        self.quizzes.get_or_create_part(quiz_id, sequence).await
    }

    pub async fn get_or_create_topic(&self, part_id: &str, title: &str) -> AppResult<Topic> {
        self.quizzes.get_or_create_topic(part_id, title).await
    }

    /// Stores a question unless its topic already has the same statement.
    /// The post-create hook only runs for new questions.
    pub async fn add_question(&self, question: Question) -> AppResult<(Question, bool)> {
        let (question, created) = self.questions.get_or_create(question).await?;
        if !created {
            return Ok((question, false));
        }

        if let Some(hook) = &self.hook {
            hook.after_create(&question).await;
        }

        // The hook may have attached categories.
        let question = self
            .questions
            .find_by_id(&question.id)
            .await?
            .unwrap_or(question);
        Ok((question, true))
    }

    pub async fn create_question(&self, request: CreateQuestionRequest) -> AppResult<QuestionDto> {
        request.validate()?;

        let topic = self
            .quizzes
            .find_topic(&request.topic_id)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError(format!("Invalid topic id '{}'", request.topic_id))
            })?;
        let categories = self.resolve_categories(&request.category_ids).await?;

        let is_box = request.is_box.unwrap_or_else(|| is_box_theme(&topic.title));
        let mut question = Question::new(&topic.id, &request.statement, &request.answer, is_box);
        question.add_categories(categories.into_iter().map(|c| c.id));

        let (question, created) = self.add_question(question).await?;
        if !created {
            return Err(AppError::AlreadyExists(format!(
                "Topic already has the question '{}'",
                question.short_statement()
            )));
        }
        let all_categories = self.categories.find_all().await?;

        log::info!("Created question '{}'", question.short_statement());
        Ok(QuestionDto::new(&question, &all_categories))
    }

    /// Replaces the categories of one question.
    pub async fn update_question_categories(
        &self,
        question_id: &str,
        request: UpdateQuestionCategoriesRequest,
    ) -> AppResult<QuestionDto> {
        request.validate()?;

        let mut question = self
            .questions
            .find_by_id(question_id)
            .await?
            .ok_or_else(|| AppError::missing("Question", question_id))?;
        let categories = self.resolve_categories(&request.category_ids).await?;

        question.category_ids = categories.iter().map(|c| c.id.clone()).collect();
        self.questions
            .set_categories(&question.id, &question.category_ids)
            .await?;

        Ok(QuestionDto::new(&question, &categories))
    }

    /// Replaces the categories of every listed question.
    pub async fn bulk_update_question_categories(
        &self,
        request: BulkUpdateQuestionCategoriesRequest,
    ) -> AppResult<MessageResponse> {
        request.validate()?;

        let categories = self.resolve_categories(&request.category_ids).await?;
        let questions = self.questions.find_by_ids(&request.question_ids).await?;
        if let Some(missing) = request
            .question_ids
            .iter()
            .find(|id| !questions.iter().any(|q| &q.id == *id))
        {
            return Err(AppError::ValidationError(format!(
                "Invalid question id '{}'",
                missing
            )));
        }

        let category_ids: Vec<String> = categories.iter().map(|c| c.id.clone()).collect();
        for question in &questions {
            self.questions
                .set_categories(&question.id, &category_ids)
                .await?;
        }

        Ok(MessageResponse {
            detail: format!("Updated categories of {} questions", questions.len()),
        })
    }

    /// Deletes the quiz along with its parts, topics, questions and answers.
    pub async fn delete_quiz(&self, id: &str) -> AppResult<()> {
        let quiz = self.get_quiz(id).await?;

        let part_ids: Vec<String> = self
            .quizzes
            .find_parts(&quiz.id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let topic_ids: Vec<String> = self
            .quizzes
            .find_topics(&part_ids)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        let question_ids: Vec<String> = self
            .questions
            .find_by_topics(&topic_ids)
            .await?
            .into_iter()
            .map(|q| q.id)
            .collect();

        let answers = self.answers.delete_by_questions(&question_ids).await?;
        let questions = self.questions.delete_by_topics(&topic_ids).await?;
        self.quizzes.delete(&quiz.id).await?;

        log::info!(
            "Deleted quiz {} with {} questions and {} answers",
            quiz.label(),
            questions,
            answers
        );
        Ok(())
    }
}
