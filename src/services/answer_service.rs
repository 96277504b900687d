use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{domain::UserAnswer, dto::request::SubmitAnswerRequest},
    repositories::{AnswerRepository, QuestionRepository},
};

pub struct AnswerService {
    answers: Arc<dyn AnswerRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl AnswerService {
    pub fn new(answers: Arc<dyn AnswerRepository>, questions: Arc<dyn QuestionRepository>) -> Self {
        Self { answers, questions }
    }

    /// Records the user's verdict on a question, replacing an earlier one.
    /// Returns the stored answer and whether it is new.
    pub async fn submit(
        &self,
        user_id: &str,
        request: SubmitAnswerRequest,
    ) -> AppResult<(UserAnswer, bool)> {
        request.validate()?;

        if self.questions.find_by_id(&request.question).await?.is_none() {
            return Err(AppError::ValidationError(format!(
                "Invalid question id '{}'",
                request.question
            )));
        }

        self.record(user_id, &request.question, request.is_correct)
            .await
    }

    /// Upsert without validation, for callers that already hold the question.
    pub async fn record(
        &self,
        user_id: &str,
        question_id: &str,
        is_correct: bool,
    ) -> AppResult<(UserAnswer, bool)> {
        let (answer, created) = self
            .answers
            .upsert(user_id, question_id, is_correct)
            .await?;

        log::debug!(
            "{} answer of user {} to question {}",
            if created { "Created" } else { "Updated" },
            user_id,
            question_id
        );
        Ok((answer, created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::Question,
        repositories::{
            answer_repository::MockAnswerRepository, question_repository::MockQuestionRepository,
        },
    };

    #[tokio::test]
    async fn submit_rejects_unknown_question() {
        let mut questions = MockQuestionRepository::new();
        questions.expect_find_by_id().returning(|_| Ok(None));
        let mut answers = MockAnswerRepository::new();
        answers.expect_upsert().times(0);

        let service = AnswerService::new(Arc::new(answers), Arc::new(questions));
        let result = service
            .submit(
                "u-1",
                SubmitAnswerRequest {
                    question: "missing".to_string(),
                    is_correct: true,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn submit_upserts_existing_question() {
        let question = Question::new("t-1", "Q?", "A", false);
        let question_id = question.id.clone();

        let mut questions = MockQuestionRepository::new();
        questions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(question.clone())));
        let mut answers = MockAnswerRepository::new();
        answers
            .expect_upsert()
            .times(1)
            .returning(|user_id, question_id, is_correct| {
                Ok((UserAnswer::new(user_id, question_id, is_correct), true))
            });

        let service = AnswerService::new(Arc::new(answers), Arc::new(questions));
        let (answer, created) = service
            .submit(
                "u-1",
                SubmitAnswerRequest {
                    question: question_id.clone(),
                    is_correct: true,
                },
            )
            .await
            .unwrap();

        assert!(created);
        assert_eq!(answer.question_id, question_id);
        assert!(answer.is_correct);
    }
}
