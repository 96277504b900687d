use std::{path::Path, sync::Arc};

use serde::Serialize;

use super::{
    error::IngestResult,
    parser::{get_quiz_data, load_quiz_data},
    ExtractedQuiz, QuizRow,
};
use crate::{
    app_state::AppState,
    models::domain::{quiz::is_box_theme, Question, User},
    services::{similarity, AnswerService, QuizService, UserService},
};

/// Minimum similarity between a row's team and the tracked team.
pub const TEAM_MATCH_THRESHOLD: f64 = 0.8;

/// Minimum similarity between a player name and a user's full name.
pub const PLAYER_MATCH_CUTOFF: f64 = 0.7;

/// Rows answered by the whole team rather than a single player.
pub const TEAM_PLAYER: &str = "Equipa";

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub quiz_id: String,
    pub quiz_created: bool,
    pub parts: usize,
    pub questions: usize,
    /// Questions not present before this import.
    pub new_questions: usize,
    pub answers: usize,
    pub unmatched_players: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub imported: Vec<ImportSummary>,
    pub failed: usize,
    /// Failures caused by fetching the page, included in `failed`.
    pub network_failures: usize,
}

pub struct QuizImporter {
    quiz_service: Arc<QuizService>,
    user_service: Arc<UserService>,
    answer_service: Arc<AnswerService>,
    tracked_team: String,
}

impl QuizImporter {
    pub fn new(
        quiz_service: Arc<QuizService>,
        user_service: Arc<UserService>,
        answer_service: Arc<AnswerService>,
        tracked_team: impl Into<String>,
    ) -> Self {
        Self {
            quiz_service,
            user_service,
            answer_service,
            tracked_team: tracked_team.into(),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.quiz_service.clone(),
            state.user_service.clone(),
            state.answer_service.clone(),
            state.config.tracked_team.clone(),
        )
    }

    /// Creates the quiz, its parts, topics and questions, then records the
    /// tracked team's answers. Quiz, parts and topics are reused when they
    /// already exist.
    pub async fn import_quiz(&self, data: &ExtractedQuiz) -> IngestResult<ImportSummary> {
        let (quiz, created) = self
            .quiz_service
            .get_or_create_quiz(data.season, &data.week)
            .await?;
        log::info!(
            "{} quiz for season {} week {}",
            if created { "Created" } else { "Using existing" },
            quiz.season,
            quiz.week
        );

        let users = self.user_service.all_users().await?;
        let full_names: Vec<String> = users.iter().map(User::full_name).collect();

        let mut summary = ImportSummary {
            quiz_id: quiz.id.clone(),
            quiz_created: created,
            ..Default::default()
        };

        for part_data in &data.parts {
            let part = self
                .quiz_service
                .get_or_create_part(&quiz.id, part_data.sequence)
                .await?;
            summary.parts += 1;

            for row in &part_data.questions {
                let topic = self
                    .quiz_service
                    .get_or_create_topic(&part.id, &row.theme)
                    .await?;

                let (question, created) = self
                    .quiz_service
                    .add_question(Question::new(
                        &topic.id,
                        &row.question,
                        &row.answer,
                        is_box_theme(&topic.title),
                    ))
                    .await?;
                summary.questions += 1;
                if created {
                    summary.new_questions += 1;
                    log::debug!("Added question: {}", question.short_statement());
                }

                match self.tracked_player(row, &users, &full_names) {
                    TrackedPlayer::Matched(user) => {
                        self.answer_service
                            .record(&user.id, &question.id, row.guessed)
                            .await?;
                        summary.answers += 1;
                    }
                    TrackedPlayer::Unmatched(player) => {
                        log::warn!("No user matches player '{}'", player);
                        summary.unmatched_players += 1;
                    }
                    TrackedPlayer::NotTracked => {}
                }
            }
        }

        log::info!(
            "Imported season {} week {}: {} parts, {} questions ({} new), {} answers",
            quiz.season,
            quiz.week,
            summary.parts,
            summary.questions,
            summary.new_questions,
            summary.answers
        );
        Ok(summary)
    }

    pub async fn import_url(&self, url: &str) -> IngestResult<ImportSummary> {
        let data = get_quiz_data(url, &self.tracked_team).await?;
        self.import_quiz(&data).await
    }

    /// Imports each URL on its own; a failing URL is logged and skipped.
    pub async fn import_urls(&self, urls: &[String]) -> BatchSummary {
        let mut batch = BatchSummary::default();

        for url in urls {
            match self.import_url(url).await {
                Ok(summary) => batch.imported.push(summary),
                Err(e) if e.is_network() => {
                    log::error!("Network error for {}: {}", url, e);
                    batch.failed += 1;
                    batch.network_failures += 1;
                }
                Err(e) => {
                    log::error!("Failed to import {}: {}", url, e);
                    batch.failed += 1;
                }
            }
        }

        log::info!(
            "Batch finished: {} imported, {} failed ({} network)",
            batch.imported.len(),
            batch.failed,
            batch.network_failures
        );
        batch
    }

    pub async fn import_file(&self, path: impl AsRef<Path>) -> IngestResult<ImportSummary> {
        let data = load_quiz_data(path).await?;
        self.import_quiz(&data).await
    }

    fn tracked_player<'a>(
        &self,
        row: &'a QuizRow,
        users: &'a [User],
        full_names: &[String],
    ) -> TrackedPlayer<'a> {
        let (Some(team), Some(player)) = (&row.team, &row.player) else {
            return TrackedPlayer::NotTracked;
        };
        if !similarity::is_similar(team, &self.tracked_team, TEAM_MATCH_THRESHOLD)
            || player == TEAM_PLAYER
        {
            return TrackedPlayer::NotTracked;
        }

        similarity::best_match(player, full_names, PLAYER_MATCH_CUTOFF)
            .and_then(|name| users.iter().find(|u| u.full_name() == name))
            .map(TrackedPlayer::Matched)
            .unwrap_or(TrackedPlayer::Unmatched(player))
    }
}

enum TrackedPlayer<'a> {
    Matched(&'a User),
    Unmatched(&'a str),
    NotTracked,
}
