//! Score aggregation over user answers.
//!
//! Every score here is an accuracy rescaled to `[0, 2]`: xC per category,
//! xP per question and xT per predicted topic. The functions are pure; the
//! `StatsService` loads the answers and hands them over as `AnswerRecord`s.

use std::collections::HashMap;

use crate::models::{
    domain::{Category, CategoryGroup, Question, User, UserAnswer},
    dto::{
        request::TopicSpec,
        response::{
            AnsweredCategoryStatsDto, CategoryGroupStatsDto, CategoryStatsDto,
            CategoryUserStatsDto, QuestionStatsDto, TeamTopicScoresDto, TopicExpectationResponse,
            TopicScoreDto, UserScoreDto, UserTopicScoresDto,
        },
    },
};

pub const SCORE_SCALE: f64 = 2.0;

/// Categories (or topics) with fewer answers than this are too noisy to rank.
pub const MIN_SAMPLE_SIZE: usize = 4;

/// An answer joined with the categories of its question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub user_id: String,
    pub question_id: String,
    pub is_correct: bool,
    pub category_ids: Vec<String>,
}

impl AnswerRecord {
    pub fn new(answer: &UserAnswer, question: &Question) -> Self {
        AnswerRecord {
            user_id: answer.user_id.clone(),
            question_id: answer.question_id.clone(),
            is_correct: answer.is_correct,
            category_ids: question.category_ids.clone(),
        }
    }

    fn in_category(&self, category_id: &str) -> bool {
        self.category_ids.iter().any(|id| id == category_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: usize,
    pub total: usize,
}

impl Tally {
    pub fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    pub fn score(&self) -> f64 {
        score(self.correct, self.total)
    }

    fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

pub fn score(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(correct as f64 / total as f64 * SCORE_SCALE)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn tally_by_category(answers: &[AnswerRecord]) -> HashMap<&str, Tally> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for answer in answers {
        for category_id in &answer.category_ids {
            tallies
                .entry(category_id.as_str())
                .or_default()
                .record(answer.is_correct);
        }
    }
    tallies
}

fn by_score_desc(a: f64, b: f64) -> std::cmp::Ordering {
    b.total_cmp(&a)
}

/// xC of one category over `answers`.
pub fn single_category_stats(answers: &[AnswerRecord], category: &Category) -> CategoryStatsDto {
    let mut tally = Tally::default();
    answers
        .iter()
        .filter(|a| a.in_category(&category.id))
        .for_each(|a| tally.record(a.is_correct));

    CategoryStatsDto {
        category_id: category.id.clone(),
        category_name: category.name.clone(),
        category_group_id: category.group_id.clone(),
        xc: tally.score(),
        answered: tally.total,
    }
}

/// One entry per category, zero counts included, ordered by group name then
/// category name.
pub fn category_stats(
    answers: &[AnswerRecord],
    categories: &[Category],
    groups: &[CategoryGroup],
) -> Vec<CategoryStatsDto> {
    let tallies = tally_by_category(answers);
    let group_names: HashMap<&str, &str> = groups
        .iter()
        .map(|g| (g.id.as_str(), g.name.as_str()))
        .collect();

    let mut ordered: Vec<&Category> = categories.iter().collect();
    ordered.sort_by(|a, b| {
        let group_a = group_names.get(a.group_id.as_str()).copied().unwrap_or_default();
        let group_b = group_names.get(b.group_id.as_str()).copied().unwrap_or_default();
        group_a.cmp(group_b).then_with(|| a.name.cmp(&b.name))
    });

    ordered
        .into_iter()
        .map(|category| {
            let tally = tallies.get(category.id.as_str()).copied().unwrap_or_default();
            CategoryStatsDto {
                category_id: category.id.clone(),
                category_name: category.name.clone(),
                category_group_id: category.group_id.clone(),
                xc: tally.score(),
                answered: tally.total,
            }
        })
        .collect()
}

/// Only the categories that have answers, best first.
pub fn answered_category_stats(
    answers: &[AnswerRecord],
    categories: &[Category],
) -> Vec<AnsweredCategoryStatsDto> {
    let tallies = tally_by_category(answers);

    let mut stats: Vec<AnsweredCategoryStatsDto> = categories
        .iter()
        .filter_map(|category| {
            tallies
                .get(category.id.as_str())
                .map(|tally| AnsweredCategoryStatsDto {
                    category_name: category.name.clone(),
                    xc: tally.score(),
                    answered: tally.total,
                })
        })
        .collect();

    stats.sort_by(|a, b| by_score_desc(a.xc, b.xc));
    stats
}

/// One entry per group in the order given. Answers in unknown categories are
/// ignored.
pub fn category_group_stats(
    answers: &[AnswerRecord],
    categories: &[Category],
    groups: &[CategoryGroup],
) -> Vec<CategoryGroupStatsDto> {
    let group_of: HashMap<&str, &str> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.group_id.as_str()))
        .collect();

    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for answer in answers {
        for category_id in &answer.category_ids {
            if let Some(group_id) = group_of.get(category_id.as_str()) {
                tallies.entry(*group_id).or_default().record(answer.is_correct);
            }
        }
    }

    groups
        .iter()
        .map(|group| {
            let tally = tallies.get(group.id.as_str()).copied().unwrap_or_default();
            CategoryGroupStatsDto {
                group_id: group.id.clone(),
                group_name: group.name.clone(),
                xc: tally.score(),
                answered: tally.total,
            }
        })
        .collect()
}

/// Per category, every user with answers there, ranked by xC.
pub fn category_user_stats(
    answers: &[AnswerRecord],
    categories: &[Category],
    users: &[User],
) -> Vec<CategoryUserStatsDto> {
    let mut per_user: HashMap<(&str, &str), Tally> = HashMap::new();
    for answer in answers {
        for category_id in &answer.category_ids {
            per_user
                .entry((category_id.as_str(), answer.user_id.as_str()))
                .or_default()
                .record(answer.is_correct);
        }
    }

    categories
        .iter()
        .map(|category| {
            let mut scores: Vec<UserScoreDto> = users
                .iter()
                .filter_map(|user| {
                    per_user
                        .get(&(category.id.as_str(), user.id.as_str()))
                        .map(|tally| UserScoreDto {
                            user: user.display_name(),
                            xc: tally.score(),
                            answered: tally.total,
                        })
                })
                .collect();
            scores.sort_by(|a, b| by_score_desc(a.xc, b.xc));

            CategoryUserStatsDto {
                category_name: category.name.clone(),
                users: scores,
            }
        })
        .collect()
}

/// Multiplicity of each id, in first-seen order.
pub fn category_weights(category_ids: &[String]) -> Vec<(String, usize)> {
    let mut weights: Vec<(String, usize)> = Vec::new();
    for id in category_ids {
        match weights.iter_mut().find(|(known, _)| known == id) {
            Some((_, count)) => *count += 1,
            None => weights.push((id.clone(), 1)),
        }
    }
    weights
}

/// Median with the mean of the two middle values for even lengths.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Twice the weighted median accuracy across the weighted categories that
/// have at least `MIN_SAMPLE_SIZE` answers; 0.0 when none qualify.
pub fn aptitude(answers: &[AnswerRecord], weights: &[(String, usize)]) -> f64 {
    let tallies = tally_by_category(answers);

    let mut expanded: Vec<f64> = Vec::new();
    for (category_id, weight) in weights {
        if let Some(tally) = tallies.get(category_id.as_str()) {
            if tally.total >= MIN_SAMPLE_SIZE {
                expanded.extend(std::iter::repeat(tally.accuracy()).take(*weight));
            }
        }
    }

    median(&mut expanded)
        .map(|m| m * SCORE_SCALE)
        .unwrap_or(0.0)
}

/// xT of each topic over `answers`, best first.
pub fn topic_scores(answers: &[AnswerRecord], topics: &[TopicSpec]) -> Vec<TopicScoreDto> {
    let tallies = tally_by_category(answers);

    let mut scores: Vec<TopicScoreDto> = topics
        .iter()
        .map(|topic| {
            let mut pooled = Tally::default();
            for category_id in &topic.category_ids {
                if let Some(tally) = tallies.get(category_id.as_str()) {
                    pooled.correct += tally.correct;
                    pooled.total += tally.total;
                }
            }
            let xt = if pooled.total < MIN_SAMPLE_SIZE {
                0.0
            } else {
                pooled.score()
            };
            TopicScoreDto {
                topic: topic.name.clone(),
                xt,
            }
        })
        .collect();

    scores.sort_by(|a, b| by_score_desc(a.xt, b.xt));
    scores
}

/// Topic scores for each requested user and for all of them pooled.
pub fn topic_expectations(
    answers: &[AnswerRecord],
    user_ids: &[String],
    topics: &[TopicSpec],
) -> TopicExpectationResponse {
    let team_answers: Vec<AnswerRecord> = answers
        .iter()
        .filter(|a| user_ids.contains(&a.user_id))
        .cloned()
        .collect();

    let users = user_ids
        .iter()
        .map(|user_id| {
            let own: Vec<AnswerRecord> = team_answers
                .iter()
                .filter(|a| &a.user_id == user_id)
                .cloned()
                .collect();
            UserTopicScoresDto {
                user_id: user_id.clone(),
                topics: topic_scores(&own, topics),
            }
        })
        .collect();

    TopicExpectationResponse {
        team: TeamTopicScoresDto {
            topics: topic_scores(&team_answers, topics),
        },
        users,
    }
}

pub fn question_xp(question_id: &str, answers: &[UserAnswer]) -> QuestionStatsDto {
    let mut tally = Tally::default();
    answers
        .iter()
        .filter(|a| a.question_id == question_id)
        .for_each(|a| tally.record(a.is_correct));

    QuestionStatsDto {
        question_id: question_id.to_string(),
        xp: tally.score(),
        answered: tally.total,
    }
}

/// `(progress, correct)` as percentages rounded to one decimal: share of the
/// quiz's questions answered and share of those answers that were right.
pub fn quiz_progress(total_questions: usize, answered: usize, correct: usize) -> (f64, f64) {
    let progress = if total_questions == 0 {
        0.0
    } else {
        round1(answered as f64 / total_questions as f64 * 100.0)
    };
    let accuracy = if answered == 0 {
        0.0
    } else {
        round1(correct as f64 / answered as f64 * 100.0)
    };
    (progress, accuracy)
}
