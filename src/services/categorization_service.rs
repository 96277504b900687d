use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    constants::prompts::{categorize_question_prompt, classify_topics_prompt},
    errors::AppResult,
    models::{
        domain::{Category, Question},
        dto::response::{CategorizedTopicDto, CategoryDto},
    },
    repositories::{CategoryRepository, QuestionRepository},
    services::{llm::LlmClient, similarity},
};

pub const CATEGORY_MATCH_CUTOFF: f64 = 0.6;
const NO_SUGGESTION: &str = "None";

/// Runs after a question has been stored. Implementations must not fail the
/// write that triggered them.
#[async_trait]
pub trait QuestionHook: Send + Sync {
    async fn after_create(&self, question: &Question);
}

/// Comma separated suggestions; empty output and `None` mean no suggestion.
pub fn parse_category_list(response: &str) -> Vec<String> {
    let response = response.trim().trim_matches('`').trim();
    if response.is_empty() || response.eq_ignore_ascii_case(NO_SUGGESTION) {
        return Vec::new();
    }
    response
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(NO_SUGGESTION))
        .map(str::to_string)
        .collect()
}

/// `topic -> category, category` lines. Lines without an arrow are skipped.
pub fn parse_topic_lines(response: &str) -> Vec<(String, Vec<String>)> {
    response
        .lines()
        .filter_map(|line| {
            let line = line.trim().trim_start_matches(&['-', '*'][..]).trim();
            let (topic, categories) = line.split_once("->")?;
            let topic = topic.trim().trim_matches('`').trim();
            if topic.is_empty() {
                return None;
            }
            Some((topic.to_string(), parse_category_list(categories)))
        })
        .collect()
}

/// Resolves each suggestion to the closest known category, dropping the ones
/// below the cutoff. Duplicates collapse.
pub fn match_categories(suggestions: &[String], known: &[Category]) -> Vec<Category> {
    let names: Vec<&str> = known.iter().map(|c| c.name.as_str()).collect();
    let mut matched: Vec<Category> = Vec::new();

    for suggestion in suggestions {
        match similarity::best_match(suggestion, &names, CATEGORY_MATCH_CUTOFF) {
            Some(name) => {
                if let Some(category) = known.iter().find(|c| c.name == name) {
                    if !matched.iter().any(|m| m.id == category.id) {
                        matched.push(category.clone());
                    }
                }
            }
            None => log::warn!("No category matches suggestion '{}'", suggestion),
        }
    }

    matched
}

pub struct CategorizationService {
    llm: Option<Arc<dyn LlmClient>>,
    categories: Arc<dyn CategoryRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl CategorizationService {
    pub fn new(
        llm: Option<Arc<dyn LlmClient>>,
        categories: Arc<dyn CategoryRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            llm,
            categories,
            questions,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Transport failures are logged and read as "no answer".
    async fn ask(&self, prompt: &str) -> Option<String> {
        let llm = self.llm.as_ref()?;
        match llm.ask(prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                log::error!("LLM request failed: {}", e);
                None
            }
        }
    }

    pub async fn suggest_categories(&self, statement: &str) -> AppResult<Vec<Category>> {
        let known = self.categories.find_all().await?;
        if known.is_empty() {
            return Ok(Vec::new());
        }
        let names: Vec<String> = known.iter().map(|c| c.name.clone()).collect();

        let Some(response) = self.ask(&categorize_question_prompt(statement, &names)).await else {
            return Ok(Vec::new());
        };
        Ok(match_categories(&parse_category_list(&response), &known))
    }

    /// Adds the suggested categories to the question and persists them.
    /// Returns the ids that were added.
    pub async fn categorize_question(&self, question: &Question) -> AppResult<Vec<String>> {
        let suggested = self.suggest_categories(&question.statement).await?;
        let new_ids: Vec<String> = suggested
            .into_iter()
            .map(|c| c.id)
            .filter(|id| !question.category_ids.contains(id))
            .collect();

        if new_ids.is_empty() {
            return Ok(new_ids);
        }

        let mut updated = question.clone();
        updated.add_categories(new_ids.clone());
        self.questions
            .set_categories(&updated.id, &updated.category_ids)
            .await?;

        log::info!(
            "Categorized question '{}' with {} categories",
            question.short_statement(),
            new_ids.len()
        );
        Ok(new_ids)
    }

    /// One entry per requested topic, in request order.
    pub async fn classify_topics(&self, topics: &[String]) -> AppResult<Vec<CategorizedTopicDto>> {
        let mut result: Vec<CategorizedTopicDto> = topics
            .iter()
            .map(|topic| CategorizedTopicDto {
                topic: topic.clone(),
                categories: Vec::new(),
            })
            .collect();

        let known = self.categories.find_all().await?;
        if topics.is_empty() || known.is_empty() {
            return Ok(result);
        }
        let names: Vec<String> = known.iter().map(|c| c.name.clone()).collect();

        let Some(response) = self.ask(&classify_topics_prompt(topics, &names)).await else {
            return Ok(result);
        };

        for (topic, suggestions) in parse_topic_lines(&response) {
            let Some(matched_topic) = similarity::best_match(&topic, topics, CATEGORY_MATCH_CUTOFF)
            else {
                log::warn!("LLM answered for unknown topic '{}'", topic);
                continue;
            };

            if let Some(entry) = result.iter_mut().find(|e| e.topic == matched_topic) {
                for category in match_categories(&suggestions, &known) {
                    let dto = CategoryDto::from(&category);
                    if !entry.categories.contains(&dto) {
                        entry.categories.push(dto);
                    }
                }
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl QuestionHook for CategorizationService {
    async fn after_create(&self, question: &Question) {
        if !self.is_enabled() {
            return;
        }
        if let Err(e) = self.categorize_question(question).await {
            log::error!(
                "Failed to categorize question '{}': {}",
                question.short_statement(),
                e
            );
        }
    }
}
