use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::errors::{AppError, AppResult};

pub const QUIZ_ASSISTANT_INSTRUCTIONS: &str = "You are a quiz assistant that answer with few words";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// `None` for empty prompts and empty completions.
    async fn ask(&self, prompt: &str) -> AppResult<Option<String>>;
}

#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String, ttl: Duration);
}

pub fn cache_key(prompt: &str) -> String {
    format!("ask_llm:{:x}", Sha256::digest(prompt.as_bytes()))
}

#[derive(Default)]
pub struct InMemoryResponseCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(value, _)| value.clone())
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value, now + ttl));
    }
}

pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    model: String,
    cache: Option<Arc<dyn ResponseCache>>,
    cache_ttl: Duration,
}

impl OpenAiLlmClient {
    pub fn new(api_key: &SecretString, model: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.expose_secret());

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            cache: None,
            cache_ttl: Duration::from_secs(60 * 60),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl;
        self
    }

    async fn complete(&self, prompt: &str) -> AppResult<Option<String>> {
        let request = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": QUIZ_ASSISTANT_INSTRUCTIONS},
                {"role": "user", "content": prompt}
            ]
        });

        let response: Value = self
            .client
            .chat()
            .create_byot(request)
            .await
            .map_err(|e| AppError::InternalError(format!("LLM request failed: {}", e)))?;

        Ok(completion_text(&response))
    }
}

/// First choice's message content, trimmed; `None` when missing or blank.
fn completion_text(response: &Value) -> Option<String> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl LlmClient for OpenAiLlmClient {
    async fn ask(&self, prompt: &str) -> AppResult<Option<String>> {
        if prompt.trim().is_empty() {
            return Ok(None);
        }

        let key = cache_key(prompt);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                log::debug!("LLM cache hit for {}", key);
                return Ok(Some(hit));
            }
        }

        log::debug!("Asking LLM ({}) for {}", self.model, key);
        let output = self.complete(prompt).await?;

        if let (Some(cache), Some(text)) = (&self.cache, &output) {
            cache.set(&key, text.clone(), self.cache_ttl).await;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_stable_sha256_hex() {
        let key = cache_key("hello");
        assert_eq!(
            key,
            "ask_llm:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_ne!(cache_key("hello"), cache_key("hello "));
    }

    #[test]
    fn completion_text_reads_first_choice() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "  History, Cinema \n"}}]
        });
        assert_eq!(completion_text(&response), Some("History, Cinema".to_string()));
    }

    #[test]
    fn completion_text_handles_empty_or_missing_content() {
        assert_eq!(completion_text(&json!({"choices": []})), None);
        assert_eq!(
            completion_text(&json!({"choices": [{"message": {"content": "   "}}]})),
            None
        );
    }

    #[tokio::test]
    async fn in_memory_cache_returns_fresh_entries() {
        let cache = InMemoryResponseCache::new();
        cache.set("k", "v".to_string(), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some("v".to_string()));
        assert_eq!(cache.get("other").await, None);
    }

    #[tokio::test]
    async fn in_memory_cache_expires_entries() {
        let cache = InMemoryResponseCache::new();
        cache.set("k", "v".to_string(), Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn empty_prompt_is_not_sent() {
        let client = OpenAiLlmClient::new(&SecretString::from("sk-test".to_string()), "gpt-4.1-nano");
        assert_eq!(client.ask("   ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn cached_answer_skips_the_network() {
        let cache = Arc::new(InMemoryResponseCache::new());
        cache
            .set(&cache_key("Capital of France?"), "Paris".to_string(), Duration::from_secs(60))
            .await;

        let client = OpenAiLlmClient::new(&SecretString::from("sk-test".to_string()), "gpt-4.1-nano")
            .with_cache(cache, Duration::from_secs(60));

        assert_eq!(
            client.ask("Capital of France?").await.unwrap(),
            Some("Paris".to_string())
        );
    }
}
