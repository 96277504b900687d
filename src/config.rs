use std::{env, str::FromStr};

use secrecy::{ExposeSecret, SecretString};

const DEFAULT_JWT_SECRET: &str = "dev_secret_key_change_in_production";
const MIN_JWT_SECRET_LEN: usize = 32;
const DEFAULT_TRACKED_TEAM: &str = "José Figueiras";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-nano";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub jwt_refresh_expiration_hours: i64,
    pub openai_api_key: Option<SecretString>,
    pub openai_model: String,
    pub llm_cache_enabled: bool,
    pub llm_cache_ttl_secs: u64,
    /// Team whose players' answers are recorded during import.
    pub tracked_team: String,
    pub cors_allowed_origin: Option<String>,
}

fn text(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparseable {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| parse_flag(&v).unwrap_or(default))
        .unwrap_or(default)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: text("MONGO_CONN_STRING", "mongodb://localhost:27017"),
            mongo_db_name: text("MONGO_DB_NAME", "quizstats-local"),
            web_server_host: text("WEB_SERVER_HOST", "localhost"),
            web_server_port: parsed("WEB_SERVER_PORT", 8080),
            jwt_secret: SecretString::from(text("JWT_SECRET", DEFAULT_JWT_SECRET)),
            jwt_expiration_hours: parsed("JWT_EXPIRATION_HOURS", 24),
            jwt_refresh_expiration_hours: parsed("JWT_REFRESH_EXPIRATION_HOURS", 168),
            openai_api_key: non_empty("OPENAI_API_KEY").map(SecretString::from),
            openai_model: text("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            llm_cache_enabled: flag("LLM_CACHE_ENABLED", true),
            llm_cache_ttl_secs: parsed("LLM_CACHE_TTL_SECS", 60 * 60),
            tracked_team: text("TRACKED_TEAM", DEFAULT_TRACKED_TEAM),
            cors_allowed_origin: non_empty("CORS_ALLOWED_ORIGIN"),
        }
    }

    /// Panics when the JWT secret is the development default or too short.
    pub fn validate_for_production(&self) {
        let secret = self.jwt_secret.expose_secret();

        if secret == DEFAULT_JWT_SECRET {
            panic!("FATAL: JWT_SECRET is using the development default; set it to a random string");
        }
        if secret.len() < MIN_JWT_SECRET_LEN {
            panic!(
                "FATAL: JWT_SECRET has {} characters, at least {} are required",
                secret.len(),
                MIN_JWT_SECRET_LEN
            );
        }
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.web_server_host.clone(), self.web_server_port)
    }

    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "quizstats-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            jwt_refresh_expiration_hours: 24,
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            llm_cache_enabled: false,
            llm_cache_ttl_secs: 60,
            tracked_team: DEFAULT_TRACKED_TEAM.to_string(),
            cors_allowed_origin: None,
        }
    }
}
