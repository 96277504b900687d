use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::user::User;

/// Which of the two token flavours a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Payloads carry their kind so one flavour can't stand in for the other.
pub trait TokenClaims {
    fn kind(&self) -> TokenKind;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub is_staff: bool,
    #[serde(rename = "token_type")]
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn access(user: &User, ttl: Duration) -> Self {
        let (iat, exp) = lifetime(ttl);
        Self {
            sub: user.id.clone(),
            username: user.username.clone(),
            is_staff: user.is_staff,
            kind: TokenKind::Access,
            iat,
            exp,
        }
    }
}

impl TokenClaims for Claims {
    fn kind(&self) -> TokenKind {
        self.kind
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    #[serde(rename = "token_type")]
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

impl RefreshClaims {
    pub fn refresh(user_id: &str, ttl: Duration) -> Self {
        let (iat, exp) = lifetime(ttl);
        Self {
            sub: user_id.to_string(),
            kind: TokenKind::Refresh,
            iat,
            exp,
        }
    }
}

impl TokenClaims for RefreshClaims {
    fn kind(&self) -> TokenKind {
        self.kind
    }
}

fn lifetime(ttl: Duration) -> (i64, i64) {
    let now = Utc::now();
    (now.timestamp(), (now + ttl).timestamp())
}
