use chrono::Duration;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    auth::claims::{Claims, RefreshClaims, TokenClaims, TokenKind},
    errors::{AppError, AppResult},
    models::domain::user::User,
};

/// Signs and verifies the HS256 access and refresh tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &SecretString, access_hours: i64, refresh_hours: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl: Duration::hours(access_hours),
            refresh_ttl: Duration::hours(refresh_hours),
        }
    }

    pub fn issue_access(&self, user: &User) -> AppResult<String> {
        self.sign(&Claims::access(user, self.access_ttl))
    }

    pub fn issue_refresh(&self, user_id: &str) -> AppResult<String> {
        self.sign(&RefreshClaims::refresh(user_id, self.refresh_ttl))
    }

    pub fn verify_access(&self, token: &str) -> AppResult<Claims> {
        self.verify(token, TokenKind::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> AppResult<RefreshClaims> {
        self.verify(token, TokenKind::Refresh)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to sign token: {}", e)))
    }

    fn verify<T>(&self, token: &str, expected: TokenKind) -> AppResult<T>
    where
        T: DeserializeOwned + TokenClaims,
    {
        let claims = decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                AppError::Unauthorized(match e.kind() {
                    ErrorKind::ExpiredSignature => "Token has expired".to_string(),
                    ErrorKind::InvalidSignature => "Token signature is invalid".to_string(),
                    _ => format!("Invalid token: {}", e),
                })
            })?;

        if claims.kind() != expected {
            return Err(AppError::Unauthorized(format!(
                "Expected a {:?} token",
                expected
            )));
        }
        Ok(claims)
    }
}
