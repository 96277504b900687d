use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    auth::{verify_password, JwtService},
    errors::{AppError, AppResult},
    models::dto::{
        request::{LoginRequest, RefreshTokenRequest},
        response::{AccessTokenResponse, TokenPairResponse},
    },
    repositories::UserRepository,
};

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt_service: Arc<JwtService>) -> Self {
        Self { users, jwt_service }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<TokenPairResponse> {
        request.validate()?;

        let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

        let user = self
            .users
            .find_by_username(&request.username)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&request.password, &user.password_hash) {
            log::warn!("Failed login attempt for '{}'", request.username);
            return Err(invalid());
        }

        self.users.record_login(&user.id, Utc::now()).await?;
        log::info!("User '{}' logged in", user.username);

        Ok(TokenPairResponse {
            access: self.jwt_service.issue_access(&user)?,
            refresh: self.jwt_service.issue_refresh(&user.id)?,
        })
    }

    pub async fn refresh(&self, request: RefreshTokenRequest) -> AppResult<AccessTokenResponse> {
        request.validate()?;

        let claims = self.jwt_service.verify_refresh(&request.refresh)?;
        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

        Ok(AccessTokenResponse {
            access: self.jwt_service.issue_access(&user)?,
        })
    }
}
