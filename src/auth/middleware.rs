use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::Header, web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};

use crate::{app_state::AppState, auth::Claims, errors::AppError};

/// Extractor for authenticated user in handlers.
///
/// Reads the `Authorization: Bearer <token>` header and validates it with the
/// application's `JwtService`. Any handler taking this argument rejects
/// anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }

    pub fn is_staff(&self) -> bool {
        self.0.is_staff
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(AuthenticatedUser))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Claims, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("JWT service not configured".to_string()))?;

    let header = Authorization::<Bearer>::parse(req)
        .map_err(|_| AppError::Unauthorized("Missing or malformed authorization header".to_string()))?;

    state
        .jwt_service
        .verify_access(header.as_ref().token())
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
}
