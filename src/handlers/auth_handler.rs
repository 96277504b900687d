use actix_web::{post, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::{LoginRequest, RefreshTokenRequest},
};

#[post("/api/token/")]
pub async fn obtain_token(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let tokens = state.auth_service.login(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

#[post("/api/token/refresh/")]
pub async fn refresh_token(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.refresh(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
