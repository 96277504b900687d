use actix_web::{post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{
        request::{AptitudeRequest, TopicCategorizationRequest, TopicExpectationRequest},
        response::TopicCategorizationResponse,
    },
};

#[post("/api/quizzes/predictor/topics/categorize/")]
pub async fn categorize_topics(
    state: web::Data<AppState>,
    request: web::Json<TopicCategorizationRequest>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let categorization = &state.categorization_service;
    let response = TopicCategorizationResponse {
        first_half_categories: categorization
            .classify_topics(&request.first_half_topics)
            .await?,
        second_half_categories: categorization
            .classify_topics(&request.second_half_topics)
            .await?,
    };
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/quizzes/predictor/order-of-play/")]
pub async fn order_of_play(
    state: web::Data<AppState>,
    request: web::Json<AptitudeRequest>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let aptitudes = state.stats_service.aptitude(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(aptitudes))
}

#[post("/api/quizzes/predictor/topics/sort/")]
pub async fn sort_topics(
    state: web::Data<AppState>,
    request: web::Json<TopicExpectationRequest>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .stats_service
        .topic_expectations(request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
