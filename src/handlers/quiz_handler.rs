use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{require_staff, AuthenticatedUser},
    errors::AppError,
    models::dto::request::{
        BulkUpdateQuestionCategoriesRequest, CreateQuestionRequest, UpdateQuestionCategoriesRequest,
    },
};

#[get("/api/quizzes/")]
pub async fn list_quizzes(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quizzes = state.quiz_service.list_quizzes().await?;
    Ok(HttpResponse::Ok().json(quizzes))
}

#[get("/api/quizzes/{id}/")]
pub async fn get_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.quiz_detail(&id).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[delete("/api/quizzes/{id}/")]
pub async fn delete_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.0)?;

    state.quiz_service.delete_quiz(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/api/quizzes/{id}/unanswered/")]
pub async fn get_unanswered_quiz(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let quiz = state
        .quiz_service
        .unanswered_quiz_detail(&id, auth.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[get("/api/quizzes/progress/")]
pub async fn quiz_progress(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let progress = state.stats_service.quiz_progress(auth.user_id()).await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[get("/api/quizzes/topics/random/")]
pub async fn random_topic(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .quiz_service
        .random_unanswered_topic(auth.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/quizzes/questions/")]
pub async fn create_question(
    state: web::Data<AppState>,
    request: web::Json<CreateQuestionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.0)?;

    let question = state
        .quiz_service
        .create_question(request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(question))
}

#[get("/api/quizzes/questions/{id}/stats/")]
pub async fn question_stats(
    state: web::Data<AppState>,
    id: web::Path<String>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let stats = state.stats_service.question_stats(&id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[put("/api/quizzes/questions/{id}/categories/update/")]
pub async fn update_question_categories(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateQuestionCategoriesRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.0)?;

    let question = state
        .quiz_service
        .update_question_categories(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(question))
}

#[post("/api/quizzes/questions/categories/bulk-update/")]
pub async fn bulk_update_question_categories(
    state: web::Data<AppState>,
    request: web::Json<BulkUpdateQuestionCategoriesRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.0)?;

    let response = state
        .quiz_service
        .bulk_update_question_categories(request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
