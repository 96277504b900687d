use actix_web::{post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{request::SubmitAnswerRequest, response::UserAnswerDto},
};

/// 201 when the answer is new, 200 when it replaced an earlier one.
#[post("/api/answers/")]
pub async fn submit_answer(
    state: web::Data<AppState>,
    request: web::Json<SubmitAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (answer, created) = state
        .answer_service
        .submit(auth.user_id(), request.into_inner())
        .await?;

    let body = UserAnswerDto::from(answer);
    if created {
        Ok(HttpResponse::Created().json(body))
    } else {
        Ok(HttpResponse::Ok().json(body))
    }
}
