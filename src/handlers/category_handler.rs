use actix_web::{get, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::CategoryStatsQuery,
    services::AnswerScope,
};

#[get("/api/quizzes/categories/")]
pub async fn list_categories(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let categories = state.quiz_service.list_categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}

/// Public: the front end needs the group list before login.
#[get("/api/quizzes/categories/groups/")]
pub async fn list_category_groups(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let groups = state.quiz_service.category_groups().await?;
    Ok(HttpResponse::Ok().json(groups))
}

#[get("/api/quizzes/categories/users/stats/")]
pub async fn category_user_stats(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let stats = state.stats_service.category_user_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// `?user=me` or `?user=<id>` narrows the stats to one respondent.
#[get("/api/quizzes/categories/{id}/stats/")]
pub async fn category_stats(
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<CategoryStatsQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let scope = match query.into_inner().user.as_deref() {
        None => AnswerScope::Everyone,
        Some("me") => AnswerScope::User(auth.user_id().to_string()),
        Some(user_id) => {
            let user = state.user_service.get_user(user_id).await?;
            AnswerScope::User(user.id)
        }
    };

    let stats = state.stats_service.category_stats(&id, &scope).await?;
    Ok(HttpResponse::Ok().json(stats))
}
