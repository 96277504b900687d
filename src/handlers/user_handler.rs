use actix_web::{get, web, HttpResponse};

use crate::{app_state::AppState, auth::AuthenticatedUser, errors::AppError, services::AnswerScope};

#[get("/api/users/")]
pub async fn list_users(
    state: web::Data<AppState>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let users = state.user_service.list_players().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[get("/api/users/me/")]
pub async fn current_user(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.current_user(auth.user_id()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[get("/api/users/me/stats/categories/")]
pub async fn my_category_stats(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let stats = state
        .stats_service
        .answered_category_stats(auth.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/api/users/groups/")]
pub async fn my_groups(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let teams = state.user_service.my_teams(auth.user_id()).await?;
    Ok(HttpResponse::Ok().json(teams))
}

#[get("/api/users/in-my-groups/")]
pub async fn users_in_my_groups(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let users = state.user_service.users_in_my_teams(auth.user_id()).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// `identifier` is `me`, `team` (every respondent) or a user id.
#[get("/api/users/{identifier}/stats/groups/")]
pub async fn group_stats(
    state: web::Data<AppState>,
    identifier: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let scope = match identifier.as_str() {
        "me" => AnswerScope::User(auth.user_id().to_string()),
        "team" => AnswerScope::Everyone,
        user_id => {
            let user = state.user_service.get_user(user_id).await?;
            AnswerScope::User(user.id)
        }
    };

    let stats = state.stats_service.ranked_group_stats(&scope).await?;
    Ok(HttpResponse::Ok().json(stats))
}
