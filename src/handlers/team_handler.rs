use actix_web::{get, web, HttpResponse};

use crate::{app_state::AppState, auth::AuthenticatedUser, errors::AppError, services::AnswerScope};

#[get("/api/teams/{id}/")]
pub async fn get_team(
    state: web::Data<AppState>,
    id: web::Path<String>,
    _auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let team = state.user_service.team_detail(&id).await?;
    Ok(HttpResponse::Ok().json(team))
}

/// Members only.
#[get("/api/teams/{id}/stats/category-groups/")]
pub async fn team_category_group_stats(
    state: web::Data<AppState>,
    id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let team = state
        .user_service
        .ensure_team_member(auth.user_id(), &id)
        .await?;

    let member_ids: Vec<String> = state
        .user_service
        .team_members(&team.id)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();

    let stats = state
        .stats_service
        .group_stats(&AnswerScope::Users(member_ids))
        .await?;
    Ok(HttpResponse::Ok().json(stats))
}
