pub mod answer_handler;
pub mod auth_handler;
pub mod category_handler;
pub mod health_handler;
pub mod predictor_handler;
pub mod quiz_handler;
pub mod team_handler;
pub mod user_handler;

use actix_web::{error, web, HttpRequest};

use crate::errors::AppError;

/// JSON extractor settings: malformed bodies become 400 `ValidationError`s.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
        AppError::ValidationError(err.to_string()).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, _req: &HttpRequest| {
        AppError::ValidationError(err.to_string()).into()
    })
}

/// Registers every route. Static paths go before `{id}` paths sharing
/// their prefix.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(health_handler::health_check)
        .service(health_handler::health_check_ready)
        .service(auth_handler::obtain_token)
        .service(auth_handler::refresh_token)
        .service(answer_handler::submit_answer)
        .service(category_handler::list_categories)
        .service(category_handler::list_category_groups)
        .service(category_handler::category_user_stats)
        .service(category_handler::category_stats)
        .service(predictor_handler::categorize_topics)
        .service(predictor_handler::order_of_play)
        .service(predictor_handler::sort_topics)
        .service(quiz_handler::list_quizzes)
        .service(quiz_handler::quiz_progress)
        .service(quiz_handler::random_topic)
        .service(quiz_handler::create_question)
        .service(quiz_handler::bulk_update_question_categories)
        .service(quiz_handler::question_stats)
        .service(quiz_handler::update_question_categories)
        .service(quiz_handler::get_quiz)
        .service(quiz_handler::delete_quiz)
        .service(quiz_handler::get_unanswered_quiz)
        .service(team_handler::get_team)
        .service(team_handler::team_category_group_stats)
        .service(user_handler::list_users)
        .service(user_handler::current_user)
        .service(user_handler::my_category_stats)
        .service(user_handler::my_groups)
        .service(user_handler::users_in_my_groups)
        .service(user_handler::group_stats);
}
