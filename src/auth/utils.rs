use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::domain::User,
};

pub fn require_staff(claims: &Claims) -> AppResult<()> {
    if !claims.is_staff {
        return Err(AppError::Forbidden(
            "Only staff members can perform this action".to_string(),
        ));
    }
    Ok(())
}

pub fn require_team_member(user: &User, team_id: &str) -> AppResult<()> {
    if !user.is_member_of(team_id) {
        return Err(AppError::Forbidden(
            "You can only view teams you belong to".to_string(),
        ));
    }
    Ok(())
}
