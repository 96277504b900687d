use std::{collections::HashMap, sync::Arc};

use crate::{
    auth::require_team_member,
    errors::{AppError, AppResult},
    models::{
        domain::{Team, User},
        dto::response::{TeamDto, TeamSummaryDto, UserDetailDto, UserListDto},
    },
    repositories::{AnswerRepository, TeamRepository, UserRepository},
};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    teams: Arc<dyn TeamRepository>,
    answers: Arc<dyn AnswerRepository>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        teams: Arc<dyn TeamRepository>,
        answers: Arc<dyn AnswerRepository>,
    ) -> Self {
        Self {
            users,
            teams,
            answers,
        }
    }

    pub async fn get_user(&self, id: &str) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::missing("User", id))
    }

    pub async fn get_team(&self, id: &str) -> AppResult<Team> {
        self.teams
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::missing("Team", id))
    }

    pub async fn current_user(&self, user_id: &str) -> AppResult<UserDetailDto> {
        let user = self.get_user(user_id).await?;
        let teams = self.teams.find_by_ids(&user.team_ids).await?;
        Ok(UserDetailDto::new(&user, &teams))
    }

    /// Everyone except staff accounts.
    pub async fn list_players(&self) -> AppResult<Vec<UserListDto>> {
        let users = self.users.find_all().await?;
        Ok(users
            .iter()
            .filter(|u| !u.is_staff)
            .map(UserListDto::from)
            .collect())
    }

    pub async fn all_users(&self) -> AppResult<Vec<User>> {
        self.users.find_all().await
    }

    pub async fn my_teams(&self, user_id: &str) -> AppResult<Vec<TeamSummaryDto>> {
        let user = self.get_user(user_id).await?;
        let teams = self.teams.find_by_ids(&user.team_ids).await?;
        Ok(teams.iter().map(TeamSummaryDto::from).collect())
    }

    /// Users sharing at least one team with `user_id`, the user included.
    pub async fn users_in_my_teams(&self, user_id: &str) -> AppResult<Vec<UserDetailDto>> {
        let user = self.get_user(user_id).await?;
        if user.team_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mates = self.users.find_by_teams(&user.team_ids).await?;
        let mut team_ids: Vec<String> = mates.iter().flat_map(|u| u.team_ids.clone()).collect();
        team_ids.sort();
        team_ids.dedup();
        let teams = self.teams.find_by_ids(&team_ids).await?;

        Ok(mates
            .iter()
            .map(|mate| UserDetailDto::new(mate, &teams))
            .collect())
    }

    pub async fn team_members(&self, team_id: &str) -> AppResult<Vec<User>> {
        self.users.find_by_teams(&[team_id.to_string()]).await
    }

    /// Team with its non-staff members, most active first.
    pub async fn team_detail(&self, team_id: &str) -> AppResult<TeamDto> {
        let team = self.get_team(team_id).await?;
        let mut members: Vec<User> = self
            .team_members(team_id)
            .await?
            .into_iter()
            .filter(|u| !u.is_staff)
            .collect();

        let member_ids: Vec<String> = members.iter().map(|u| u.id.clone()).collect();
        let mut answer_counts: HashMap<String, usize> = HashMap::new();
        for answer in self.answers.find_by_users(&member_ids).await? {
            *answer_counts.entry(answer.user_id).or_default() += 1;
        }

        members.sort_by(|a, b| {
            let count_a = answer_counts.get(&a.id).copied().unwrap_or_default();
            let count_b = answer_counts.get(&b.id).copied().unwrap_or_default();
            count_b.cmp(&count_a)
        });

        Ok(TeamDto {
            id: team.id.clone(),
            name: team.name.clone(),
            users: members.iter().map(UserListDto::from).collect(),
        })
    }

    /// Forbidden unless `user_id` belongs to `team_id`.
    pub async fn ensure_team_member(&self, user_id: &str, team_id: &str) -> AppResult<Team> {
        let team = self.get_team(team_id).await?;
        let user = self.get_user(user_id).await?;
        require_team_member(&user, &team.id)?;
        Ok(team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::UserAnswer,
        repositories::{
            answer_repository::MockAnswerRepository, team_repository::MockTeamRepository,
            user_repository::MockUserRepository,
        },
        test_utils::fixtures::staff_user,
    };

    #[tokio::test]
    async fn list_players_excludes_staff() {
        let mut users = MockUserRepository::new();
        users.expect_find_all().returning(|| {
            Ok(vec![
                User::new("Ana", "Silva", "ana", "ana@example.com"),
                staff_user("admin"),
            ])
        });

        let service = UserService::new(
            Arc::new(users),
            Arc::new(MockTeamRepository::new()),
            Arc::new(MockAnswerRepository::new()),
        );

        let players = service.list_players().await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].username, "ana");
    }

    #[tokio::test]
    async fn team_detail_orders_members_by_answer_count() {
        let team = Team::new("José Figueiras");
        let quiet =
            User::new("Quiet", "One", "quiet", "q@example.com").with_teams(vec![team.id.clone()]);
        let busy =
            User::new("Busy", "One", "busy", "b@example.com").with_teams(vec![team.id.clone()]);
        let coach = User::new("Coach", "Staff", "coach", "c@example.com")
            .with_teams(vec![team.id.clone()])
            .staff();

        let mut teams = MockTeamRepository::new();
        let found = team.clone();
        teams
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));

        let mut users = MockUserRepository::new();
        let members = vec![quiet.clone(), busy.clone(), coach];
        users
            .expect_find_by_teams()
            .returning(move |_| Ok(members.clone()));

        let mut answers = MockAnswerRepository::new();
        let busy_id = busy.id.clone();
        let quiet_id = quiet.id.clone();
        answers.expect_find_by_users().returning(move |_| {
            Ok(vec![
                UserAnswer::new(&busy_id, "q-1", true),
                UserAnswer::new(&busy_id, "q-2", false),
                UserAnswer::new(&quiet_id, "q-1", true),
            ])
        });

        let service = UserService::new(Arc::new(users), Arc::new(teams), Arc::new(answers));
        let detail = service.team_detail(&team.id).await.unwrap();

        let usernames: Vec<&str> = detail.users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(usernames, vec!["busy", "quiet"]);
    }

    #[tokio::test]
    async fn ensure_team_member_forbids_outsiders() {
        let team = Team::new("José Figueiras");
        let outsider = User::new("Out", "Sider", "outsider", "o@example.com");

        let mut teams = MockTeamRepository::new();
        let found = team.clone();
        teams
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        let mut users = MockUserRepository::new();
        let user = outsider.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(
            Arc::new(users),
            Arc::new(teams),
            Arc::new(MockAnswerRepository::new()),
        );

        let result = service.ensure_team_member(&outsider.id, &team.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
