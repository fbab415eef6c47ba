use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::User;

/// Closed set of sports a team can play; also the `sport` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sport")]
pub enum Sport {
    Baseball,
    Football,
    Basketball,
    Hockey,
    Soccer,
}

impl Sport {
    pub const ALL: [Sport; 5] = [
        Sport::Baseball,
        Sport::Football,
        Sport::Basketball,
        Sport::Hockey,
        Sport::Soccer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Baseball => "Baseball",
            Sport::Football => "Football",
            Sport::Basketball => "Basketball",
            Sport::Hockey => "Hockey",
            Sport::Soccer => "Soccer",
        }
    }

    pub fn parse(s: &str) -> Option<Sport> {
        Sport::ALL.iter().copied().find(|sport| sport.as_str() == s)
    }

    fn invalid() -> ApiError {
        ApiError::validation(
            "Sport must be one of: Baseball, Football, Basketball, Hockey, Soccer.",
        )
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roster entry embedded in exactly one team; no lifecycle of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub player_number: i32,
    pub position: String,
    /// The user who added the player; may differ from the team's manager.
    pub manager: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    pub fn new(input: PlayerInput, manager: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name: input.first_name,
            last_name: input.last_name,
            player_number: input.player_number,
            position: input.position,
            manager,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_managed_by(&self, user_id: Uuid) -> bool {
        self.manager == user_id
    }

    /// Merge an allow-listed partial update; ownership and ids stay untouched.
    pub fn apply_update(&mut self, update: PlayerUpdate) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(player_number) = update.player_number {
            self.player_number = player_number;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        self.updated_at = Utc::now();
    }
}

/// Team row; players embed as an ordered JSONB array.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub stadium: String,
    pub sport: Sport,
    /// The owning user; set at creation, no route changes it.
    pub manager: Uuid,
    pub players: Json<Vec<Player>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub fn is_managed_by(&self, user_id: Uuid) -> bool {
        self.manager == user_id
    }

    pub fn has_player_number(&self, number: i32) -> bool {
        self.players.iter().any(|p| p.player_number == number)
    }

    pub fn find_player(&self, player_id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn find_player_mut(&mut self, player_id: Uuid) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn push_player(&mut self, player: Player) {
        self.players.push(player);
    }

    pub fn remove_player(&mut self, player_id: Uuid) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == player_id)?;
        Some(self.players.remove(index))
    }

    /// Merge an allow-listed partial update; `manager`, ids, players and
    /// timestamps are not externally settable.
    pub fn apply_update(&mut self, update: TeamUpdate) -> Result<(), ApiError> {
        let sport = update.parsed_sport()?;

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(city) = update.city {
            self.city = city;
        }
        if let Some(stadium) = update.stadium {
            self.stadium = stadium;
        }
        if let Some(sport) = sport {
            self.sport = sport;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Every user id referenced by this team (owner plus player managers).
    pub fn manager_ids(&self) -> Vec<Uuid> {
        let mut ids = vec![self.manager];
        for player in self.players.iter() {
            if !ids.contains(&player.manager) {
                ids.push(player.manager);
            }
        }
        ids
    }
}

/// Request body for POST /teams. Fields are optional at the wire level so a
/// missing field produces the contract's 400 message rather than a
/// deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct NewTeam {
    pub name: Option<String>,
    pub city: Option<String>,
    pub stadium: Option<String>,
    pub sport: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TeamInput {
    pub name: String,
    pub city: String,
    pub stadium: String,
    pub sport: Sport,
}

const TEAM_FIELDS_REQUIRED: &str = "All fields (name, city, stadium, sport) are required.";
const PLAYER_FIELDS_REQUIRED: &str =
    "All fields (first_name, last_name, player_number, position) are required.";

impl NewTeam {
    pub fn validate(self) -> Result<TeamInput, ApiError> {
        let required = || ApiError::validation(TEAM_FIELDS_REQUIRED);

        let name = self.name.filter(|s| !s.is_empty()).ok_or_else(required)?;
        let city = self.city.filter(|s| !s.is_empty()).ok_or_else(required)?;
        let stadium = self.stadium.filter(|s| !s.is_empty()).ok_or_else(required)?;
        let sport = self.sport.filter(|s| !s.is_empty()).ok_or_else(required)?;

        let sport = Sport::parse(&sport).ok_or_else(Sport::invalid)?;

        Ok(TeamInput {
            name,
            city,
            stadium,
            sport,
        })
    }
}

/// Request body for PUT /teams/:teamId. Unknown fields (including `manager`
/// and `id`) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub city: Option<String>,
    pub stadium: Option<String>,
    pub sport: Option<String>,
}

impl TeamUpdate {
    fn parsed_sport(&self) -> Result<Option<Sport>, ApiError> {
        match &self.sport {
            None => Ok(None),
            Some(s) => Sport::parse(s).map(Some).ok_or_else(Sport::invalid),
        }
    }
}

/// Request body for POST /teams/:teamId/players.
#[derive(Debug, Default, Deserialize)]
pub struct NewPlayer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub player_number: Option<i32>,
    pub position: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub first_name: String,
    pub last_name: String,
    pub player_number: i32,
    pub position: String,
}

impl NewPlayer {
    pub fn validate(self) -> Result<PlayerInput, ApiError> {
        let required = || ApiError::validation(PLAYER_FIELDS_REQUIRED);

        let first_name = self.first_name.filter(|s| !s.is_empty()).ok_or_else(required)?;
        let last_name = self.last_name.filter(|s| !s.is_empty()).ok_or_else(required)?;
        let player_number = self.player_number.ok_or_else(required)?;
        let position = self.position.filter(|s| !s.is_empty()).ok_or_else(required)?;

        Ok(PlayerInput {
            first_name,
            last_name,
            player_number,
            position,
        })
    }
}

/// Request body for PUT /teams/:teamId/players/:playerId. Unknown fields
/// (including `manager` and `id`) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct PlayerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub player_number: Option<i32>,
    pub position: Option<String>,
}

/// Team for list responses: `manager` resolved to the full user record.
#[derive(Debug, Serialize)]
pub struct TeamWithManager {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub stadium: String,
    pub sport: Sport,
    pub manager: Option<User>,
    pub players: Vec<Player>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamWithManager {
    pub fn compose(team: Team, users: &HashMap<Uuid, User>) -> Self {
        Self {
            manager: users.get(&team.manager).cloned(),
            id: team.id,
            name: team.name,
            city: team.city,
            stadium: team.stadium,
            sport: team.sport,
            players: team.players.0,
            created_at: team.created_at,
            updated_at: team.updated_at,
        }
    }
}

/// Player for single-team responses: `manager` resolved to the full record.
#[derive(Debug, Serialize)]
pub struct PlayerWithManager {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub player_number: i32,
    pub position: String,
    pub manager: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerWithManager {
    fn compose(player: Player, users: &HashMap<Uuid, User>) -> Self {
        Self {
            manager: users.get(&player.manager).cloned(),
            id: player.id,
            first_name: player.first_name,
            last_name: player.last_name,
            player_number: player.player_number,
            position: player.position,
            created_at: player.created_at,
            updated_at: player.updated_at,
        }
    }
}

/// Team for GET /teams/:teamId: manager and every player's manager resolved.
#[derive(Debug, Serialize)]
pub struct TeamDetail {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub stadium: String,
    pub sport: Sport,
    pub manager: Option<User>,
    pub players: Vec<PlayerWithManager>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamDetail {
    pub fn compose(team: Team, users: &HashMap<Uuid, User>) -> Self {
        Self {
            manager: users.get(&team.manager).cloned(),
            players: team
                .players
                .0
                .into_iter()
                .map(|p| PlayerWithManager::compose(p, users))
                .collect(),
            id: team.id,
            name: team.name,
            city: team.city,
            stadium: team.stadium,
            sport: team.sport,
            created_at: team.created_at,
            updated_at: team.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(manager: Uuid) -> Team {
        let now = Utc::now();
        Team {
            id: Uuid::new_v4(),
            name: "Eagles".to_string(),
            city: "X".to_string(),
            stadium: "Y".to_string(),
            sport: Sport::Football,
            manager,
            players: Json(Vec::new()),
            created_at: now,
            updated_at: now,
        }
    }

    fn player_input(number: i32) -> PlayerInput {
        PlayerInput {
            first_name: "J".to_string(),
            last_name: "D".to_string(),
            player_number: number,
            position: "QB".to_string(),
        }
    }

    #[test]
    fn test_sport_parse() {
        assert_eq!(Sport::parse("Football"), Some(Sport::Football));
        assert_eq!(Sport::parse("Hockey"), Some(Sport::Hockey));
        assert_eq!(Sport::parse("football"), None);
        assert_eq!(Sport::parse("Cricket"), None);
    }

    #[test]
    fn test_new_team_requires_all_fields() {
        let body = NewTeam {
            name: Some("Eagles".to_string()),
            city: Some("X".to_string()),
            stadium: None,
            sport: Some("Football".to_string()),
        };
        let err = body.validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.message(),
            "All fields (name, city, stadium, sport) are required."
        );
    }

    #[test]
    fn test_new_team_rejects_empty_strings() {
        let body = NewTeam {
            name: Some(String::new()),
            city: Some("X".to_string()),
            stadium: Some("Y".to_string()),
            sport: Some("Football".to_string()),
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_new_team_rejects_unknown_sport() {
        let body = NewTeam {
            name: Some("Eagles".to_string()),
            city: Some("X".to_string()),
            stadium: Some("Y".to_string()),
            sport: Some("Cricket".to_string()),
        };
        let err = body.validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.message().starts_with("Sport must be one of"));
    }

    #[test]
    fn test_new_player_requires_all_fields() {
        let body = NewPlayer {
            first_name: Some("J".to_string()),
            last_name: Some("D".to_string()),
            player_number: None,
            position: Some("QB".to_string()),
        };
        let err = body.validate().unwrap_err();
        assert_eq!(
            err.message(),
            "All fields (first_name, last_name, player_number, position) are required."
        );
    }

    #[test]
    fn test_duplicate_player_number_scan() {
        let manager = Uuid::new_v4();
        let mut team = team(manager);
        team.push_player(Player::new(player_input(7), manager));

        assert!(team.has_player_number(7));
        assert!(!team.has_player_number(8));
    }

    #[test]
    fn test_team_ownership_check() {
        let manager = Uuid::new_v4();
        let team = team(manager);
        assert!(team.is_managed_by(manager));
        assert!(!team.is_managed_by(Uuid::new_v4()));
    }

    #[test]
    fn test_player_ownership_independent_of_team_manager() {
        let team_manager = Uuid::new_v4();
        let adder = Uuid::new_v4();
        let mut team = team(team_manager);
        team.push_player(Player::new(player_input(7), adder));

        let player = &team.players[0];
        assert!(player.is_managed_by(adder));
        assert!(!player.is_managed_by(team_manager));
    }

    #[test]
    fn test_team_update_preserves_manager() {
        let manager = Uuid::new_v4();
        let mut team = team(manager);

        team.apply_update(TeamUpdate {
            city: Some("Z".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(team.city, "Z");
        assert_eq!(team.manager, manager);
        assert_eq!(team.name, "Eagles");
    }

    #[test]
    fn test_team_update_rejects_unknown_sport() {
        let mut team = team(Uuid::new_v4());
        let err = team
            .apply_update(TeamUpdate {
                sport: Some("Cricket".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(team.sport, Sport::Football);
    }

    #[test]
    fn test_player_update_preserves_manager_and_absent_fields() {
        let adder = Uuid::new_v4();
        let mut player = Player::new(player_input(7), adder);

        player.apply_update(PlayerUpdate {
            position: Some("WR".to_string()),
            ..Default::default()
        });

        assert_eq!(player.position, "WR");
        assert_eq!(player.player_number, 7);
        assert_eq!(player.first_name, "J");
        assert_eq!(player.manager, adder);
    }

    #[test]
    fn test_remove_player() {
        let manager = Uuid::new_v4();
        let mut team = team(manager);
        team.push_player(Player::new(player_input(7), manager));
        team.push_player(Player::new(player_input(8), manager));
        let target = team.players[0].id;

        let removed = team.remove_player(target).unwrap();
        assert_eq!(removed.player_number, 7);
        assert_eq!(team.players.len(), 1);
        assert!(team.remove_player(target).is_none());
    }

    #[test]
    fn test_manager_ids_deduplicated() {
        let manager = Uuid::new_v4();
        let adder = Uuid::new_v4();
        let mut team = team(manager);
        team.push_player(Player::new(player_input(7), manager));
        team.push_player(Player::new(player_input(8), adder));

        let ids = team.manager_ids();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&manager));
        assert!(ids.contains(&adder));
    }
}
