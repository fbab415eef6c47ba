use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::{Database, DatabaseError};
use crate::models::team::TeamInput;
use crate::models::{Player, Team, User};

#[derive(Debug, thiserror::Error)]
pub enum TeamError {
    #[error("Team not found")]
    NotFound,
    #[error("Team name already exists")]
    DuplicateName,
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence for team rows and their embedded player arrays.
///
/// Player mutations are read-modify-write on the whole row (load team,
/// mutate the JSONB array in memory, save). There is no optimistic locking;
/// two concurrent adds can race past the duplicate-number scan.
pub struct TeamService {
    pool: PgPool,
}

impl TeamService {
    pub async fn new() -> Result<Self, TeamError> {
        let pool = Database::pool().await?;
        Ok(Self { pool })
    }

    pub async fn create_team(&self, input: TeamInput, manager: Uuid) -> Result<Team, TeamError> {
        sqlx::query_as::<_, Team>(
            "INSERT INTO teams (name, city, stadium, sport, manager, players)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.stadium)
        .bind(input.sport)
        .bind(manager)
        .bind(Json(Vec::<Player>::new()))
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    /// All teams, most recently created first.
    pub async fn list_teams(&self) -> Result<Vec<Team>, TeamError> {
        let teams = sqlx::query_as::<_, Team>("SELECT * FROM teams ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(teams)
    }

    pub async fn get_team(&self, team_id: Uuid) -> Result<Team, TeamError> {
        sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(TeamError::NotFound)
    }

    /// Persist the mutable team columns after an in-memory update.
    pub async fn update_team(&self, team: &Team) -> Result<Team, TeamError> {
        sqlx::query_as::<_, Team>(
            "UPDATE teams
             SET name = $2, city = $3, stadium = $4, sport = $5, updated_at = $6
             WHERE id = $1
             RETURNING *",
        )
        .bind(team.id)
        .bind(&team.name)
        .bind(&team.city)
        .bind(&team.stadium)
        .bind(team.sport)
        .bind(team.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?
        .ok_or(TeamError::NotFound)
    }

    /// Persist the embedded player array after an in-memory mutation.
    pub async fn save_players(&self, team: &Team) -> Result<(), TeamError> {
        let result = sqlx::query("UPDATE teams SET players = $2, updated_at = $3 WHERE id = $1")
            .bind(team.id)
            .bind(&team.players)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TeamError::NotFound);
        }
        Ok(())
    }

    /// Hard delete; embedded players go with the row.
    pub async fn delete_team(&self, team_id: Uuid) -> Result<(), TeamError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(team_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TeamError::NotFound);
        }
        Ok(())
    }

    /// Resolve manager ids to full user records for read responses.
    pub async fn resolve_users(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, User>, TeamError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;

        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}

// Postgres unique violation, the analog of a document-store duplicate key
fn map_unique_violation(err: sqlx::Error) -> TeamError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            TeamError::DuplicateName
        }
        _ => TeamError::Sqlx(err),
    }
}
