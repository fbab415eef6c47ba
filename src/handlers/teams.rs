use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{NewTeam, TeamDetail, TeamUpdate, TeamWithManager};
use crate::services::TeamService;

/// POST /teams - Create a new team; the acting user becomes its manager
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NewTeam>,
) -> Result<impl IntoResponse, ApiError> {
    let input = body.validate()?;

    let service = TeamService::new().await?;
    let team = service.create_team(input, user.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "team": team, "manager": user.user_id })),
    ))
}

/// GET /teams - All teams, managers resolved, most recent first
pub async fn list(Extension(_user): Extension<AuthUser>) -> Result<impl IntoResponse, ApiError> {
    let service = TeamService::new().await?;
    let teams = service.list_teams().await?;

    let mut manager_ids: Vec<Uuid> = Vec::new();
    for team in &teams {
        if !manager_ids.contains(&team.manager) {
            manager_ids.push(team.manager);
        }
    }
    let users = service.resolve_users(&manager_ids).await?;

    let teams: Vec<TeamWithManager> = teams
        .into_iter()
        .map(|team| TeamWithManager::compose(team, &users))
        .collect();

    Ok(Json(teams))
}

/// GET /teams/:teamId - Single team with manager and player managers resolved
pub async fn get(
    Extension(_user): Extension<AuthUser>,
    Path(team_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = TeamService::new().await?;
    let team = service.get_team(team_id).await?;

    let users = service.resolve_users(&team.manager_ids()).await?;

    Ok(Json(TeamDetail::compose(team, &users)))
}

/// PUT /teams/:teamId - Update a team; manager only
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path(team_id): Path<Uuid>,
    Json(body): Json<TeamUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let service = TeamService::new().await?;
    let mut team = service.get_team(team_id).await?;

    if !team.is_managed_by(user.user_id) {
        return Err(ApiError::forbidden(
            "You are not authorized to update this team.",
        ));
    }

    team.apply_update(body)?;
    let team = service.update_team(&team).await?;

    Ok(Json(team))
}

/// DELETE /teams/:teamId - Hard delete a team and its embedded players; manager only
pub async fn remove(
    Extension(user): Extension<AuthUser>,
    Path(team_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = TeamService::new().await?;
    let team = service.get_team(team_id).await?;

    if !team.is_managed_by(user.user_id) {
        return Err(ApiError::forbidden(
            "You are not authorized to delete this team.",
        ));
    }

    service.delete_team(team_id).await?;

    Ok(Json(json!({ "message": "Team deleted successfully." })))
}
