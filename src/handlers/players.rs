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
use crate::models::{NewPlayer, Player, PlayerUpdate};
use crate::services::TeamService;

/// POST /teams/:teamId/players - Add a player to a team's roster
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Path(team_id): Path<Uuid>,
    Json(body): Json<NewPlayer>,
) -> Result<impl IntoResponse, ApiError> {
    let service = TeamService::new().await?;
    let mut team = service.get_team(team_id).await?;

    let input = body.validate()?;

    // Linear scan over the embedded roster; not race-safe under
    // concurrent adds to the same team.
    if team.has_player_number(input.player_number) {
        return Err(ApiError::validation(
            "Player with this number already exists.",
        ));
    }

    // The adder becomes the player's manager; they need not manage the team
    let player = Player::new(input, user.user_id);
    team.push_player(player.clone());
    service.save_players(&team).await?;

    Ok((StatusCode::CREATED, Json(player)))
}

/// PUT /teams/:teamId/players/:playerId - Update a player; that player's manager only
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path((team_id, player_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<PlayerUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let service = TeamService::new().await?;
    let mut team = service.get_team(team_id).await?;

    // Existence before ownership
    let player = team
        .find_player_mut(player_id)
        .ok_or_else(|| ApiError::not_found("Player not found."))?;

    if !player.is_managed_by(user.user_id) {
        return Err(ApiError::forbidden(
            "You are not authorized to update this player.",
        ));
    }

    player.apply_update(body);
    let player = player.clone();
    service.save_players(&team).await?;

    Ok(Json(json!({
        "message": "Player updated successfully.",
        "player": player
    })))
}

/// DELETE /teams/:teamId/players/:playerId - Remove a player; that player's manager only
pub async fn remove(
    Extension(user): Extension<AuthUser>,
    Path((team_id, player_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let service = TeamService::new().await?;
    let mut team = service.get_team(team_id).await?;

    // Existence before ownership
    let player = team
        .find_player(player_id)
        .ok_or_else(|| ApiError::not_found("Player not found."))?;

    if !player.is_managed_by(user.user_id) {
        return Err(ApiError::forbidden(
            "You are not authorized to delete this player.",
        ));
    }

    team.remove_player(player_id);
    service.save_players(&team).await?;

    Ok(Json(json!({ "message": "Player deleted successfully." })))
}
