//! Team routes. Reads are public apart from `/teams/me`; writes need an
//! admin token.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use models::{Team, TeamInput};
use tracing::info;
use uuid::Uuid;

use crate::routes::auth::{AdminAuth, MemberAuth};
use crate::routes::error::ApiError;
use crate::services::teams;
use crate::state::AppState;

/// `GET /teams`
pub async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<Team>>, ApiError> {
    Ok(Json(teams::list_teams(&state.pool).await?))
}

/// `GET /teams/me`: teams the caller captains or belongs to.
pub async fn my_teams(State(state): State<AppState>, auth: MemberAuth) -> Result<Json<Vec<Team>>, ApiError> {
    Ok(Json(teams::teams_for_user(&state.pool, auth.user_id).await?))
}

/// `GET /teams/{id}`
pub async fn get_team(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Team>, ApiError> {
    Ok(Json(teams::get_team(&state.pool, id).await?))
}

/// `POST /teams`
pub async fn create_team(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Json(body): Json<TeamInput>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let team = teams::create_team(&state.pool, &body).await?;
    info!(team_id = %team.id, event_id = %team.event.id, "team created");
    Ok((StatusCode::CREATED, Json(team)))
}

/// `PUT /teams/{id}`
pub async fn update_team(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<TeamInput>,
) -> Result<Json<Team>, ApiError> {
    Ok(Json(teams::update_team(&state.pool, id, &body).await?))
}

/// `DELETE /teams/{id}`
pub async fn delete_team(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    teams::delete_team(&state.pool, id).await?;
    info!(team_id = %id, "team deleted");
    Ok(StatusCode::NO_CONTENT)
}
