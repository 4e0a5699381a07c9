//! Check-in routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use models::{Checkin, CheckinCreate};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::routes::auth::{AdminAuth, MemberAuth};
use crate::routes::error::ApiError;
use crate::services::checkins;
use crate::state::AppState;

/// `GET /teams/{id}/checkins`
pub async fn list_for_team(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<Vec<Checkin>>, ApiError> {
    Ok(Json(checkins::list_for_team(&state.pool, team_id).await?))
}

/// `POST /teams/{id}/checkins`: caller must be on the team.
pub async fn create_checkin(
    State(state): State<AppState>,
    auth: MemberAuth,
    Path(team_id): Path<Uuid>,
    Json(body): Json<CheckinCreate>,
) -> Result<(StatusCode, Json<Checkin>), ApiError> {
    let checkin = checkins::create_checkin(&state.pool, team_id, auth.user_id, &body).await?;
    info!(team_id = %team_id, email = %auth.claims.email, links = checkin.links.len(), "checked in");
    Ok((StatusCode::CREATED, Json(checkin)))
}

/// `GET /checkins/{id}`
pub async fn get_checkin(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Checkin>, ApiError> {
    Ok(Json(checkins::get_checkin(&state.pool, id).await?))
}

/// `DELETE /checkins/{id}`
pub async fn delete_checkin(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    checkins::delete_checkin(&state.pool, id).await?;
    info!(checkin_id = %id, "checkin deleted");
    Ok(Json(json!({ "deleted": true })))
}
