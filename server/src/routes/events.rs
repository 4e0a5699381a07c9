//! Event catalogue routes. Reads are public; writes need an admin token.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use models::{Event, EventInput};
use tracing::info;

use crate::routes::auth::AdminAuth;
use crate::routes::error::ApiError;
use crate::services::events;
use crate::state::AppState;

/// `GET /events`
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(events::list_events(&state.pool).await?))
}

/// `GET /events/{id}`
pub async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Event>, ApiError> {
    Ok(Json(events::get_event(&state.pool, &id).await?))
}

/// `POST /events`
pub async fn create_event(
    State(state): State<AppState>,
    admin: AdminAuth,
    Json(body): Json<EventInput>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = events::create_event(&state.pool, body).await?;
    info!(event_id = %event.id, by = %admin.claims.sub, "event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// `PUT /events/{id}`
pub async fn update_event(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(body): Json<EventInput>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(events::update_event(&state.pool, &id, body).await?))
}

/// `DELETE /events/{id}`
pub async fn delete_event(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    events::delete_event(&state.pool, &id).await?;
    info!(event_id = %id, "event deleted");
    Ok(StatusCode::NO_CONTENT)
}
