//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds every REST endpoint under a single Axum router. CORS is
//! limited to the configured portal origins with credentials allowed, since
//! the portal sends both bearer tokens and the `access_token` cookie.

pub mod auth;
pub mod checkins;
pub mod error;
pub mod events;
pub mod teams;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::response::Json;
use axum::routing::{get, post};
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, HeaderName::from_static(auth::ADMIN_TOKEN_HEADER)])
}

/// Full API router with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/login", get(auth::login))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/admin/login", post(auth::admin_login))
        .route("/auth/users", get(auth::list_users))
        .route(
            "/auth/whitelist",
            get(auth::list_whitelist)
                .post(auth::add_whitelist)
                .delete(auth::remove_whitelist),
        )
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route("/teams/me", get(teams::my_teams))
        .route(
            "/teams/{id}",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        .route(
            "/teams/{id}/checkins",
            get(checkins::list_for_team).post(checkins::create_checkin),
        )
        .route(
            "/checkins/{id}",
            get(checkins::get_checkin).delete(checkins::delete_checkin),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Clubhouse API" }))
}

async fn health() -> Json<Value> {
    let timestamp = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
    Json(json!({ "status": "healthy", "timestamp": timestamp }))
}
