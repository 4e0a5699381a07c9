//! Auth routes: Google OAuth flow, member and admin sessions, whitelist.
//!
//! DESIGN
//! ======
//! Member identity travels as a JWT, either in `Authorization: Bearer` (the
//! portal) or in the HttpOnly `access_token` cookie set by the callback. Admin
//! routes take a separate short-lived JWT in `X-Admin-Token`. Both extractors
//! reject with a `{"detail"}` 401.

use axum::extract::{FromRef, FromRequestParts, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use models::User;
use serde::Deserialize;
use serde_json::{Value, json};
use time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::routes::error::ApiError;
use crate::services::token::{AdminClaims, MemberClaims, verify_admin_password};
use crate::services::{auth as auth_svc, users};
use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";
const OAUTH_STATE_TTL: Duration = Duration::minutes(10);

fn cookie(name: &'static str, value: String, secure: bool, max_age: Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

pub(crate) fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_owned())
}

// =============================================================================
// AUTH EXTRACTORS
// =============================================================================

/// Signed-in member. Use as a handler parameter to require a member token.
pub struct MemberAuth {
    pub user_id: Uuid,
    pub claims: MemberClaims,
}

impl<S> FromRequestParts<S> for MemberAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get(ACCESS_TOKEN_COOKIE)
                .map(|c| c.value().to_owned())
                .filter(|v| !v.is_empty())
        });
        let Some(token) = token else {
            return Err(ApiError::unauthorized("Not authenticated"));
        };

        let app_state = AppState::from_ref(state);
        let claims = app_state.tokens.verify_member(&token)?;
        let user_id = claims.user_id().ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;
        Ok(Self { user_id, claims })
    }
}

/// Admin caller holding a token from `POST /auth/admin/login`.
pub struct AdminAuth {
    pub claims: AdminClaims,
}

impl<S> FromRequestParts<S> for AdminAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Admin authentication required"))?;

        let app_state = AppState::from_ref(state);
        let claims = app_state
            .tokens
            .verify_admin(token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired admin token"))?;
        Ok(Self { claims })
    }
}

// =============================================================================
// GOOGLE OAUTH
// =============================================================================

/// `GET /auth/login`: consent URL plus the signed `state` it carries.
pub async fn login(State(state): State<AppState>) -> Result<Response, ApiError> {
    let Some(google) = &state.config.google else {
        return Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Google OAuth not configured"));
    };

    let oauth_state = state.tokens.issue_oauth_state(OAUTH_STATE_TTL)?;
    let auth_url = google.authorize_url(&oauth_state).map_err(|e| {
        tracing::error!(error = %e, "authorize url build failed");
        ApiError::internal()
    })?;

    let jar = CookieJar::new().add(cookie(OAUTH_STATE_COOKIE, oauth_state.clone(), state.config.cookie_secure, OAUTH_STATE_TTL));
    Ok((jar, Json(json!({ "auth_url": auth_url.as_str(), "state": oauth_state }))).into_response())
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// `GET /auth/callback`: verify state, sign the member in, set the cookie,
/// and redirect to the portal's success page with the token in the fragment.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    let Some(google) = &state.config.google else {
        return Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Google OAuth not configured"));
    };
    if let Some(error) = params.error.as_deref() {
        info!(%error, "provider returned an error");
        return Err(ApiError::new(StatusCode::BAD_REQUEST, format!("Google sign-in was not completed: {error}")));
    }
    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "missing authorization code"));
    };

    // Verify OAuth CSRF state; the cookie is only present for same-browser starts.
    let Some(callback_state) = params.state.as_deref() else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "missing oauth state"));
    };
    if let Some(expected) = jar.get(OAUTH_STATE_COOKIE).map(Cookie::value)
        && !expected.is_empty()
        && expected != callback_state
    {
        return Err(ApiError::unauthorized("invalid oauth state"));
    }
    state
        .tokens
        .verify_oauth_state(callback_state)
        .map_err(|_| ApiError::unauthorized("invalid oauth state"))?;

    let (_, token) = auth_svc::complete_login(&state.pool, google, &state.tokens, code).await?;

    let secure = state.config.cookie_secure;
    let jar = jar
        .add(cookie(ACCESS_TOKEN_COOKIE, token.clone(), secure, state.tokens.member_ttl()))
        .add(cookie(OAUTH_STATE_COOKIE, String::new(), secure, Duration::ZERO));
    Ok((jar, Redirect::to(&state.config.auth_success_url(&token))).into_response())
}

// =============================================================================
// MEMBER SESSION
// =============================================================================

/// `GET /auth/me`: the signed-in member.
pub async fn me(State(state): State<AppState>, auth: MemberAuth) -> Result<Json<User>, ApiError> {
    Ok(Json(users::get_user(&state.pool, auth.user_id).await?))
}

/// `POST /auth/logout`: clear the cookie. Tokens are stateless, so this
/// always succeeds.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let jar = CookieJar::new().add(cookie(ACCESS_TOKEN_COOKIE, String::new(), state.config.cookie_secure, Duration::ZERO));
    (jar, Json(json!({ "message": "Logged out successfully" })))
}

// =============================================================================
// ADMIN
// =============================================================================

#[derive(Deserialize)]
pub struct AdminLoginBody {
    password: String,
}

/// `POST /auth/admin/login`: trade the admin password for an admin token.
pub async fn admin_login(
    State(state): State<AppState>,
    Json(body): Json<AdminLoginBody>,
) -> Result<Json<Value>, ApiError> {
    if !verify_admin_password(state.config.admin_password.as_deref(), &body.password) {
        warn!("admin login refused");
        return Err(ApiError::unauthorized("Invalid admin credentials"));
    }
    let admin_token = state.tokens.issue_admin()?;
    info!("admin signed in");
    Ok(Json(json!({ "admin_token": admin_token })))
}

/// `GET /auth/users`
pub async fn list_users(State(state): State<AppState>, _admin: AdminAuth) -> Result<Json<Value>, ApiError> {
    let users = users::list_users(&state.pool).await?;
    Ok(Json(json!({ "users": users })))
}

#[derive(Deserialize)]
pub struct EmailQuery {
    email: String,
}

/// `GET /auth/whitelist`
pub async fn list_whitelist(State(state): State<AppState>, _admin: AdminAuth) -> Result<Json<Value>, ApiError> {
    let whitelist = users::list_whitelist(&state.pool).await?;
    Ok(Json(json!({ "whitelist": whitelist })))
}

/// `POST /auth/whitelist?email=`
pub async fn add_whitelist(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Value>, ApiError> {
    let added = users::add_whitelist(&state.pool, &query.email).await?;
    info!(email = %added, "whitelisted");
    Ok(Json(json!({ "added": added })))
}

/// `DELETE /auth/whitelist?email=`
pub async fn remove_whitelist(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Value>, ApiError> {
    let removed = users::remove_whitelist(&state.pool, &query.email).await?;
    info!(email = %removed, "removed from whitelist");
    Ok(Json(json!({ "removed": removed })))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
