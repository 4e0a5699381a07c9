//! Google OAuth service: code exchange, profile fetch, whitelist gate, user
//! upsert, and member token issue.
//!
//! SYSTEM CONTEXT
//! ==============
//! `GET /auth/callback` hands the provider's `code` to [`complete_login`].
//! Only whitelisted emails get a user row and a token; everyone else is
//! turned away before anything is written.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use models::User;
use sqlx::PgPool;
use tracing::info;

use crate::config::GoogleConfig;
use crate::services::token::{TokenError, TokenKeys};
use crate::services::{ServiceError, users};

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Profile returned by the provider's userinfo endpoint.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GoogleUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl GoogleUser {
    /// Display name, falling back to the mailbox part of the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => self.email.split('@').next().unwrap_or_default().to_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("google token exchange failed: {0}")]
    TokenExchange(String),
    #[error("google api error: {0}")]
    GoogleApi(String),
    #[error("email {0} is not whitelisted")]
    NotWhitelisted(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Exchange an OAuth code for a provider access token.
///
/// # Errors
///
/// Returns [`AuthError::TokenExchange`] on transport failures and non-token
/// responses.
pub async fn exchange_code(config: &GoogleConfig, code: &str) -> Result<String, AuthError> {
    let client = reqwest::Client::new();
    let resp = client
        .post(&config.token_url)
        .header("Accept", "application/json")
        .form(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;
    if !status.is_success() {
        return Err(AuthError::TokenExchange(format!("{status}: {body}")));
    }
    let token_resp: TokenResponse =
        serde_json::from_str(&body).map_err(|_| AuthError::TokenExchange(format!("unexpected response: {body}")))?;
    Ok(token_resp.access_token)
}

/// Fetch the signed-in provider user's profile.
///
/// # Errors
///
/// Returns [`AuthError::GoogleApi`] on transport failures, non-2xx statuses,
/// and malformed bodies.
pub async fn fetch_google_user(config: &GoogleConfig, access_token: &str) -> Result<GoogleUser, AuthError> {
    let client = reqwest::Client::new();
    let resp = client
        .get(&config.userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| AuthError::GoogleApi(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::GoogleApi(format!("{status}: {body}")));
    }

    resp.json::<GoogleUser>()
        .await
        .map_err(|e| AuthError::GoogleApi(e.to_string()))
}

/// Run the whole provider callback: exchange, profile, whitelist, upsert,
/// and token issue. Returns the stored user and its member token.
///
/// # Errors
///
/// Returns [`AuthError::NotWhitelisted`] for unknown emails and the matching
/// variant for provider, database, or signing failures.
pub async fn complete_login(
    pool: &PgPool,
    config: &GoogleConfig,
    keys: &TokenKeys,
    code: &str,
) -> Result<(User, String), AuthError> {
    let access_token = exchange_code(config, code).await?;
    let profile = fetch_google_user(config, &access_token).await?;

    if !users::is_whitelisted(pool, &profile.email).await? {
        info!(email = %profile.email, "login refused; email not whitelisted");
        return Err(AuthError::NotWhitelisted(profile.email));
    }

    let user = users::upsert_google_user(pool, &profile).await?;
    let token = keys.issue_member(user.id, &user.email, &user.name)?;
    info!(user_id = %user.id, "member signed in");
    Ok((user, token))
}
