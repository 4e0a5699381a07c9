//! Environment configuration.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read once at startup and shared through `AppState`. Google login is
//! optional: without a client id and secret the login routes answer 503 and
//! everything else keeps working.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

#[cfg(test)]
use std::collections::HashMap;

use tracing::warn;
use url::Url;

use crate::services::token::generate_token;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;
const DEFAULT_ADMIN_TOKEN_MINUTES: i64 = 120;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{key} has an invalid value `{value}`")]
    Invalid { key: &'static str, value: String },
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Google OAuth client settings.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl GoogleConfig {
    #[must_use]
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            authorize_url: GOOGLE_AUTHORIZE_URL.to_owned(),
            token_url: GOOGLE_TOKEN_URL.to_owned(),
            userinfo_url: GOOGLE_USERINFO_URL.to_owned(),
        }
    }

    /// Provider consent URL carrying the CSRF `state`.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the configured authorize URL is malformed.
    pub fn authorize_url(&self, state: &str) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &self.authorize_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", "openid email profile"),
                ("response_type", "code"),
                ("state", state),
            ],
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    /// `None` disables admin login.
    pub admin_password: Option<String>,
    pub admin_token_minutes: i64,
    pub frontend_url: Url,
    pub cors_origins: Vec<String>,
    pub cookie_secure: bool,
    pub google: Option<GoogleConfig>,
    pub db_max_connections: u32,
}

impl Config {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a missing `DATABASE_URL` or any value that
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a key lookup. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let port = parse_or(&get, "PORT", DEFAULT_PORT)?;
        let jwt_expiration_hours = parse_or(&get, "JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS)?;
        let admin_token_minutes = parse_or(&get, "ADMIN_TOKEN_MINUTES", DEFAULT_ADMIN_TOKEN_MINUTES)?;
        let db_max_connections = parse_or(&get, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using a random secret, tokens will not survive restart");
            generate_token()
        });

        let admin_password = get("ADMIN_PASSWORD");
        if admin_password.is_none() {
            warn!("ADMIN_PASSWORD not set; admin login disabled");
        }

        let frontend_raw = get("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_owned());
        let frontend_url = Url::parse(&frontend_raw)
            .map_err(|_| ConfigError::Invalid { key: "FRONTEND_URL", value: frontend_raw.clone() })?;

        let cors_origins = match get("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().trim_end_matches('/').to_owned())
                .filter(|o| !o.is_empty())
                .collect(),
            None => vec![
                frontend_url.origin().ascii_serialization(),
                "http://127.0.0.1:3000".to_owned(),
            ],
        };

        let cookie_secure = match get("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { key: "COOKIE_SECURE", value: raw })?,
            None => frontend_url.scheme() == "https",
        };

        let google = match (get("GOOGLE_CLIENT_ID"), get("GOOGLE_CLIENT_SECRET")) {
            (Some(id), Some(secret)) => {
                let redirect = get("GOOGLE_REDIRECT_URI")
                    .unwrap_or_else(|| format!("http://localhost:{port}/auth/callback"));
                Some(GoogleConfig::new(id, secret, redirect))
            }
            _ => {
                warn!("Google OAuth not configured; member login disabled");
                None
            }
        };

        Ok(Self {
            database_url,
            port,
            jwt_secret,
            jwt_expiration_hours,
            admin_password,
            admin_token_minutes,
            frontend_url,
            cors_origins,
            cookie_secure,
            google,
            db_max_connections,
        })
    }

    #[cfg(test)]
    pub fn from_map(map: &HashMap<&str, &str>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| map.get(key).map(|v| (*v).to_owned()))
    }

    /// Where the provider callback sends the browser after a login.
    #[must_use]
    pub fn auth_success_url(&self, token: &str) -> String {
        let mut url = self.frontend_url.clone();
        url.set_path("/auth/success");
        url.set_query(None);
        url.set_fragment(Some(&format!("access_token={token}")));
        url.to_string()
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
