//! REST API helpers for communicating with the clubhouse backend.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns [`ApiError`]. Non-2xx responses carry the status and
//! the backend's `detail` message (falling back to the raw body, then the
//! canonical reason) so callers can show something meaningful without
//! re-parsing.

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

pub mod auth;
pub mod checkins;
pub mod events;
pub mod teams;
pub mod users;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

/// Header carrying the admin token on admin-only endpoints.
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request failed ({status}): {detail}")]
    Status { status: u16, detail: String },
    #[error("no authentication token found")]
    MissingToken,
}

impl ApiError {
    /// HTTP status for [`ApiError::Status`].
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }
}

/// How a request identifies its caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    Anonymous,
    /// Member session token, sent as `Authorization: Bearer`.
    Bearer(String),
    /// Admin token, sent as `X-Admin-Token`.
    Admin(String),
}

impl Credentials {
    #[must_use]
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Anonymous => request,
            Self::Bearer(token) => request.bearer_auth(token),
            Self::Admin(token) => request.header(ADMIN_TOKEN_HEADER, token),
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// Base URL plus a shared HTTP client.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    #[must_use]
    pub fn new(base: Url) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(base, http)
    }

    #[must_use]
    pub fn with_client(mut base: Url, http: reqwest::Client) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base, http }
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Absolute URL for a list of path segments under the base. Segments are
    /// percent-encoded individually.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if the base cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request with credentials applied.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if the endpoint cannot be built.
    pub fn request(&self, method: Method, segments: &[&str], credentials: &Credentials) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        Ok(credentials.apply(self.http.request(method, url)))
    }
}

/// Human-readable failure text from an error response body.
pub(crate) fn detail_from_body(status: StatusCode, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Detail {
        detail: String,
    }
    if let Ok(parsed) = serde_json::from_str::<Detail>(body) {
        return parsed.detail;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_owned();
    }
    status.canonical_reason().unwrap_or("unknown error").to_owned()
}

/// Pass 2xx responses through; turn everything else into [`ApiError::Status`].
pub(crate) async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status: status.as_u16(), detail: detail_from_body(status, &body) })
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    Ok(check(response).await?.json::<T>().await?)
}
