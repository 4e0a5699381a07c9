//! Admin panel session.
//!
//! Admins sign in with a shared password instead of the popup flow. The
//! backend answers with a short-lived admin token, kept under its own storage
//! key and sent as `X-Admin-Token`. Logging out is local only; the token simply
//! expires server-side.

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use tracing::info;

use crate::api::{self, ApiClient, ApiError, Credentials};
use crate::store::{ADMIN_TOKEN_KEY, StoreError, TokenCell, TokenStore};

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub struct AdminSession {
    api: ApiClient,
    token: TokenCell,
}

impl AdminSession {
    #[must_use]
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self { api, token: TokenCell::new(store, ADMIN_TOKEN_KEY) }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Exchange the password for an admin token and store it.
    ///
    /// # Errors
    ///
    /// [`AdminError::Api`] for a wrong password or transport failure,
    /// [`AdminError::Store`] when the token cannot be persisted.
    pub async fn login(&self, password: &str) -> Result<(), AdminError> {
        let token = api::auth::admin_login(&self.api, password).await?;
        self.token.save(&token)?;
        info!("admin signed in");
        Ok(())
    }

    pub fn logout(&self) {
        self.token.clear();
        info!("admin signed out");
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.load().is_some()
    }

    /// Admin credentials for the stored token.
    ///
    /// # Errors
    ///
    /// [`ApiError::MissingToken`] when no admin token is stored.
    pub fn credentials(&self) -> Result<Credentials, ApiError> {
        self.token.load().map(Credentials::Admin).ok_or(ApiError::MissingToken)
    }

    /// Start a request against an admin endpoint.
    ///
    /// # Errors
    ///
    /// [`ApiError::MissingToken`] when signed out; the request is never sent.
    pub fn authenticated_request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let credentials = self.credentials()?;
        self.api.request(method, segments, &credentials)
    }
}
