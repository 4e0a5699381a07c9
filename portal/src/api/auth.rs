//! `/auth` endpoints.

use models::User;
use reqwest::Method;
use serde::Deserialize;

use super::{ApiClient, ApiError, Credentials, check, read_json};

/// Response of `GET /auth/login`.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginStart {
    pub auth_url: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// Ask the backend for the provider authorization URL.
///
/// # Errors
///
/// Returns [`ApiError`] on transport failure or a non-2xx response.
pub async fn start_login(api: &ApiClient) -> Result<LoginStart, ApiError> {
    let resp = api
        .request(Method::GET, &["auth", "login"], &Credentials::Anonymous)?
        .send()
        .await?;
    read_json(resp).await
}

/// Fetch the user behind `credentials` from `GET /auth/me`.
///
/// # Errors
///
/// Returns [`ApiError::Status`] with 401 when the token is missing or
/// rejected.
pub async fn fetch_me(api: &ApiClient, credentials: &Credentials) -> Result<User, ApiError> {
    let resp = api.request(Method::GET, &["auth", "me"], credentials)?.send().await?;
    read_json(resp).await
}

/// Notify the backend of a logout.
///
/// # Errors
///
/// Returns [`ApiError`] on transport failure or a non-2xx response.
pub async fn logout(api: &ApiClient, credentials: &Credentials) -> Result<(), ApiError> {
    let resp = api.request(Method::POST, &["auth", "logout"], credentials)?.send().await?;
    check(resp).await?;
    Ok(())
}

#[derive(Deserialize)]
struct AdminLoginResponse {
    admin_token: String,
}

/// Exchange the admin password for an admin token.
///
/// # Errors
///
/// Returns [`ApiError::Status`] with 401 for a wrong password.
pub async fn admin_login(api: &ApiClient, password: &str) -> Result<String, ApiError> {
    let resp = api
        .request(Method::POST, &["auth", "admin", "login"], &Credentials::Anonymous)?
        .json(&serde_json::json!({ "password": password }))
        .send()
        .await?;
    let body: AdminLoginResponse = read_json(resp).await?;
    Ok(body.admin_token)
}
