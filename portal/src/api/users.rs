//! Admin user and whitelist endpoints.

use models::User;
use reqwest::Method;
use serde::Deserialize;

use super::{ApiClient, ApiError, Credentials, read_json};

#[derive(Deserialize)]
struct UsersResponse {
    users: Vec<User>,
}

#[derive(Deserialize)]
struct WhitelistResponse {
    whitelist: Vec<String>,
}

#[derive(Deserialize)]
struct AddedResponse {
    added: String,
}

#[derive(Deserialize)]
struct RemovedResponse {
    removed: String,
}

/// # Errors
///
/// Returns [`ApiError::Status`] with 401 without a valid admin token.
pub async fn list_users(api: &ApiClient, credentials: &Credentials) -> Result<Vec<User>, ApiError> {
    let resp = api.request(Method::GET, &["auth", "users"], credentials)?.send().await?;
    let body: UsersResponse = read_json(resp).await?;
    Ok(body.users)
}

/// # Errors
///
/// Returns [`ApiError::Status`] with 401 without a valid admin token.
pub async fn list_whitelist(api: &ApiClient, credentials: &Credentials) -> Result<Vec<String>, ApiError> {
    let resp = api.request(Method::GET, &["auth", "whitelist"], credentials)?.send().await?;
    let body: WhitelistResponse = read_json(resp).await?;
    Ok(body.whitelist)
}

/// Add an email to the sign-in whitelist. Returns the stored (lowercased)
/// address.
///
/// # Errors
///
/// Returns [`ApiError::Status`] with 401 without a valid admin token.
pub async fn add_whitelist(api: &ApiClient, credentials: &Credentials, email: &str) -> Result<String, ApiError> {
    let resp = api
        .request(Method::POST, &["auth", "whitelist"], credentials)?
        .query(&[("email", email)])
        .send()
        .await?;
    let body: AddedResponse = read_json(resp).await?;
    Ok(body.added)
}

/// # Errors
///
/// Returns [`ApiError::Status`] with 404 when the address is not listed.
pub async fn remove_whitelist(api: &ApiClient, credentials: &Credentials, email: &str) -> Result<String, ApiError> {
    let resp = api
        .request(Method::DELETE, &["auth", "whitelist"], credentials)?
        .query(&[("email", email)])
        .send()
        .await?;
    let body: RemovedResponse = read_json(resp).await?;
    Ok(body.removed)
}
