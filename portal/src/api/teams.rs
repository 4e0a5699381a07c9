//! `/teams` endpoints.

use models::{Team, TeamInput};
use reqwest::Method;
use uuid::Uuid;

use super::{ApiClient, ApiError, Credentials, check, read_json};

/// # Errors
///
/// Returns [`ApiError`] on transport failure or a non-2xx response.
pub async fn list(api: &ApiClient) -> Result<Vec<Team>, ApiError> {
    let resp = api.request(Method::GET, &["teams"], &Credentials::Anonymous)?.send().await?;
    read_json(resp).await
}

/// Teams the signed-in member captains or belongs to.
///
/// # Errors
///
/// Returns [`ApiError::Status`] with 401 without a member token.
pub async fn mine(api: &ApiClient, credentials: &Credentials) -> Result<Vec<Team>, ApiError> {
    let resp = api.request(Method::GET, &["teams", "me"], credentials)?.send().await?;
    read_json(resp).await
}

/// # Errors
///
/// Returns [`ApiError::Status`] with 404 for an unknown id.
pub async fn get(api: &ApiClient, id: Uuid) -> Result<Team, ApiError> {
    let id = id.to_string();
    let resp = api.request(Method::GET, &["teams", &id], &Credentials::Anonymous)?.send().await?;
    read_json(resp).await
}

/// # Errors
///
/// Returns [`ApiError`] on transport failure or a non-2xx response.
pub async fn create(api: &ApiClient, credentials: &Credentials, input: &TeamInput) -> Result<Team, ApiError> {
    let resp = api
        .request(Method::POST, &["teams"], credentials)?
        .json(input)
        .send()
        .await?;
    read_json(resp).await
}

/// # Errors
///
/// Returns [`ApiError`] on transport failure or a non-2xx response.
pub async fn update(
    api: &ApiClient,
    credentials: &Credentials,
    id: Uuid,
    input: &TeamInput,
) -> Result<Team, ApiError> {
    let id = id.to_string();
    let resp = api
        .request(Method::PUT, &["teams", &id], credentials)?
        .json(input)
        .send()
        .await?;
    read_json(resp).await
}

/// # Errors
///
/// Returns [`ApiError`] on transport failure or a non-2xx response.
pub async fn delete(api: &ApiClient, credentials: &Credentials, id: Uuid) -> Result<(), ApiError> {
    let id = id.to_string();
    let resp = api.request(Method::DELETE, &["teams", &id], credentials)?.send().await?;
    check(resp).await?;
    Ok(())
}
