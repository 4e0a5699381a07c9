//! Team check-in endpoints.

use models::{Checkin, CheckinCreate};
use reqwest::Method;
use uuid::Uuid;

use super::{ApiClient, ApiError, Credentials, check, read_json};

/// # Errors
///
/// Returns [`ApiError`] on transport failure or a non-2xx response.
pub async fn list_for_team(api: &ApiClient, team_id: Uuid) -> Result<Vec<Checkin>, ApiError> {
    let team_id = team_id.to_string();
    let resp = api
        .request(Method::GET, &["teams", &team_id, "checkins"], &Credentials::Anonymous)?
        .send()
        .await?;
    read_json(resp).await
}

/// Submit a check-in as a member of the team.
///
/// # Errors
///
/// Returns [`ApiError::Status`] with 403 when the caller is not on the team.
pub async fn create(
    api: &ApiClient,
    credentials: &Credentials,
    team_id: Uuid,
    body: &CheckinCreate,
) -> Result<Checkin, ApiError> {
    let team_id = team_id.to_string();
    let resp = api
        .request(Method::POST, &["teams", &team_id, "checkins"], credentials)?
        .json(body)
        .send()
        .await?;
    read_json(resp).await
}

/// # Errors
///
/// Returns [`ApiError::Status`] with 404 for an unknown id.
pub async fn get(api: &ApiClient, id: Uuid) -> Result<Checkin, ApiError> {
    let id = id.to_string();
    let resp = api.request(Method::GET, &["checkins", &id], &Credentials::Anonymous)?.send().await?;
    read_json(resp).await
}

/// # Errors
///
/// Returns [`ApiError`] on transport failure or a non-2xx response.
pub async fn delete(api: &ApiClient, credentials: &Credentials, id: Uuid) -> Result<(), ApiError> {
    let id = id.to_string();
    let resp = api.request(Method::DELETE, &["checkins", &id], credentials)?.send().await?;
    check(resp).await?;
    Ok(())
}
