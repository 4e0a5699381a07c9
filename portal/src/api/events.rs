//! `/events` endpoints.

use models::{Event, EventInput, slugify};
use reqwest::Method;

use super::{ApiClient, ApiError, Credentials, check, read_json};

/// # Errors
///
/// Returns [`ApiError`] on transport failure or a non-2xx response.
pub async fn list(api: &ApiClient) -> Result<Vec<Event>, ApiError> {
    let resp = api.request(Method::GET, &["events"], &Credentials::Anonymous)?.send().await?;
    read_json(resp).await
}

/// # Errors
///
/// Returns [`ApiError::Status`] with 404 for an unknown id.
pub async fn get(api: &ApiClient, id: &str) -> Result<Event, ApiError> {
    let resp = api.request(Method::GET, &["events", id], &Credentials::Anonymous)?.send().await?;
    read_json(resp).await
}

/// Create an event. A missing id is filled from the title before sending.
///
/// # Errors
///
/// Returns [`ApiError`] on transport failure or a non-2xx response.
pub async fn create(api: &ApiClient, credentials: &Credentials, input: &EventInput) -> Result<Event, ApiError> {
    let mut body = input.clone();
    if body.id.as_deref().is_none_or(|id| id.trim().is_empty()) && !body.title.trim().is_empty() {
        body.id = Some(slugify(&body.title));
    }
    let resp = api
        .request(Method::POST, &["events"], credentials)?
        .json(&body)
        .send()
        .await?;
    read_json(resp).await
}

/// Replace an event. The path id wins over any id in `input`.
///
/// # Errors
///
/// Returns [`ApiError`] on transport failure or a non-2xx response.
pub async fn update(api: &ApiClient, credentials: &Credentials, id: &str, input: &EventInput) -> Result<Event, ApiError> {
    let mut body = input.clone();
    body.id = Some(id.to_owned());
    let resp = api
        .request(Method::PUT, &["events", id], credentials)?
        .json(&body)
        .send()
        .await?;
    read_json(resp).await
}

/// # Errors
///
/// Returns [`ApiError`] on transport failure or a non-2xx response.
pub async fn delete(api: &ApiClient, credentials: &Credentials, id: &str) -> Result<(), ApiError> {
    let resp = api.request(Method::DELETE, &["events", id], credentials)?.send().await?;
    check(resp).await?;
    Ok(())
}
