use super::*;
use crate::test_helpers::{FakeHost, dead_backend, serve};
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::json;

fn login_router(auth_url: &'static str) -> Router {
    Router::new().route(
        "/auth/login",
        get(move || async move { axum::Json(json!({ "auth_url": auth_url, "state": "xyz" })) }),
    )
}

#[tokio::test]
async fn initiate_opens_fixed_size_named_popup() {
    let base = serve(login_router("https://accounts.example.com/o/oauth2/auth?client_id=1")).await;
    let host = FakeHost::new();
    let handshake = PopupHandshake::new(ApiClient::new(base), host.clone());

    let pending = handshake.initiate().await.unwrap();

    assert_eq!(pending.auth_url().host_str(), Some("accounts.example.com"));
    let opened = host.opened();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].1, WINDOW_NAME);
    assert_eq!(opened[0].2.to_feature_string(), "width=600,height=700");
    assert!(!pending.is_closed());
}

#[tokio::test]
async fn initiate_fails_on_non_2xx_login_start() {
    let router = Router::new().route(
        "/auth/login",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, axum::Json(json!({ "detail": "Google login not configured" }))) }),
    );
    let base = serve(router).await;
    let host = FakeHost::new();
    let handshake = PopupHandshake::new(ApiClient::new(base), host.clone());

    let err = handshake.initiate().await.unwrap_err();

    assert!(matches!(err, HandshakeError::LoginStart(ApiError::Status { status: 503, .. })));
    assert!(host.opened().is_empty());
}

#[tokio::test]
async fn initiate_fails_on_transport_error() {
    let handshake = PopupHandshake::new(ApiClient::new(dead_backend()), FakeHost::new());
    let err = handshake.initiate().await.unwrap_err();
    assert!(matches!(err, HandshakeError::LoginStart(ApiError::Http(_))));
}

#[tokio::test]
async fn initiate_rejects_non_http_auth_url() {
    let base = serve(login_router("javascript:alert(1)")).await;
    let handshake = PopupHandshake::new(ApiClient::new(base), FakeHost::new());
    let err = handshake.initiate().await.unwrap_err();
    assert!(matches!(err, HandshakeError::InvalidAuthUrl(_)));
}

#[tokio::test]
async fn initiate_reports_blocked_popup() {
    let base = serve(login_router("https://accounts.example.com/auth")).await;
    let host = FakeHost::blocked();
    let handshake = PopupHandshake::new(ApiClient::new(base), host.clone());

    let err = handshake.initiate().await.unwrap_err();

    assert!(matches!(err, HandshakeError::PopupBlocked));
    assert_eq!(host.opened().len(), 1);
}

#[tokio::test]
async fn closed_resolves_after_user_closes_popup() {
    let base = serve(login_router("https://accounts.example.com/auth")).await;
    let host = FakeHost::new();
    let handshake =
        PopupHandshake::new(ApiClient::new(base), host.clone()).with_poll_interval(Duration::from_millis(10));
    let pending = handshake.initiate().await.unwrap();

    let popup = host.popup();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        popup.user_closes();
    });

    tokio::time::timeout(Duration::from_secs(2), pending.closed()).await.unwrap();
    assert!(pending.is_closed());
}

#[tokio::test]
async fn close_marks_popup_closed() {
    let base = serve(login_router("https://accounts.example.com/auth")).await;
    let host = FakeHost::new();
    let pending = PopupHandshake::new(ApiClient::new(base), host.clone()).initiate().await.unwrap();

    pending.close();

    assert!(pending.is_closed());
    assert_eq!(host.popup().close_calls(), 1);
}
