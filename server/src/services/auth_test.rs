use super::*;
use axum::Router;
use axum::extract::Form;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use std::collections::HashMap;

async fn spawn_provider(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn stub_config(base: &str) -> GoogleConfig {
    let mut config = GoogleConfig::new("client-id".into(), "client-secret".into(), "http://localhost:8000/auth/callback".into());
    config.token_url = format!("{base}/token");
    config.userinfo_url = format!("{base}/userinfo");
    config
}

async fn token_endpoint(Form(form): Form<HashMap<String, String>>) -> axum::response::Response {
    if form.get("code").map(String::as_str) == Some("good-code")
        && form.get("grant_type").map(String::as_str) == Some("authorization_code")
        && form.get("client_secret").map(String::as_str) == Some("client-secret")
    {
        axum::Json(serde_json::json!({ "access_token": "provider-token" })).into_response()
    } else {
        (StatusCode::BAD_REQUEST, axum::Json(serde_json::json!({ "error": "invalid_grant" }))).into_response()
    }
}

async fn userinfo_endpoint(headers: HeaderMap) -> axum::response::Response {
    let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
    if auth == Some("Bearer provider-token") {
        axum::Json(serde_json::json!({
            "id": "g-123",
            "email": "ada@example.com",
            "name": "Ada Lovelace",
            "picture": "https://example.com/ada.png"
        }))
        .into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

fn provider() -> Router {
    Router::new()
        .route("/token", post(token_endpoint))
        .route("/userinfo", get(userinfo_endpoint))
}

#[tokio::test]
async fn exchange_code_posts_form_and_reads_token() {
    let base = spawn_provider(provider()).await;
    let token = exchange_code(&stub_config(&base), "good-code").await.unwrap();
    assert_eq!(token, "provider-token");
}

#[tokio::test]
async fn exchange_code_rejected_code_is_exchange_error() {
    let base = spawn_provider(provider()).await;
    let err = exchange_code(&stub_config(&base), "bad-code").await.unwrap_err();
    assert!(matches!(err, AuthError::TokenExchange(msg) if msg.contains("400")));
}

#[tokio::test]
async fn exchange_code_unreachable_provider_is_exchange_error() {
    let config = stub_config("http://127.0.0.1:9");
    assert!(matches!(exchange_code(&config, "good-code").await, Err(AuthError::TokenExchange(_))));
}

#[tokio::test]
async fn fetch_google_user_sends_bearer() {
    let base = spawn_provider(provider()).await;
    let user = fetch_google_user(&stub_config(&base), "provider-token").await.unwrap();
    assert_eq!(user.id, "g-123");
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.display_name(), "Ada Lovelace");
}

#[tokio::test]
async fn fetch_google_user_bad_token_is_api_error() {
    let base = spawn_provider(provider()).await;
    let err = fetch_google_user(&stub_config(&base), "nope").await.unwrap_err();
    assert!(matches!(err, AuthError::GoogleApi(msg) if msg.contains("401")));
}

#[test]
fn display_name_falls_back_to_mailbox() {
    let user = GoogleUser { id: "1".into(), email: "grace@navy.mil".into(), name: Some("  ".into()), picture: None };
    assert_eq!(user.display_name(), "grace");
    let unnamed = GoogleUser { name: None, ..user };
    assert_eq!(unnamed.display_name(), "grace");
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn complete_login_requires_whitelist_then_upserts() {
    use crate::state::test_helpers::integration_pool;
    use time::Duration;

    let pool = integration_pool().await;
    let base = spawn_provider(provider()).await;
    let config = stub_config(&base);
    let keys = TokenKeys::new("test-secret", Duration::hours(24), Duration::minutes(120));

    let refused = complete_login(&pool, &config, &keys, "good-code").await;
    assert!(matches!(refused, Err(AuthError::NotWhitelisted(email)) if email == "ada@example.com"));
    assert!(users::list_users(&pool).await.unwrap().is_empty());

    users::add_whitelist(&pool, "Ada@Example.com").await.unwrap();
    let (user, token) = complete_login(&pool, &config, &keys, "good-code").await.unwrap();
    assert_eq!(user.google_id.as_deref(), Some("g-123"));
    assert_eq!(keys.verify_member(&token).unwrap().user_id(), Some(user.id));

    let (again, _) = complete_login(&pool, &config, &keys, "good-code").await.unwrap();
    assert_eq!(again.id, user.id);
}
