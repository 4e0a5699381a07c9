use super::*;
use crate::state::test_helpers::test_app_state;
use axum::http::{HeaderValue, Request};

fn parts_with(headers: &[(&str, &str)]) -> Parts {
    let mut builder = Request::builder().uri("/auth/me");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(()).unwrap().into_parts().0
}

// =============================================================================
// bearer_token
// =============================================================================

#[test]
fn bearer_token_reads_authorization_header() {
    let parts = parts_with(&[("authorization", "Bearer abc.def.ghi")]);
    assert_eq!(bearer_token(&parts).as_deref(), Some("abc.def.ghi"));
}

#[test]
fn bearer_scheme_is_case_insensitive() {
    let parts = parts_with(&[("authorization", "bearer tok")]);
    assert_eq!(bearer_token(&parts).as_deref(), Some("tok"));
}

#[test]
fn bearer_token_ignores_other_schemes_and_blanks() {
    assert_eq!(bearer_token(&parts_with(&[("authorization", "Basic dXNlcjpwYXNz")])), None);
    assert_eq!(bearer_token(&parts_with(&[("authorization", "Bearer   ")])), None);
    assert_eq!(bearer_token(&parts_with(&[("authorization", "Bearer")])), None);
    assert_eq!(bearer_token(&parts_with(&[])), None);
}

// =============================================================================
// cookie
// =============================================================================

#[test]
fn cookie_is_http_only_lax_and_scoped_to_root() {
    let c = cookie(ACCESS_TOKEN_COOKIE, "tok".into(), true, Duration::hours(1));
    assert_eq!(c.path(), Some("/"));
    assert_eq!(c.http_only(), Some(true));
    assert_eq!(c.secure(), Some(true));
    assert_eq!(c.same_site(), Some(SameSite::Lax));
    assert_eq!(c.max_age(), Some(Duration::hours(1)));
}

// =============================================================================
// EXTRACTORS
// =============================================================================

#[tokio::test]
async fn member_auth_prefers_bearer_over_cookie() {
    let state = test_app_state();
    let bearer_user = Uuid::new_v4();
    let cookie_user = Uuid::new_v4();
    let bearer = state.tokens.issue_member(bearer_user, "a@example.com", "A").unwrap();
    let from_cookie = state.tokens.issue_member(cookie_user, "b@example.com", "B").unwrap();

    let mut parts = parts_with(&[]);
    parts
        .headers
        .insert("authorization", HeaderValue::from_str(&format!("Bearer {bearer}")).unwrap());
    parts
        .headers
        .insert("cookie", HeaderValue::from_str(&format!("access_token={from_cookie}")).unwrap());

    let auth = MemberAuth::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth.user_id, bearer_user);
    assert_eq!(auth.claims.email, "a@example.com");
}

#[tokio::test]
async fn member_auth_falls_back_to_cookie() {
    let state = test_app_state();
    let user = Uuid::new_v4();
    let token = state.tokens.issue_member(user, "a@example.com", "A").unwrap();
    let mut parts = parts_with(&[]);
    parts
        .headers
        .insert("cookie", HeaderValue::from_str(&format!("access_token={token}")).unwrap());

    let auth = MemberAuth::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth.user_id, user);
}

#[tokio::test]
async fn admin_auth_requires_header() {
    let state = test_app_state();
    let mut parts = parts_with(&[]);
    let err = AdminAuth::from_request_parts(&mut parts, &state).await.err().unwrap();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    assert_eq!(err.detail, "Admin authentication required");
}

#[tokio::test]
async fn admin_auth_accepts_admin_token() {
    let state = test_app_state();
    let token = state.tokens.issue_admin().unwrap();
    let mut parts = parts_with(&[]);
    parts
        .headers
        .insert(ADMIN_TOKEN_HEADER, HeaderValue::from_str(&token).unwrap());

    let auth = AdminAuth::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth.claims.role, "admin");
}
