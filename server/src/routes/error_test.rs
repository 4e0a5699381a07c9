use super::*;
use models::ModelError;

async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn service_errors_map_to_statuses() {
    assert_eq!(service_error_to_status(&ServiceError::NotFound("team")), StatusCode::NOT_FOUND);
    assert_eq!(service_error_to_status(&ServiceError::Forbidden("no".into())), StatusCode::FORBIDDEN);
    assert_eq!(service_error_to_status(&ServiceError::Conflict("dup".into())), StatusCode::CONFLICT);
    assert_eq!(service_error_to_status(&ServiceError::BadRequest("bad".into())), StatusCode::BAD_REQUEST);
    assert_eq!(service_error_to_status(&ServiceError::Invalid(ModelError::NoLinks)), StatusCode::BAD_REQUEST);
    assert_eq!(
        service_error_to_status(&ServiceError::Database(sqlx::Error::RowNotFound)),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn not_found_renders_detail_body() {
    let resp = ApiError::from(ServiceError::NotFound("user")).into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await, serde_json::json!({ "detail": "User not found" }));
}

#[tokio::test]
async fn database_errors_hide_internals() {
    let resp = ApiError::from(ServiceError::Database(sqlx::Error::PoolTimedOut)).into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await["detail"], "Internal server error");
}

#[test]
fn auth_errors_map_to_statuses() {
    assert_eq!(ApiError::from(AuthError::NotWhitelisted("a@b.c".into())).status, StatusCode::FORBIDDEN);
    assert_eq!(ApiError::from(AuthError::GoogleApi("boom".into())).status, StatusCode::BAD_GATEWAY);
    assert_eq!(ApiError::from(AuthError::Token(TokenError::Invalid)).status, StatusCode::UNAUTHORIZED);
}

#[test]
fn capitalize_first_letter() {
    assert_eq!(capitalize("checkin"), "Checkin");
    assert_eq!(capitalize(""), "");
}
