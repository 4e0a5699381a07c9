use super::*;

#[test]
fn normalize_email_trims_and_lowercases() {
    assert_eq!(normalize_email("  Ada@Example.COM ").as_deref(), Some("ada@example.com"));
}

#[test]
fn normalize_email_rejects_malformed() {
    for raw in ["", "ada", "@example.com", "ada@", "a@b@c", "ada lovelace@example.com"] {
        assert_eq!(normalize_email(raw), None, "{raw:?}");
    }
}

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::state::test_helpers::integration_pool;

    fn profile(id: &str, email: &str) -> GoogleUser {
        GoogleUser { id: id.into(), email: email.into(), name: Some("Ada".into()), picture: None }
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn whitelist_add_list_remove() {
        let pool = integration_pool().await;

        assert_eq!(add_whitelist(&pool, " Ada@Example.com").await.unwrap(), "ada@example.com");
        add_whitelist(&pool, "ada@example.com").await.unwrap();
        assert_eq!(list_whitelist(&pool).await.unwrap(), vec!["ada@example.com".to_owned()]);
        assert!(is_whitelisted(&pool, "ADA@example.com").await.unwrap());

        remove_whitelist(&pool, "ada@example.com").await.unwrap();
        assert!(!is_whitelisted(&pool, "ada@example.com").await.unwrap());
        assert!(matches!(remove_whitelist(&pool, "ada@example.com").await, Err(ServiceError::NotFound(_))));
        assert!(matches!(add_whitelist(&pool, "nope").await, Err(ServiceError::BadRequest(_))));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn upsert_keys_on_provider_id() {
        let pool = integration_pool().await;

        let first = upsert_google_user(&pool, &profile("g-1", "ada@example.com")).await.unwrap();
        let renamed = upsert_google_user(&pool, &profile("g-1", "lovelace@example.com")).await.unwrap();
        assert_eq!(first.id, renamed.id);
        assert_eq!(renamed.email, "lovelace@example.com");

        let fetched = get_user(&pool, first.id).await.unwrap();
        assert_eq!(fetched.google_id.as_deref(), Some("g-1"));
        assert!(fetched.created_at.unwrap().ends_with('Z'));
        assert_eq!(list_users(&pool).await.unwrap().len(), 1);
        assert!(matches!(get_user(&pool, Uuid::new_v4()).await, Err(ServiceError::NotFound("user"))));
    }
}
