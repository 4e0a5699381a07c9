#[cfg(feature = "live-db-tests")]
mod live {
    use super::super::*;
    use crate::services::auth::GoogleUser;
    use crate::services::{events, users};
    use crate::state::test_helpers::integration_pool;
    use models::{EventInput, ModelError, TeamInput};

    async fn seed_team(pool: &PgPool) -> (Uuid, Uuid, Uuid) {
        let event = events::create_event(pool, EventInput { title: "Robotics".into(), ..EventInput::default() })
            .await
            .unwrap();
        let captain = users::upsert_google_user(
            pool,
            &GoogleUser { id: "cap".into(), email: "cap@example.com".into(), name: None, picture: None },
        )
        .await
        .unwrap();
        let outsider = users::upsert_google_user(
            pool,
            &GoogleUser { id: "out".into(), email: "out@example.com".into(), name: None, picture: None },
        )
        .await
        .unwrap();
        let team = teams::create_team(
            pool,
            &TeamInput {
                event_id: event.id,
                team_number: "1".into(),
                conference: "North".into(),
                captain_id: captain.id,
                check_in_date: None,
                member_ids: Vec::new(),
            },
        )
        .await
        .unwrap();
        (team.id, captain.id, outsider.id)
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn captain_checks_in_and_outsider_is_forbidden() {
        let pool = integration_pool().await;
        let (team_id, captain, outsider) = seed_team(&pool).await;
        let body = CheckinCreate { links: vec![" https://example.com/demo ".into(), String::new()] };

        let checkin = create_checkin(&pool, team_id, captain, &body).await.unwrap();
        assert_eq!(checkin.links, vec!["https://example.com/demo".to_owned()]);
        assert!(checkin.submitted_at.ends_with('Z'));
        assert_eq!(list_for_team(&pool, team_id).await.unwrap(), vec![checkin.clone()]);
        assert_eq!(get_checkin(&pool, checkin.id).await.unwrap(), checkin);

        assert!(matches!(create_checkin(&pool, team_id, outsider, &body).await, Err(ServiceError::Forbidden(_))));
        let empty = CheckinCreate::default();
        assert!(matches!(
            create_checkin(&pool, team_id, captain, &empty).await,
            Err(ServiceError::Invalid(ModelError::NoLinks))
        ));
        assert!(matches!(
            create_checkin(&pool, Uuid::new_v4(), captain, &body).await,
            Err(ServiceError::NotFound("team"))
        ));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn delete_checkin_then_missing() {
        let pool = integration_pool().await;
        let (team_id, captain, _) = seed_team(&pool).await;
        let body = CheckinCreate { links: vec!["https://example.com".into()] };
        let checkin = create_checkin(&pool, team_id, captain, &body).await.unwrap();

        delete_checkin(&pool, checkin.id).await.unwrap();
        assert!(matches!(delete_checkin(&pool, checkin.id).await, Err(ServiceError::NotFound("checkin"))));
        assert!(list_for_team(&pool, team_id).await.unwrap().is_empty());
    }
}
