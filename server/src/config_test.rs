use super::*;

fn base() -> HashMap<&'static str, &'static str> {
    HashMap::from([("DATABASE_URL", "postgres://localhost/clubhouse")])
}

// =============================================================================
// parse_bool
// =============================================================================

#[test]
fn parse_bool_true_variants() {
    for val in ["1", "true", "yes", "on", "TRUE", "  On  "] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
}

#[test]
fn parse_bool_false_variants() {
    for val in ["0", "false", "no", "off", "False"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
}

#[test]
fn parse_bool_invalid_returns_none() {
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(parse_bool(""), None);
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn defaults_apply_when_only_database_url_set() {
    let config = Config::from_map(&base()).unwrap();
    assert_eq!(config.port, 8000);
    assert_eq!(config.jwt_expiration_hours, 24);
    assert_eq!(config.admin_token_minutes, 120);
    assert_eq!(config.frontend_url.as_str(), "http://localhost:3000/");
    assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_owned(), "http://127.0.0.1:3000".to_owned()]);
    assert!(!config.cookie_secure);
    assert!(config.google.is_none());
    assert!(config.admin_password.is_none());
    assert_eq!(config.jwt_secret.len(), 64);
}

#[test]
fn missing_database_url_is_an_error() {
    let err = Config::from_map(&HashMap::new()).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
}

#[test]
fn blank_values_count_as_unset() {
    let mut map = base();
    map.insert("PORT", "  ");
    map.insert("ADMIN_PASSWORD", "");
    let config = Config::from_map(&map).unwrap();
    assert_eq!(config.port, 8000);
    assert!(config.admin_password.is_none());
}

#[test]
fn invalid_port_is_reported_with_key() {
    let mut map = base();
    map.insert("PORT", "eighty");
    let err = Config::from_map(&map).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "eighty".into() });
}

#[test]
fn cors_origins_split_and_trimmed() {
    let mut map = base();
    map.insert("CORS_ORIGINS", "https://club.example.org/, http://localhost:5173 ,");
    let config = Config::from_map(&map).unwrap();
    assert_eq!(
        config.cors_origins,
        vec!["https://club.example.org".to_owned(), "http://localhost:5173".to_owned()]
    );
}

#[test]
fn https_frontend_implies_secure_cookies() {
    let mut map = base();
    map.insert("FRONTEND_URL", "https://club.example.org");
    assert!(Config::from_map(&map).unwrap().cookie_secure);

    map.insert("COOKIE_SECURE", "false");
    assert!(!Config::from_map(&map).unwrap().cookie_secure);
}

#[test]
fn google_requires_id_and_secret() {
    let mut map = base();
    map.insert("GOOGLE_CLIENT_ID", "cid");
    assert!(Config::from_map(&map).unwrap().google.is_none());

    map.insert("GOOGLE_CLIENT_SECRET", "secret");
    let google = Config::from_map(&map).unwrap().google.unwrap();
    assert_eq!(google.client_id, "cid");
    assert_eq!(google.redirect_uri, "http://localhost:8000/auth/callback");
}

#[test]
fn authorize_url_encodes_parameters() {
    let google = GoogleConfig::new("cid".into(), "secret".into(), "http://localhost:8000/auth/callback".into());
    let url = google.authorize_url("abc123").unwrap();
    let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(url.host_str(), Some("accounts.google.com"));
    assert_eq!(pairs["client_id"], "cid");
    assert_eq!(pairs["redirect_uri"], "http://localhost:8000/auth/callback");
    assert_eq!(pairs["scope"], "openid email profile");
    assert_eq!(pairs["response_type"], "code");
    assert_eq!(pairs["state"], "abc123");
}

#[test]
fn auth_success_url_puts_token_in_fragment() {
    let mut map = base();
    map.insert("FRONTEND_URL", "https://club.example.org/portal?x=1");
    let config = Config::from_map(&map).unwrap();
    assert_eq!(
        config.auth_success_url("a.b.c"),
        "https://club.example.org/auth/success#access_token=a.b.c"
    );
}
