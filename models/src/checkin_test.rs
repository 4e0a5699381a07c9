use super::*;

fn create(links: &[&str]) -> CheckinCreate {
    CheckinCreate { links: links.iter().map(|s| (*s).to_owned()).collect() }
}

#[test]
fn keeps_http_and_https_links() {
    let links = create(&["https://github.com/club/repo", " http://demo.example.com "]).normalized_links().unwrap();
    assert_eq!(links, vec!["https://github.com/club/repo", "http://demo.example.com"]);
}

#[test]
fn skips_blank_entries() {
    let links = create(&["", "  ", "https://x.dev"]).normalized_links().unwrap();
    assert_eq!(links, vec!["https://x.dev"]);
}

#[test]
fn rejects_other_schemes() {
    let err = create(&["ftp://files.example.com"]).normalized_links().unwrap_err();
    assert_eq!(err, ModelError::InvalidLink("ftp://files.example.com".into()));
}

#[test]
fn rejects_missing_host() {
    for link in ["https://", "https://?q=1", "http://#frag", "https://:443", "http://@"] {
        assert_eq!(
            create(&[link]).normalized_links(),
            Err(ModelError::InvalidLink(link.into())),
            "{link} should be rejected"
        );
    }
}

#[test]
fn rejects_relative_and_opaque_links() {
    assert!(create(&["/teams/1"]).normalized_links().is_err());
    assert!(create(&["mailto:captain@example.com"]).normalized_links().is_err());
}

#[test]
fn keeps_links_with_port_path_and_query() {
    let link = "https://demo.example.com:8443/app?tab=1#top";
    assert_eq!(create(&[link]).normalized_links().unwrap(), vec![link]);
}

#[test]
fn rejects_embedded_whitespace() {
    assert!(create(&["https://a b.com"]).normalized_links().is_err());
}

#[test]
fn empty_list_is_rejected() {
    assert_eq!(create(&[]).normalized_links(), Err(ModelError::NoLinks));
    assert_eq!(create(&["   "]).normalized_links(), Err(ModelError::NoLinks));
}

#[test]
fn checkin_deserializes_backend_shape() {
    let json = r#"{
        "id": "6f1f8a4e-6a4b-4b89-9d59-7c2f0f3c2c11",
        "team_id": "0b8f3d7a-5b1c-4e39-8b0e-3d7f9a1c2e44",
        "submitted_at": "2025-03-01T12:00:00Z",
        "links": ["https://x.dev"],
        "created_at": "2025-03-01T12:00:00Z"
    }"#;
    let checkin: Checkin = serde_json::from_str(json).unwrap();
    assert_eq!(checkin.links, vec!["https://x.dev"]);
    assert_eq!(checkin.submitted_at, "2025-03-01T12:00:00Z");
}
