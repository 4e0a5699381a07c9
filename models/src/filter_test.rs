use super::*;
use crate::User;
use uuid::Uuid;

fn event(id: &str, title: &str, theme: Option<&str>, category: &str) -> Event {
    Event {
        id: id.into(),
        title: title.into(),
        theme: theme.map(Into::into),
        full_theme_url: None,
        description: format!("{title} description"),
        category: category.into(),
        team_size: "1-3 members".into(),
        types: vec![],
        rubric_url: "#".into(),
    }
}

fn user(name: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", name.to_lowercase()),
        name: name.into(),
        picture: None,
        google_id: None,
        created_at: None,
        updated_at: None,
    }
}

fn team(number: &str, event: Event, captain: &str, members: &[&str]) -> Team {
    Team {
        id: Uuid::new_v4(),
        event,
        team_number: number.into(),
        conference: "State 2025".into(),
        members: members.iter().map(|m| user(m)).collect(),
        captain: user(captain),
        check_in_date: None,
    }
}

fn sample_events() -> Vec<Event> {
    vec![
        event("animatronics", "Animatronics", Some("Time Travelers' Museum"), "Engineering"),
        event("coding", "Coding", Some("Programming Challenge"), "Programming"),
        event("robotics", "Robotics", None, "Engineering"),
    ]
}

#[test]
fn categories_lists_all_then_distinct_in_order() {
    assert_eq!(categories(&sample_events()), vec!["All", "Engineering", "Programming"]);
}

#[test]
fn categories_of_empty_listing_is_just_all() {
    assert_eq!(categories(&[]), vec!["All"]);
}

#[test]
fn empty_filter_matches_everything() {
    let events = sample_events();
    assert_eq!(EventFilter::default().apply(&events).len(), 3);
}

#[test]
fn search_is_case_insensitive_over_title() {
    let events = sample_events();
    let hits = EventFilter::new("ROBO", None).apply(&events);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "robotics");
}

#[test]
fn search_covers_theme_and_description() {
    let events = sample_events();
    assert_eq!(EventFilter::new("museum", None).apply(&events)[0].id, "animatronics");
    assert_eq!(EventFilter::new("coding desc", None).apply(&events)[0].id, "coding");
}

#[test]
fn category_all_is_unconstrained() {
    let events = sample_events();
    assert_eq!(EventFilter::new("", Some(ALL.into())).apply(&events).len(), 3);
}

#[test]
fn category_and_search_combine() {
    let events = sample_events();
    let f = EventFilter::new("o", Some("Engineering".into()));
    let ids: Vec<_> = f.apply(&events).iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["animatronics", "robotics"]);
}

#[test]
fn unknown_category_matches_nothing() {
    let events = sample_events();
    assert!(EventFilter::new("", Some("Art".into())).apply(&events).is_empty());
}

#[test]
fn team_search_matches_member_names() {
    let events = sample_events();
    let teams = vec![
        team("2045-1", events[0].clone(), "Alex", &["Sarah", "Marcus"]),
        team("2045-2", events[1].clone(), "Jordan", &[]),
    ];
    let hits = TeamFilter::new("marcus", None).apply(&teams);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].team_number, "2045-1");
}

#[test]
fn team_search_matches_captain_event_and_number() {
    let events = sample_events();
    let teams = vec![team("2045-1", events[0].clone(), "Alex", &[]), team("9999", events[1].clone(), "Jordan", &[])];
    assert_eq!(TeamFilter::new("jordan", None).apply(&teams).len(), 1);
    assert_eq!(TeamFilter::new("animat", None).apply(&teams).len(), 1);
    assert_eq!(TeamFilter::new("2045", None).apply(&teams).len(), 1);
}

#[test]
fn team_event_selection_restricts_results() {
    let events = sample_events();
    let teams = vec![team("1", events[0].clone(), "Alex", &[]), team("2", events[1].clone(), "Jordan", &[])];
    let hits = TeamFilter::new("", Some("coding".into())).apply(&teams);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].team_number, "2");
    assert_eq!(TeamFilter::new("", Some(ALL.into())).apply(&teams).len(), 2);
}
