//! Client-side search and category filtering for event and team listings.
//!
//! Matching is case-insensitive substring search. The `"All"` sentinel (or an
//! absent selection) disables the category/event constraint.

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;

use crate::{Event, Team};

/// Selection value meaning "no constraint".
pub const ALL: &str = "All";

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn is_unconstrained(selection: Option<&str>) -> bool {
    selection.is_none_or(|s| s.is_empty() || s == ALL)
}

/// Category options for a listing: `"All"` followed by each distinct
/// non-empty category in first-seen order.
#[must_use]
pub fn categories(events: &[Event]) -> Vec<String> {
    let mut out = vec![ALL.to_owned()];
    for event in events {
        if !event.category.is_empty() && !out.iter().any(|c| c == &event.category) {
            out.push(event.category.clone());
        }
    }
    out
}

/// Search text plus optional category selection for events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub search: String,
    pub category: Option<String>,
}

impl EventFilter {
    #[must_use]
    pub fn new(search: impl Into<String>, category: Option<String>) -> Self {
        Self { search: search.into(), category }
    }

    /// Title, theme, or description contains the search text, and the
    /// category matches exactly.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || contains_folded(&event.title, &needle)
            || event.theme.as_deref().is_some_and(|t| contains_folded(t, &needle))
            || contains_folded(&event.description, &needle);
        let matches_category =
            is_unconstrained(self.category.as_deref()) || self.category.as_deref() == Some(event.category.as_str());
        matches_search && matches_category
    }

    #[must_use]
    pub fn apply<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Search text plus optional event selection for teams.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TeamFilter {
    pub search: String,
    /// Event id to restrict to.
    pub event_id: Option<String>,
}

impl TeamFilter {
    #[must_use]
    pub fn new(search: impl Into<String>, event_id: Option<String>) -> Self {
        Self { search: search.into(), event_id }
    }

    /// Team number, event title, captain name, or any member name contains
    /// the search text, and the event matches.
    #[must_use]
    pub fn matches(&self, team: &Team) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || contains_folded(&team.team_number, &needle)
            || contains_folded(&team.event.title, &needle)
            || contains_folded(&team.captain.name, &needle)
            || team.members.iter().any(|m| contains_folded(&m.name, &needle));
        let matches_event =
            is_unconstrained(self.event_id.as_deref()) || self.event_id.as_deref() == Some(team.event.id.as_str());
        matches_search && matches_event
    }

    #[must_use]
    pub fn apply<'a>(&self, teams: &'a [Team]) -> Vec<&'a Team> {
        teams.iter().filter(|t| self.matches(t)).collect()
    }
}
