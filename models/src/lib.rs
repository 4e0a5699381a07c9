//! Shared data model for the clubhouse server, client, and CLI.
//!
//! This crate owns the JSON representation exchanged over the REST API.
//! Field names follow the public wire format (camelCase for events and
//! teams) while accepting snake_case aliases so admin tooling and older
//! payloads deserialize without translation.

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;

pub mod checkin;
pub mod event;
pub mod filter;
pub mod team;
pub mod user;

pub use checkin::{Checkin, CheckinCreate};
pub use event::{Event, EventInput};
pub use filter::{ALL, EventFilter, TeamFilter};
pub use team::{Team, TeamInput};
pub use user::User;

/// Validation failures raised while turning client input into records.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    /// A required field was empty after trimming.
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    /// A check-in link is not an absolute http(s) URL.
    #[error("invalid link: {0}")]
    InvalidLink(String),
    /// A check-in carried no usable links.
    #[error("at least one link is required")]
    NoLinks,
}

/// Turn a free-form title into a URL-safe identifier.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single `-`, strips leading/trailing dashes, and caps the result at 80
/// characters.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug.truncate(80);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
