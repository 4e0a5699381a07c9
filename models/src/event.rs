//! Competitive events offered by the club.

#[cfg(test)]
#[path = "event_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};

use crate::{ModelError, slugify};

/// A competition event listed on the public site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Slug identifier, e.g. `"video-game-design"`.
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, alias = "full_theme_url", skip_serializing_if = "Option::is_none")]
    pub full_theme_url: Option<String>,
    pub description: String,
    pub category: String,
    /// Free-form size range, e.g. `"1-3 members"`.
    #[serde(alias = "team_size")]
    pub team_size: String,
    /// Submission formats, e.g. `["onsite testing", "poster"]`.
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(alias = "rubric_url")]
    pub rubric_url: String,
}

/// Create/update payload for an event. The id is optional on create and is
/// derived from the title when absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, alias = "full_theme_url", skip_serializing_if = "Option::is_none")]
    pub full_theme_url: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "team_size")]
    pub team_size: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, alias = "rubric_url")]
    pub rubric_url: String,
}

impl EventInput {
    /// Build a new event, slugging the title when no id was supplied.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingField`] when the title is blank or the
    /// resulting id is empty.
    pub fn into_event(self) -> Result<Event, ModelError> {
        let id = match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => slugify(&self.title),
        };
        self.into_event_with_id(id)
    }

    /// Build an event for an existing id, ignoring any id in the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingField`] when the title or id is blank.
    pub fn into_event_with_id(self, id: String) -> Result<Event, ModelError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(ModelError::MissingField("title"));
        }
        if id.is_empty() {
            return Err(ModelError::MissingField("id"));
        }
        let rubric_url = if self.rubric_url.trim().is_empty() { "#".to_owned() } else { self.rubric_url };
        Ok(Event {
            id,
            title,
            theme: self.theme.filter(|t| !t.trim().is_empty()),
            full_theme_url: self.full_theme_url.filter(|u| !u.trim().is_empty()),
            description: self.description,
            category: self.category,
            team_size: self.team_size,
            types: self.types,
            rubric_url,
        })
    }
}

impl From<Event> for EventInput {
    fn from(event: Event) -> Self {
        Self {
            id: Some(event.id),
            title: event.title,
            theme: event.theme,
            full_theme_url: event.full_theme_url,
            description: event.description,
            category: event.category,
            team_size: event.team_size,
            types: event.types,
            rubric_url: event.rubric_url,
        }
    }
}
