//! Team progress check-ins.

#[cfg(test)]
#[path = "checkin_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::ModelError;

/// Body of `POST /teams/{id}/checkins`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinCreate {
    pub links: Vec<String>,
}

impl CheckinCreate {
    /// Trimmed, non-empty links.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidLink`] for anything that is not an
    /// `http://` or `https://` URL with a host, and [`ModelError::NoLinks`]
    /// when nothing remains after trimming.
    pub fn normalized_links(&self) -> Result<Vec<String>, ModelError> {
        let mut links = Vec::with_capacity(self.links.len());
        for raw in &self.links {
            let link = raw.trim();
            if link.is_empty() {
                continue;
            }
            if !is_web_url(link) {
                return Err(ModelError::InvalidLink(link.to_owned()));
            }
            links.push(link.to_owned());
        }
        if links.is_empty() {
            return Err(ModelError::NoLinks);
        }
        Ok(links)
    }
}

fn is_web_url(link: &str) -> bool {
    Url::parse(link)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()))
}

/// A submitted check-in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkin {
    pub id: Uuid,
    pub team_id: Uuid,
    pub submitted_at: String,
    pub links: Vec<String>,
    pub created_at: String,
}
