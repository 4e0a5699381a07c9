//! Club member records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A club member as stored by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Lower-cased login email.
    pub email: String,
    /// Display name from the identity provider.
    pub name: String,
    /// Avatar image URL, if the provider returned one.
    #[serde(default)]
    pub picture: Option<String>,
    /// Provider subject id used to match returning users.
    #[serde(default)]
    pub google_id: Option<String>,
    /// RFC 3339 creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// RFC 3339 last-update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
}
