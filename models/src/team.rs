//! Competition teams.

#[cfg(test)]
#[path = "team_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Event, User};

/// A team entered in an event, hydrated with its event, captain, and members.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    pub event: Event,
    #[serde(alias = "team_number")]
    pub team_number: String,
    pub conference: String,
    #[serde(default)]
    pub members: Vec<User>,
    pub captain: User,
    #[serde(default, alias = "check_in_date")]
    pub check_in_date: Option<String>,
}

impl Team {
    /// Whether the user captains or belongs to this team.
    #[must_use]
    pub fn includes(&self, user_id: Uuid) -> bool {
        self.captain.id == user_id || self.members.iter().any(|m| m.id == user_id)
    }
}

/// Create/update payload for a team, referencing rows by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInput {
    #[serde(alias = "eventId")]
    pub event_id: String,
    #[serde(alias = "teamNumber")]
    pub team_number: String,
    pub conference: String,
    #[serde(alias = "captainId")]
    pub captain_id: Uuid,
    #[serde(default, alias = "checkInDate")]
    pub check_in_date: Option<String>,
    #[serde(default, alias = "memberIds")]
    pub member_ids: Vec<Uuid>,
}

impl TeamInput {
    /// Member ids with duplicates and the captain removed, in input order.
    #[must_use]
    pub fn distinct_members(&self) -> Vec<Uuid> {
        let mut out: Vec<Uuid> = Vec::with_capacity(self.member_ids.len());
        for id in &self.member_ids {
            if *id != self.captain_id && !out.contains(id) {
                out.push(*id);
            }
        }
        out
    }
}
