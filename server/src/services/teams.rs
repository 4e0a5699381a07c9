//! Team CRUD with event, captain, and member hydration.
//!
//! DESIGN
//! ======
//! Team rows only store foreign keys. Reads load the rows first, then fetch
//! every referenced event and user in one `= ANY($1)` query each and stitch
//! the [`Team`] values together in memory. Writes run in a transaction so a
//! team never exists with a half-written member list.

#[cfg(test)]
#[path = "teams_test.rs"]
mod tests;

use std::collections::HashMap;

use models::{ModelError, Team, TeamInput};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::warn;
use uuid::Uuid;

use crate::services::{ServiceError, events, users};

const TEAM_COLUMNS: &str = "id, event_id, team_number, conference, captain_id, check_in_date";

struct TeamRow {
    id: Uuid,
    event_id: String,
    team_number: String,
    conference: String,
    captain_id: Uuid,
    check_in_date: Option<String>,
}

fn validate(input: &TeamInput) -> Result<(), ModelError> {
    if input.event_id.trim().is_empty() {
        return Err(ModelError::MissingField("event_id"));
    }
    if input.team_number.trim().is_empty() {
        return Err(ModelError::MissingField("team_number"));
    }
    if input.conference.trim().is_empty() {
        return Err(ModelError::MissingField("conference"));
    }
    Ok(())
}

async fn fetch_rows(pool: &PgPool, filter: &str, bind: Option<Uuid>) -> Result<Vec<TeamRow>, ServiceError> {
    let sql = format!("SELECT {TEAM_COLUMNS} FROM teams {filter} ORDER BY created_at, team_number");
    let mut query = sqlx::query(&sql);
    if let Some(id) = bind {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows
        .iter()
        .map(|row| TeamRow {
            id: row.get("id"),
            event_id: row.get("event_id"),
            team_number: row.get("team_number"),
            conference: row.get("conference"),
            captain_id: row.get("captain_id"),
            check_in_date: row.get("check_in_date"),
        })
        .collect())
}

async fn hydrate(pool: &PgPool, rows: Vec<TeamRow>) -> Result<Vec<Team>, ServiceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let team_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut event_ids: Vec<String> = rows.iter().map(|r| r.event_id.clone()).collect();
    event_ids.sort();
    event_ids.dedup();

    let member_rows = sqlx::query("SELECT team_id, user_id FROM team_members WHERE team_id = ANY($1)")
        .bind(&team_ids)
        .fetch_all(pool)
        .await?;
    let mut members_by_team: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for row in &member_rows {
        members_by_team
            .entry(row.get("team_id"))
            .or_default()
            .push(row.get("user_id"));
    }

    let mut user_ids: Vec<Uuid> = rows.iter().map(|r| r.captain_id).collect();
    user_ids.extend(members_by_team.values().flatten().copied());
    user_ids.sort();
    user_ids.dedup();

    let events: HashMap<String, _> = events::events_by_ids(pool, &event_ids)
        .await?
        .into_iter()
        .map(|e| (e.id.clone(), e))
        .collect();
    let people: HashMap<Uuid, _> = users::users_by_ids(pool, &user_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut teams = Vec::with_capacity(rows.len());
    for row in rows {
        let (Some(event), Some(captain)) = (events.get(&row.event_id), people.get(&row.captain_id)) else {
            warn!(team_id = %row.id, "team references a missing event or captain; skipped");
            continue;
        };
        let mut members: Vec<_> = members_by_team
            .get(&row.id)
            .into_iter()
            .flatten()
            .filter_map(|id| people.get(id).cloned())
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        teams.push(Team {
            id: row.id,
            event: event.clone(),
            team_number: row.team_number,
            conference: row.conference,
            members,
            captain: captain.clone(),
            check_in_date: row.check_in_date,
        });
    }
    Ok(teams)
}

/// All teams.
///
/// # Errors
///
/// Returns [`ServiceError::Database`] on query failure.
pub async fn list_teams(pool: &PgPool) -> Result<Vec<Team>, ServiceError> {
    let rows = fetch_rows(pool, "", None).await?;
    hydrate(pool, rows).await
}

/// Teams the user captains or belongs to.
///
/// # Errors
///
/// Returns [`ServiceError::Database`] on query failure.
pub async fn teams_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Team>, ServiceError> {
    let rows = fetch_rows(
        pool,
        "WHERE captain_id = $1 OR id IN (SELECT team_id FROM team_members WHERE user_id = $1)",
        Some(user_id),
    )
    .await?;
    hydrate(pool, rows).await
}

/// Look up one team.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] if no row matches.
pub async fn get_team(pool: &PgPool, id: Uuid) -> Result<Team, ServiceError> {
    let rows = fetch_rows(pool, "WHERE id = $1", Some(id)).await?;
    hydrate(pool, rows)
        .await?
        .pop()
        .ok_or(ServiceError::NotFound("team"))
}

/// Whether the user is the team's captain or one of its members.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] if the team does not exist.
pub async fn is_on_team(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<bool, ServiceError> {
    let row = sqlx::query(
        r"SELECT captain_id = $2
              OR EXISTS (SELECT 1 FROM team_members WHERE team_id = $1 AND user_id = $2) AS on_team
          FROM teams WHERE id = $1",
    )
    .bind(team_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ServiceError::NotFound("team"))?;
    Ok(row.get("on_team"))
}

async fn write_members(tx: &mut Transaction<'_, Postgres>, team_id: Uuid, members: &[Uuid]) -> Result<(), ServiceError> {
    sqlx::query("DELETE FROM team_members WHERE team_id = $1")
        .bind(team_id)
        .execute(&mut **tx)
        .await?;
    if members.is_empty() {
        return Ok(());
    }
    sqlx::query("INSERT INTO team_members (team_id, user_id) SELECT $1, UNNEST($2::uuid[])")
        .bind(team_id)
        .bind(members)
        .execute(&mut **tx)
        .await
        .map_err(|e| ServiceError::from_write(e, "team member"))?;
    Ok(())
}

/// Create a team with its members. The captain is never stored as a member.
///
/// # Errors
///
/// Returns [`ServiceError::Invalid`] for blank fields and
/// [`ServiceError::Conflict`] when the event or a user does not exist.
pub async fn create_team(pool: &PgPool, input: &TeamInput) -> Result<Team, ServiceError> {
    validate(input)?;
    let mut tx = pool.begin().await?;
    let row = sqlx::query(
        r"INSERT INTO teams (event_id, team_number, conference, captain_id, check_in_date)
          VALUES ($1, $2, $3, $4, $5)
          RETURNING id",
    )
    .bind(input.event_id.trim())
    .bind(input.team_number.trim())
    .bind(input.conference.trim())
    .bind(input.captain_id)
    .bind(&input.check_in_date)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| ServiceError::from_write(e, "team"))?;
    let id: Uuid = row.get("id");
    write_members(&mut tx, id, &input.distinct_members()).await?;
    tx.commit().await?;
    get_team(pool, id).await
}

/// Replace a team's fields and member list.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] if the team does not exist.
pub async fn update_team(pool: &PgPool, id: Uuid, input: &TeamInput) -> Result<Team, ServiceError> {
    validate(input)?;
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r"UPDATE teams
          SET event_id = $2, team_number = $3, conference = $4, captain_id = $5, check_in_date = $6
          WHERE id = $1",
    )
    .bind(id)
    .bind(input.event_id.trim())
    .bind(input.team_number.trim())
    .bind(input.conference.trim())
    .bind(input.captain_id)
    .bind(&input.check_in_date)
    .execute(&mut *tx)
    .await
    .map_err(|e| ServiceError::from_write(e, "team"))?;
    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("team"));
    }
    write_members(&mut tx, id, &input.distinct_members()).await?;
    tx.commit().await?;
    get_team(pool, id).await
}

/// Delete a team and, by cascade, its members and check-ins.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] if the team does not exist.
pub async fn delete_team(pool: &PgPool, id: Uuid) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM teams WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("team"));
    }
    Ok(())
}
