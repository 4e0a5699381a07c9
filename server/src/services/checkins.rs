//! Team check-ins: a timestamped list of project links.

#[cfg(test)]
#[path = "checkins_test.rs"]
mod tests;

use models::{Checkin, CheckinCreate};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::db::iso_timestamp;
use crate::services::{ServiceError, teams};

fn checkin_columns() -> String {
    format!(
        "id, team_id, {} AS submitted_at, links, {} AS created_at",
        iso_timestamp("submitted_at"),
        iso_timestamp("created_at"),
    )
}

fn checkin_from_row(row: &PgRow) -> Checkin {
    Checkin {
        id: row.get("id"),
        team_id: row.get("team_id"),
        submitted_at: row.get("submitted_at"),
        links: row.get("links"),
        created_at: row.get("created_at"),
    }
}

/// A team's check-ins, newest first.
///
/// # Errors
///
/// Returns [`ServiceError::Database`] on query failure.
pub async fn list_for_team(pool: &PgPool, team_id: Uuid) -> Result<Vec<Checkin>, ServiceError> {
    let sql = format!(
        "SELECT {} FROM checkins WHERE team_id = $1 ORDER BY submitted_at DESC",
        checkin_columns()
    );
    let rows = sqlx::query(&sql).bind(team_id).fetch_all(pool).await?;
    Ok(rows.iter().map(checkin_from_row).collect())
}

/// Record a check-in on behalf of `user_id`, who must be on the team.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] for an unknown team,
/// [`ServiceError::Forbidden`] for outsiders, and [`ServiceError::Invalid`]
/// for unusable links.
pub async fn create_checkin(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
    input: &CheckinCreate,
) -> Result<Checkin, ServiceError> {
    if !teams::is_on_team(pool, team_id, user_id).await? {
        return Err(ServiceError::Forbidden("Only team members can check in".to_owned()));
    }
    let links = input.normalized_links()?;
    let sql = format!("INSERT INTO checkins (team_id, links) VALUES ($1, $2) RETURNING {}", checkin_columns());
    let row = sqlx::query(&sql)
        .bind(team_id)
        .bind(&links)
        .fetch_one(pool)
        .await?;
    Ok(checkin_from_row(&row))
}

/// Look up one check-in.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] if no row matches.
pub async fn get_checkin(pool: &PgPool, id: Uuid) -> Result<Checkin, ServiceError> {
    let sql = format!("SELECT {} FROM checkins WHERE id = $1", checkin_columns());
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("checkin"))?;
    Ok(checkin_from_row(&row))
}

/// Delete a check-in.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] if no row matches.
pub async fn delete_checkin(pool: &PgPool, id: Uuid) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM checkins WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("checkin"));
    }
    Ok(())
}
