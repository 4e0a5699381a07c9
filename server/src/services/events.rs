//! Event catalogue CRUD.

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use models::{Event, EventInput};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::services::ServiceError;

const EVENT_COLUMNS: &str = "id, title, theme, full_theme_url, description, category, team_size, types, rubric_url";

pub(crate) fn event_from_row(row: &PgRow) -> Event {
    Event {
        id: row.get("id"),
        title: row.get("title"),
        theme: row.get("theme"),
        full_theme_url: row.get("full_theme_url"),
        description: row.get("description"),
        category: row.get("category"),
        team_size: row.get("team_size"),
        types: row.get("types"),
        rubric_url: row.get("rubric_url"),
    }
}

/// All events, newest id first.
///
/// # Errors
///
/// Returns [`ServiceError::Database`] on query failure.
pub async fn list_events(pool: &PgPool) -> Result<Vec<Event>, ServiceError> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY id DESC");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(event_from_row).collect())
}

/// Look up one event.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] if no row matches.
pub async fn get_event(pool: &PgPool, id: &str) -> Result<Event, ServiceError> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("event"))?;
    Ok(event_from_row(&row))
}

/// Events by id, in no particular order.
pub(crate) async fn events_by_ids(pool: &PgPool, ids: &[String]) -> Result<Vec<Event>, ServiceError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ANY($1)");
    let rows = sqlx::query(&sql).bind(ids).fetch_all(pool).await?;
    Ok(rows.iter().map(event_from_row).collect())
}

/// Create an event. A blank id is derived from the title.
///
/// # Errors
///
/// Returns [`ServiceError::Invalid`] for a blank title and
/// [`ServiceError::Conflict`] if the id is taken.
pub async fn create_event(pool: &PgPool, input: EventInput) -> Result<Event, ServiceError> {
    let event = input.into_event()?;
    let sql = format!(
        r"INSERT INTO events ({EVENT_COLUMNS})
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
          RETURNING {EVENT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(&event.id)
        .bind(&event.title)
        .bind(&event.theme)
        .bind(&event.full_theme_url)
        .bind(&event.description)
        .bind(&event.category)
        .bind(&event.team_size)
        .bind(&event.types)
        .bind(&event.rubric_url)
        .fetch_one(pool)
        .await
        .map_err(|e| ServiceError::from_write(e, "event"))?;
    Ok(event_from_row(&row))
}

/// Replace every field of an event. The path id wins over any id in the body.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] if the event does not exist.
pub async fn update_event(pool: &PgPool, id: &str, input: EventInput) -> Result<Event, ServiceError> {
    let event = input.into_event_with_id(id.to_owned())?;
    let sql = format!(
        r"UPDATE events
          SET title = $2, theme = $3, full_theme_url = $4, description = $5,
              category = $6, team_size = $7, types = $8, rubric_url = $9
          WHERE id = $1
          RETURNING {EVENT_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(&event.id)
        .bind(&event.title)
        .bind(&event.theme)
        .bind(&event.full_theme_url)
        .bind(&event.description)
        .bind(&event.category)
        .bind(&event.team_size)
        .bind(&event.types)
        .bind(&event.rubric_url)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("event"))?;
    Ok(event_from_row(&row))
}

/// Delete an event and, by cascade, its teams and check-ins.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] if the event does not exist.
pub async fn delete_event(pool: &PgPool, id: &str) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("event"));
    }
    Ok(())
}
