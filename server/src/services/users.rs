//! Users and the login whitelist.
//!
//! Emails are stored lowercased; every lookup lowercases its input first.

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;

use models::User;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::db::iso_timestamp;
use crate::services::ServiceError;
use crate::services::auth::GoogleUser;

/// Trim and lowercase an email address. Returns `None` for anything that
/// does not look like `local@domain`.
#[must_use]
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return None;
    }
    Some(email)
}

fn user_columns() -> String {
    format!(
        "id, email, name, picture, google_id, {} AS created_at, {} AS updated_at",
        iso_timestamp("created_at"),
        iso_timestamp("updated_at"),
    )
}

pub(crate) fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        picture: row.get("picture"),
        google_id: row.get("google_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Look up one user.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] if no row matches.
pub async fn get_user(pool: &PgPool, id: Uuid) -> Result<User, ServiceError> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", user_columns());
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("user"))?;
    Ok(user_from_row(&row))
}

/// All users, oldest first.
///
/// # Errors
///
/// Returns [`ServiceError::Database`] on query failure.
pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, ServiceError> {
    let sql = format!("SELECT {} FROM users ORDER BY created_at, email", user_columns());
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(user_from_row).collect())
}

/// Users by id, in no particular order. Unknown ids are skipped.
pub(crate) async fn users_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<User>, ServiceError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!("SELECT {} FROM users WHERE id = ANY($1)", user_columns());
    let rows = sqlx::query(&sql).bind(ids).fetch_all(pool).await?;
    Ok(rows.iter().map(user_from_row).collect())
}

/// Insert or refresh a user from a provider profile. Matches on the provider
/// id first and falls back to the email so pre-seeded rows get linked.
///
/// # Errors
///
/// Returns [`ServiceError::Database`] on query failure.
pub async fn upsert_google_user(pool: &PgPool, profile: &GoogleUser) -> Result<User, ServiceError> {
    let email = profile.email.trim().to_lowercase();
    let existing = sqlx::query("SELECT id FROM users WHERE google_id = $1")
        .bind(&profile.id)
        .fetch_optional(pool)
        .await?;
    if let Some(row) = existing {
        let id: Uuid = row.get("id");
        let update = format!(
            r"UPDATE users
              SET email = $2, name = $3, picture = $4, updated_at = now()
              WHERE id = $1
              RETURNING {}",
            user_columns()
        );
        let row = sqlx::query(&update)
            .bind(id)
            .bind(&email)
            .bind(profile.display_name())
            .bind(&profile.picture)
            .fetch_one(pool)
            .await?;
        return Ok(user_from_row(&row));
    }

    let sql = format!(
        r"INSERT INTO users (email, name, picture, google_id)
          VALUES ($1, $2, $3, $4)
          ON CONFLICT (email) DO UPDATE
              SET name = EXCLUDED.name,
                  picture = EXCLUDED.picture,
                  google_id = EXCLUDED.google_id,
                  updated_at = now()
          RETURNING {}",
        user_columns()
    );
    let row = sqlx::query(&sql)
        .bind(&email)
        .bind(profile.display_name())
        .bind(&profile.picture)
        .bind(&profile.id)
        .fetch_one(pool)
        .await?;
    Ok(user_from_row(&row))
}

/// Whether `email` may sign in.
///
/// # Errors
///
/// Returns [`ServiceError::Database`] on query failure.
pub async fn is_whitelisted(pool: &PgPool, email: &str) -> Result<bool, ServiceError> {
    let Some(email) = normalize_email(email) else {
        return Ok(false);
    };
    let row = sqlx::query("SELECT 1 AS hit FROM whitelist WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Whitelisted emails, alphabetical.
///
/// # Errors
///
/// Returns [`ServiceError::Database`] on query failure.
pub async fn list_whitelist(pool: &PgPool) -> Result<Vec<String>, ServiceError> {
    let rows = sqlx::query("SELECT email FROM whitelist ORDER BY email")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(|r| r.get("email")).collect())
}

/// Add an email to the whitelist. Adding an existing entry is a no-op.
/// Returns the normalized email.
///
/// # Errors
///
/// Returns [`ServiceError::BadRequest`] for malformed addresses.
pub async fn add_whitelist(pool: &PgPool, email: &str) -> Result<String, ServiceError> {
    let email =
        normalize_email(email).ok_or_else(|| ServiceError::BadRequest(format!("invalid email `{}`", email.trim())))?;
    sqlx::query("INSERT INTO whitelist (email) VALUES ($1) ON CONFLICT (email) DO NOTHING")
        .bind(&email)
        .execute(pool)
        .await?;
    Ok(email)
}

/// Remove an email from the whitelist. Returns the normalized email.
///
/// # Errors
///
/// Returns [`ServiceError::NotFound`] if the email was not whitelisted.
pub async fn remove_whitelist(pool: &PgPool, email: &str) -> Result<String, ServiceError> {
    let email = normalize_email(email).ok_or(ServiceError::NotFound("whitelist entry"))?;
    let result = sqlx::query("DELETE FROM whitelist WHERE email = $1")
        .bind(&email)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("whitelist entry"));
    }
    Ok(email)
}
