//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and auth plumbing.
//! Every fallible service call returns [`ServiceError`]; the route layer maps
//! it to a status code in one place.

pub mod auth;
pub mod checkins;
pub mod events;
pub mod teams;
pub mod token;
pub mod users;

use models::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Invalid(#[from] ModelError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    /// Map unique and foreign-key violations to conflicts; everything else
    /// stays a database error.
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::Conflict(format!("{what} already exists"));
            }
            if db.is_foreign_key_violation() {
                return Self::Conflict(format!("{what} references a missing record"));
            }
        }
        Self::Database(err)
    }
}
