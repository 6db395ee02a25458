//! Repository implementations over `SeaORM`.
//!
//! [`SeaStore`] implements every repository trait of `tally-core`, so the
//! services run unchanged on PostgreSQL or SQLite.

mod banking;
mod treasury;

use std::fmt::Display;
use std::str::FromStr;

use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tally_core::RepositoryError;

/// Database-backed store.
#[derive(Debug, Clone)]
pub struct SeaStore {
    db: DatabaseConnection,
}

impl SeaStore {
    /// Creates a new store over an open connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn storage(err: DbErr) -> RepositoryError {
    tracing::debug!(error = %err, "database operation failed");
    RepositoryError::Storage(err.to_string())
}

/// Maps a failed insert or update, turning unique violations into
/// `Duplicate` on `field`.
fn write_err(
    err: DbErr,
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::Duplicate {
            entity,
            field,
            value: value.to_string(),
        },
        _ => storage(err),
    }
}

/// Explains a version-guarded update that matched no row: the row is either
/// gone or was changed since it was read.
fn stale_or_missing(exists: bool, entity: &'static str, id: impl Display) -> RepositoryError {
    if exists {
        RepositoryError::Conflict {
            entity,
            id: id.to_string(),
        }
    } else {
        RepositoryError::not_found(entity, id)
    }
}

/// Parses a stored enum or currency label.
fn parse<T: FromStr<Err = String>>(value: &str) -> Result<T, RepositoryError> {
    value.parse().map_err(RepositoryError::Storage)
}

fn encode<T: Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Storage(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(value).map_err(|e| RepositoryError::Storage(e.to_string()))
}

/// Converts stored rows into domain entities.
fn convert<M, T>(rows: Vec<M>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<M, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}
