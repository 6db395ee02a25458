//! A single in-memory table keyed by id.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use chrono::{DateTime, Utc};

use crate::error::RepositoryError;

/// A row that can live in a [`Table`].
pub(crate) trait Record: Clone + Send + Sync {
    /// Primary key.
    type Id: Copy + Eq + Hash + Ord + Display + Send + Sync;

    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn id(&self) -> Self::Id;

    fn created_at(&self) -> DateTime<Utc>;

    /// `(field, value)` pairs that must be unique across the table.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Optimistic concurrency token, for versioned entities.
    fn version(&self) -> Option<i64> {
        None
    }

    fn set_version(&mut self, _version: i64) {}
}

/// Rows of one entity type.
pub(crate) struct Table<T: Record> {
    rows: HashMap<T::Id, T>,
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<T: Record> Table<T> {
    pub(crate) fn get(&self, id: T::Id) -> Result<T, RepositoryError> {
        self.rows
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(T::ENTITY, id))
    }

    pub(crate) fn contains(&self, id: T::Id) -> bool {
        self.rows.contains_key(&id)
    }

    pub(crate) fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.values().find(|row| predicate(row)).cloned()
    }

    /// Matching rows ordered by creation time, then id.
    pub(crate) fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let mut rows: Vec<T> = self
            .rows
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        rows
    }

    pub(crate) fn all(&self) -> Vec<T> {
        self.filter(|_| true)
    }

    pub(crate) fn check_insert(&self, row: &T) -> Result<(), RepositoryError> {
        if self.rows.contains_key(&row.id()) {
            return Err(RepositoryError::Duplicate {
                entity: T::ENTITY,
                field: "id",
                value: row.id().to_string(),
            });
        }
        self.check_unique(row)
    }

    pub(crate) fn insert(&mut self, row: &T) -> Result<(), RepositoryError> {
        self.check_insert(row)?;
        self.rows.insert(row.id(), row.clone());
        Ok(())
    }

    pub(crate) fn check_update(&self, row: &T) -> Result<(), RepositoryError> {
        let stored = self.get(row.id())?;
        if stored.version() != row.version() {
            return Err(RepositoryError::Conflict {
                entity: T::ENTITY,
                id: row.id().to_string(),
            });
        }
        self.check_unique(row)
    }

    /// Stores a row already validated by [`Table::check_update`].
    pub(crate) fn apply_update(&mut self, row: &T) -> T {
        let mut stored = row.clone();
        if let Some(version) = row.version() {
            stored.set_version(version + 1);
        }
        self.rows.insert(stored.id(), stored.clone());
        stored
    }

    pub(crate) fn update(&mut self, row: &T) -> Result<T, RepositoryError> {
        self.check_update(row)?;
        Ok(self.apply_update(row))
    }

    fn check_unique(&self, row: &T) -> Result<(), RepositoryError> {
        let keys = row.unique_keys();
        if keys.is_empty() {
            return Ok(());
        }
        for other in self.rows.values().filter(|other| other.id() != row.id()) {
            let other_keys = other.unique_keys();
            for (field, value) in &keys {
                if other_keys.iter().any(|(f, v)| f == field && v == value) {
                    return Err(RepositoryError::Duplicate {
                        entity: T::ENTITY,
                        field: *field,
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Applies `limit`/`offset` to an ordered result.
pub(crate) fn page<T>(rows: Vec<T>, limit: u64, offset: u64) -> Vec<T> {
    let skip = usize::try_from(offset).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    rows.into_iter().skip(skip).take(take).collect()
}
