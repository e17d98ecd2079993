//! Meal repository implementations
//!
//! One SQLite connection is shared by every repository. Statements run on
//! the blocking pool; write paths that check a rule and then mutate open an
//! immediate transaction so the check and the write see the same state.

mod allocation_repo;
mod claim_repo;
mod reference_repo;

pub use allocation_repo::*;
pub use claim_repo::*;
pub use reference_repo::*;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;

use crate::config::DbConfig;
use crate::error::{MealDbError, MealDbResult};

/// Shared handle to the connection
#[derive(Clone)]
pub struct DbHandle {
    conn: Arc<Mutex<Connection>>,
}

impl DbHandle {
    fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run `f` against the connection on the blocking pool
    pub async fn call<T, F>(&self, f: F) -> MealDbResult<T>
    where
        F: FnOnce(&mut Connection) -> MealDbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            f(&mut guard)
        })
        .await
        .map_err(|e| MealDbError::Join(e.to_string()))?
    }
}

/// Meal database - main entry point for storage operations
pub struct MealDatabase {
    handle: DbHandle,
    pub allocations: AllocationRepo,
    pub claims: ClaimRepo,
    pub references: ReferenceRepo,
}

impl MealDatabase {
    /// Open the database described by `config`
    pub fn open(config: &DbConfig) -> MealDbResult<Self> {
        let conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            let conn = Connection::open(&config.path)?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            conn
        };
        conn.busy_timeout(config.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self::new(conn))
    }

    /// Open a private in-memory database
    pub fn in_memory() -> MealDbResult<Self> {
        Self::open(&DbConfig::default())
    }

    fn new(conn: Connection) -> Self {
        let handle = DbHandle::new(conn);
        Self {
            allocations: AllocationRepo::new(handle.clone()),
            claims: ClaimRepo::new(handle.clone()),
            references: ReferenceRepo::new(handle.clone()),
            handle,
        }
    }

    pub fn handle(&self) -> &DbHandle {
        &self.handle
    }

    /// Initialize the schema
    pub async fn init_schema(&self) -> MealDbResult<()> {
        self.handle
            .call(|conn| {
                conn.execute_batch(crate::schema::MEAL_SCHEMA)
                    .map_err(|e| MealDbError::SchemaError(e.to_string()))
            })
            .await
    }

    /// Check database health
    pub async fn health_check(&self) -> MealDbResult<bool> {
        self.handle
            .call(|conn| {
                let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
                Ok(one == 1)
            })
            .await
    }
}

pub(crate) fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

pub(crate) fn from_micros(micros: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        rusqlite::Error::IntegralValueOutOfRange(0, micros)
    })
}

/// Convert a non-negative SQLite count
pub(crate) fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let db = MealDatabase::in_memory().unwrap();
        db.init_schema().await.unwrap();
        db.init_schema().await.unwrap();
        assert!(db.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let db = MealDatabase::in_memory().unwrap();
        let enabled: i64 = db
            .handle()
            .call(|conn| Ok(conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
