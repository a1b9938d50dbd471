//! SQLite store for catalogs, orders and the reference list.
//!
//! One file holds everything the matcher reads. Imports replace whole tables
//! in a transaction, so a run never sees half an import.

mod schema;
mod catalog;
mod requests;
mod reference;

pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the store at `path`.
    ///
    /// File stores use WAL so an import and a match from separate processes
    /// don't block each other.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        let journal_mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.as_ref().display(), journal_mode = %journal_mode, "Opened database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version > SCHEMA_VERSION {
            return Err(DbError::Constraint(format!(
                "database schema version {} is newer than supported version {}",
                version, SCHEMA_VERSION
            )));
        }

        conn.execute_batch(SCHEMA)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(Self { conn })
    }

    /// Raw connection, for queries the store does not wrap.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
