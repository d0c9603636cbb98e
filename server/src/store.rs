//! SQLite persistence for todos.
//!
//! # Design
//! A single `todos` table behind one `Mutex<Connection>`. Handlers call
//! short synchronous methods; there are no multi-statement transactions.
//! Timestamps live as integer unix milliseconds in SQL and become
//! `DateTime<Utc>` at the row boundary, so window queries stay integer
//! comparisons.
//!
//! Rows are never hard-deleted. Delete stamps `is_deleted` and `deleted_at`;
//! restore clears both and bumps `updated_at`. A plain update leaves
//! `updated_at` alone.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::model::{Todo, TodoStatus, UpdateFields};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS todos (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT    NOT NULL,
    status      TEXT    NOT NULL DEFAULT 'todo',
    completed   INTEGER NOT NULL DEFAULT 0,
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL,
    deleted_at  INTEGER,
    is_deleted  INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_todos_is_deleted ON todos(is_deleted);
CREATE INDEX IF NOT EXISTS idx_todos_updated_at ON todos(updated_at);
";

const COLUMNS: &str = "id, title, status, completed, created_at, updated_at, deleted_at, is_deleted";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Storage-layer failure. The display text is what the error classifier
/// inspects, so it carries the underlying SQLite message verbatim.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The connection mutex was poisoned by a panicking holder.
    #[error("database connection lock poisoned")]
    Poisoned,
}

// ---------------------------------------------------------------------------
// TodoStore
// ---------------------------------------------------------------------------

/// Persistent storage for todos, backed by rusqlite.
pub struct TodoStore {
    conn: Mutex<Connection>,
}

impl TodoStore {
    /// Open or create the database at `path` and initialise the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    /// In-memory database, used by tests and the default dev configuration.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Insert a new row with a server-assigned id and timestamps.
    ///
    /// The HTTP surface has no create route; this exists for seeding and for
    /// the storage lifecycle itself.
    pub fn insert(
        &self,
        title: &str,
        status: TodoStatus,
        completed: bool,
    ) -> Result<Todo, StoreError> {
        let now = Utc::now().timestamp_millis();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO todos (title, status, completed, created_at, updated_at, is_deleted) \
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![title, status.as_str(), completed, now, now],
        )?;
        let id = conn.last_insert_rowid();
        fetch(&conn, id)
    }

    /// Fetch one row by id, deleted or not.
    pub fn find(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let conn = self.lock()?;
        let todo = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM todos WHERE id = ?1"),
                [id],
                row_to_todo,
            )
            .optional()?;
        Ok(todo)
    }

    /// Active rows in insertion order, optionally filtered by status.
    pub fn list_active(&self, status: Option<TodoStatus>) -> Result<Vec<Todo>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM todos \
             WHERE is_deleted = 0 AND (?1 IS NULL OR status = ?1) \
             ORDER BY id"
        ))?;
        let rows = stmt.query_map([status.map(|s| s.as_str())], row_to_todo)?;
        collect(rows)
    }

    /// Soft-deleted rows in insertion order.
    pub fn list_deleted(&self) -> Result<Vec<Todo>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM todos WHERE is_deleted = 1 ORDER BY id"
        ))?;
        let rows = stmt.query_map([], row_to_todo)?;
        collect(rows)
    }

    /// Active rows updated within the last `days` days, newest first, at
    /// most `limit` rows.
    ///
    /// Negative values pass straight through: a negative `limit` lifts the
    /// cap (SQLite semantics) and a negative `days` puts the cutoff in the
    /// future, which matches nothing.
    pub fn recent_updates(&self, limit: i64, days: i64) -> Result<Vec<Todo>, StoreError> {
        let now = Utc::now().timestamp_millis();
        // Saturate instead of overflowing on absurd windows.
        let cutoff = days
            .checked_mul(MILLIS_PER_DAY)
            .and_then(|window| now.checked_sub(window))
            .unwrap_or(if days >= 0 { i64::MIN } else { i64::MAX });

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM todos \
             WHERE is_deleted = 0 AND updated_at >= ?1 \
             ORDER BY updated_at DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![cutoff, limit], row_to_todo)?;
        collect(rows)
    }

    /// Write the supplied fields to one row and return it, or `None` when
    /// the id matches nothing.
    ///
    /// `updated_at` is deliberately left alone; only restore bumps it. The
    /// caller guarantees at least one field is set.
    pub fn apply_update(&self, id: i64, fields: &UpdateFields) -> Result<Option<Todo>, StoreError> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(ref title) = fields.title {
            sets.push("title = ?");
            values.push(Box::new(title.clone()));
        }
        if let Some(status) = fields.status {
            sets.push("status = ?");
            values.push(Box::new(status.as_str()));
        }
        if let Some(completed) = fields.completed {
            sets.push("completed = ?");
            values.push(Box::new(completed));
        }
        values.push(Box::new(id));

        let sql = format!("UPDATE todos SET {} WHERE id = ?", sets.join(", "));
        let conn = self.lock()?;
        let refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let affected = conn.execute(&sql, refs.as_slice())?;
        if affected == 0 {
            return Ok(None);
        }
        fetch(&conn, id).map(Some)
    }

    /// Stamp a row deleted and return it, or `None` when the id matches
    /// nothing. Callers check the current state first; a racing second
    /// delete lands as a harmless overwrite of `deleted_at`.
    pub fn mark_deleted(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let now = Utc::now().timestamp_millis();
        let conn = self.lock()?;
        let affected = conn.execute(
            "UPDATE todos SET is_deleted = 1, deleted_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        if affected == 0 {
            return Ok(None);
        }
        fetch(&conn, id).map(Some)
    }

    /// Clear the deleted flag, drop `deleted_at` and bump `updated_at`.
    /// Returns `None` when the id matches nothing.
    pub fn restore(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        let now = Utc::now().timestamp_millis();
        let conn = self.lock()?;
        let affected = conn.execute(
            "UPDATE todos SET is_deleted = 0, deleted_at = NULL, updated_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        if affected == 0 {
            return Ok(None);
        }
        fetch(&conn, id).map(Some)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn fetch(conn: &Connection, id: i64) -> Result<Todo, StoreError> {
    let todo = conn.query_row(
        &format!("SELECT {COLUMNS} FROM todos WHERE id = ?1"),
        [id],
        row_to_todo,
    )?;
    Ok(todo)
}

fn collect(rows: impl Iterator<Item = rusqlite::Result<Todo>>) -> Result<Vec<Todo>, StoreError> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn row_to_todo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Todo> {
    let status_raw: String = row.get(2)?;
    let status = TodoStatus::from_str(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown status '{status_raw}'").into(),
        )
    })?;
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        status,
        completed: row.get(3)?,
        created_at: timestamp_col(row, 4)?,
        updated_at: timestamp_col(row, 5)?,
        deleted_at: match row.get::<_, Option<i64>>(6)? {
            Some(ms) => Some(millis_to_utc(ms, 6)?),
            None => None,
        },
        is_deleted: row.get(7)?,
    })
}

fn timestamp_col(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    millis_to_utc(row.get(idx)?, idx)
}

fn millis_to_utc(ms: i64, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            format!("timestamp {ms} out of range").into(),
        )
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
