//! SQLite-based storage for users, items and the log ledger.
//!
//! Every item query is scoped by `user_id`: an item owned by someone else
//! behaves exactly like a missing row.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension};

use tracing::warn;

use super::migrations;
use crate::error::{DatabaseError, Result};
use crate::item::Item;
use crate::ledger::{LogEntry, NewLogEntry};
use crate::user::User;

const ITEM_COLUMNS: &str = "id, user_id, name, description, frequency, alpha, decay_rate, \
     target, current_value, streak, created_at, updated_at";

/// Format a timestamp for storage.
///
/// Fixed width with a `Z` suffix, so text order is time order.
fn format_ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp, failing the row instead of guessing.
fn parse_ts(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: parse_ts(row, 3)?,
    })
}

fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        frequency: row.get(4)?,
        alpha: row.get(5)?,
        decay_rate: row.get(6)?,
        target: row.get(7)?,
        current_value: row.get(8)?,
        streak: row.get(9)?,
        created_at: parse_ts(row, 10)?,
        updated_at: parse_ts(row, 11)?,
    })
}

fn row_to_log(row: &rusqlite::Row) -> rusqlite::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        item_id: row.get(1)?,
        amount: row.get(2)?,
        logged_at: parse_ts(row, 3)?,
    })
}

/// SQLite database handle.
///
/// This is the persistence context handed to the access layer. One handle
/// serves one writer; open a handle per thread for parallel callers.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Run `f` as one atomic unit.
    ///
    /// Commits when `f` succeeds and rolls back when it fails, so a
    /// read-modify-write of an item never interleaves with another writer.
    ///
    /// # Errors
    /// Returns the error from `f`, or a database error from BEGIN/COMMIT.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(value)
            }
            Err(err) => {
                if let Err(e) = self.conn.execute_batch("ROLLBACK;") {
                    warn!(error = %e, "rollback failed");
                }
                Err(err)
            }
        }
    }

    // === Users ===

    /// Insert a user and return it with its new id.
    pub fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> rusqlite::Result<User> {
        self.conn.execute(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
            params![username, password_hash, format_ts(created_at)],
        )?;
        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    pub fn find_user_by_name(&self, username: &str) -> rusqlite::Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()
    }

    pub fn get_user(&self, id: i64) -> rusqlite::Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()
    }

    /// Delete a user; items and their logs go with it. Returns rows removed.
    pub fn delete_user(&self, id: i64) -> rusqlite::Result<usize> {
        self.conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])
    }

    // === Items ===

    /// Insert a new item and return its id.
    pub fn insert_item(&self, item: &Item) -> rusqlite::Result<i64> {
        self.conn.execute(
            "INSERT INTO items (user_id, name, description, frequency, alpha, decay_rate,
                                target, current_value, streak, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                item.user_id,
                item.name,
                item.description,
                item.frequency,
                item.alpha,
                item.decay_rate,
                item.target,
                item.current_value,
                item.streak,
                format_ts(item.created_at),
                format_ts(item.updated_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get an item by id, only if `user_id` owns it.
    pub fn get_item(&self, user_id: i64, id: i64) -> rusqlite::Result<Option<Item>> {
        self.conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1 AND user_id = ?2"),
                params![id, user_id],
                row_to_item,
            )
            .optional()
    }

    /// List a user's items, newest first.
    pub fn list_items(&self, user_id: i64) -> rusqlite::Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_item)?;
        rows.collect()
    }

    /// Write back every mutable column of an item. Returns rows changed.
    ///
    /// `created_at` and ownership are never rewritten.
    pub fn update_item(&self, item: &Item) -> rusqlite::Result<usize> {
        self.conn.execute(
            "UPDATE items
             SET name = ?1, description = ?2, frequency = ?3, alpha = ?4, decay_rate = ?5,
                 target = ?6, current_value = ?7, streak = ?8, updated_at = ?9
             WHERE id = ?10 AND user_id = ?11",
            params![
                item.name,
                item.description,
                item.frequency,
                item.alpha,
                item.decay_rate,
                item.target,
                item.current_value,
                item.streak,
                format_ts(item.updated_at),
                item.id,
                item.user_id,
            ],
        )
    }

    /// Delete an item owned by `user_id`; its logs go with it.
    pub fn delete_item(&self, user_id: i64, id: i64) -> rusqlite::Result<usize> {
        self.conn.execute(
            "DELETE FROM items WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )
    }

    // === Log ledger ===

    /// Append a log entry.
    pub fn append_log(&self, entry: NewLogEntry) -> rusqlite::Result<LogEntry> {
        self.conn.execute(
            "INSERT INTO log_entries (item_id, amount, logged_at) VALUES (?1, ?2, ?3)",
            params![entry.item_id, entry.amount, format_ts(entry.logged_at)],
        )?;
        Ok(entry.stored(self.conn.last_insert_rowid()))
    }

    /// Most recent `limit` entries for an item, newest first.
    pub fn recent_logs(&self, item_id: i64, limit: usize) -> rusqlite::Result<Vec<LogEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, amount, logged_at FROM log_entries
             WHERE item_id = ?1
             ORDER BY logged_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![item_id, limit], row_to_log)?;
        rows.collect()
    }

    pub fn count_logs(&self, item_id: i64) -> rusqlite::Result<i64> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM log_entries WHERE item_id = ?1",
            params![item_id],
            |row| row.get(0),
        )
    }
}
