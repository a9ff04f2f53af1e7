//! Relational store capability for fixture cleanup.
//!
//! Tests create real state through the UI (registered users, threads);
//! fixtures undo it directly against the forum's backing store. The
//! capability is fixture-only: the poller/retry core never touches it.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::result::ForoResult;

/// Store operations fixtures rely on
pub trait ForumStore: Send + Sync {
    /// Delete a user by username; returns affected rows
    fn delete_user_by_username(&self, username: &str) -> ForoResult<usize>;

    /// Delete a user by nickname; returns affected rows
    fn delete_user_by_nickname(&self, nickname: &str) -> ForoResult<usize>;

    /// Resolve a user id from either username or nickname
    fn lookup_user_id(&self, username_or_nickname: &str) -> ForoResult<Option<u64>>;

    /// Id of the user's most recently created thread
    fn lookup_latest_thread_id(&self, user_id: u64) -> ForoResult<Option<u64>>;

    /// Resolve a thread id by exact title
    fn lookup_thread_id_by_title(&self, title: &str) -> ForoResult<Option<u64>>;
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open or create the store at `path`
    pub fn open(path: impl AsRef<Path>) -> ForoResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.ensure_schema()?;
        tracing::info!(path = %path.as_ref().display(), "store opened");
        Ok(store)
    }

    /// Open an in-memory store (for tests)
    pub fn open_memory() -> ForoResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> ForoResult<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                nickname TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS threads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_threads_user ON threads(user_id);
            ",
        )?;
        Ok(())
    }

    /// Seed a user row; returns the new id
    pub fn insert_user(&self, username: &str, nickname: &str) -> ForoResult<u64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (username, nickname) VALUES (?1, ?2)",
            params![username, nickname],
        )?;
        Ok(conn.last_insert_rowid() as u64)
    }

    /// Seed a thread row; returns the new id
    pub fn insert_thread(&self, user_id: u64, title: &str) -> ForoResult<u64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO threads (user_id, title, created_at)
             VALUES (?1, ?2, CAST(strftime('%s','now') AS INTEGER))",
            params![user_id, title],
        )?;
        Ok(conn.last_insert_rowid() as u64)
    }
}

impl ForumStore for SqliteStore {
    fn delete_user_by_username(&self, username: &str) -> ForoResult<usize> {
        let conn = self.conn.lock();
        let rows = conn.execute("DELETE FROM users WHERE username = ?1", params![username])?;
        tracing::debug!(username, rows, "user cleanup by username");
        Ok(rows)
    }

    fn delete_user_by_nickname(&self, nickname: &str) -> ForoResult<usize> {
        let conn = self.conn.lock();
        let rows = conn.execute("DELETE FROM users WHERE nickname = ?1", params![nickname])?;
        tracing::debug!(nickname, rows, "user cleanup by nickname");
        Ok(rows)
    }

    fn lookup_user_id(&self, username_or_nickname: &str) -> ForoResult<Option<u64>> {
        let conn = self.conn.lock();
        let id = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1 OR nickname = ?1",
                params![username_or_nickname],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(|id| id as u64))
    }

    fn lookup_latest_thread_id(&self, user_id: u64) -> ForoResult<Option<u64>> {
        let conn = self.conn.lock();
        let id = conn
            .query_row(
                "SELECT id FROM threads WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                params![user_id as i64],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(|id| id as u64))
    }

    fn lookup_thread_id_by_title(&self, title: &str) -> ForoResult<Option<u64>> {
        let conn = self.conn.lock();
        let id = conn
            .query_row(
                "SELECT id FROM threads WHERE title = ?1 LIMIT 1",
                params![title],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(|id| id as u64))
    }
}
