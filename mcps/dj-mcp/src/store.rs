//! Store accessor
//!
//! Every handler invocation opens its own [`StoreConnection`], runs its
//! statements and closes it again. Engine calls run on the blocking pool so
//! concurrent requests get concurrent connections.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::row::{Row, Value};

/// Store accessor errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database could not be opened or closed
    #[error("database connection error at {path:?}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The engine rejected or failed a statement; carries its message verbatim
    #[error("{0}")]
    Query(String),

    /// The blocking worker running an engine call died
    #[error("database worker failed: {0}")]
    Worker(String),
}

impl mcp_common::IntoMcpError for StoreError {
    fn into_mcp_error(self) -> mcp_common::McpError {
        mcp_common::internal_error(self.to_string())
    }
}

/// Open/close accounting shared by every connection of a [`Store`]
#[derive(Debug, Default)]
pub struct StoreStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl StoreStats {
    /// Connections opened so far
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Connections released so far, explicitly or on drop
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Connections currently open
    pub fn open_now(&self) -> usize {
        self.opened().saturating_sub(self.closed())
    }
}

/// Handle to the on-disk database file
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    stats: Arc<StoreStats>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stats: Arc::new(StoreStats::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Open a new connection, creating the file if it does not exist
    pub async fn open(&self) -> Result<StoreConnection, StoreError> {
        let path = self.path.clone();
        let conn = tokio::task::spawn_blocking(move || Connection::open(path))
            .await
            .map_err(|e| StoreError::Worker(e.to_string()))?
            .map_err(|source| StoreError::Connection {
                path: self.path.clone(),
                source,
            })?;

        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(path = ?self.path, "Opened database connection");

        Ok(StoreConnection {
            handle: Some(Handle {
                conn: Some(conn),
                stats: Arc::clone(&self.stats),
            }),
            path: self.path.clone(),
        })
    }
}

/// Owns the engine connection. Dropping it releases the connection and counts
/// the close, so every open is matched by exactly one close.
struct Handle {
    conn: Option<Connection>,
    stats: Arc<StoreStats>,
}

impl Handle {
    fn all(&self, sql: &str) -> Result<Vec<Row>, StoreError> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| StoreError::Worker("connection already released".to_string()))?;

        // Blank or comment-only input compiles to no statement at all
        if !has_statement(sql) {
            return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(sql).map_err(query_error)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query([]).map_err(query_error)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            let mut record = Row::new();
            for (idx, name) in columns.iter().enumerate() {
                let value = row.get_ref(idx).map_err(query_error)?;
                record.insert(name.as_str(), Value::from(value));
            }
            out.push(record);
        }

        Ok(out)
    }

    fn close(mut self, path: &Path) -> Result<(), StoreError> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, source)| StoreError::Connection {
                path: path.to_path_buf(),
                source,
            }),
            None => Ok(()),
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        drop(self.conn.take());
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Whether `sql` holds anything besides whitespace, `;` separators and comments
fn has_statement(sql: &str) -> bool {
    let mut rest = sql;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ';');
        if let Some(comment) = rest.strip_prefix("--") {
            rest = comment.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(comment) = rest.strip_prefix("/*") {
            rest = comment.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return !rest.is_empty();
        }
    }
}

fn query_error(e: rusqlite::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

/// A connection scoped to one handler invocation.
///
/// Call [`close`](Self::close) on every path once the work is done. A
/// connection dropped without it (panic, cancelled request) is still released
/// by its destructor.
pub struct StoreConnection {
    handle: Option<Handle>,
    path: PathBuf,
}

impl StoreConnection {
    /// Run one statement and collect every resulting row.
    ///
    /// No validation happens here: DDL and DML run as-is and yield no rows.
    pub async fn all(&mut self, sql: &str) -> Result<Vec<Row>, StoreError> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| StoreError::Worker("connection already released".to_string()))?;
        let sql = sql.to_owned();

        let (handle, result) = tokio::task::spawn_blocking(move || {
            let result = handle.all(&sql);
            (handle, result)
        })
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))?;

        self.handle = Some(handle);
        result
    }

    /// Release the connection
    pub async fn close(mut self) -> Result<(), StoreError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || handle.close(&path))
            .await
            .map_err(|e| StoreError::Worker(e.to_string()))?
    }
}

impl Drop for StoreConnection {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::warn!(path = ?self.path, "Database connection dropped without close");
            drop(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("database.db"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_open_creates_file() {
        let (_dir, store) = temp_store();
        let conn = store.open().await.unwrap();
        conn.close().await.unwrap();

        assert!(store.path().exists());
        assert_eq!(store.stats().opened(), 1);
        assert_eq!(store.stats().closed(), 1);
    }

    #[tokio::test]
    async fn test_open_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("missing").join("nested").join("database.db"));

        let result = store.open().await;
        assert!(matches!(result, Err(StoreError::Connection { .. })));
        assert_eq!(store.stats().opened(), 0);
        assert_eq!(store.stats().closed(), 0);
    }

    #[tokio::test]
    async fn test_all_returns_rows_in_column_order() {
        let (_dir, store) = temp_store();
        let mut conn = store.open().await.unwrap();

        conn.all("CREATE TABLE songs(title TEXT, bpm INTEGER, rating REAL, art BLOB)")
            .await
            .unwrap();
        conn.all("INSERT INTO songs VALUES ('Intro', 120, 4.5, x'0102'), (NULL, 90, NULL, NULL)")
            .await
            .unwrap();

        let rows = conn.all("SELECT * FROM songs ORDER BY bpm DESC").await.unwrap();
        conn.close().await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].columns().collect::<Vec<_>>(),
            vec!["title", "bpm", "rating", "art"]
        );
        assert_eq!(rows[0].get("title"), Some(&Value::Text("Intro".to_string())));
        assert_eq!(rows[0].get("bpm"), Some(&Value::Integer(120)));
        assert_eq!(rows[0].get("rating"), Some(&Value::Real(4.5)));
        assert_eq!(rows[0].get("art"), Some(&Value::Blob(vec![1, 2])));
        assert_eq!(rows[1].get("title"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_mutations_return_no_rows() {
        let (_dir, store) = temp_store();
        let mut conn = store.open().await.unwrap();

        let created = conn.all("CREATE TABLE t(x INTEGER)").await.unwrap();
        let inserted = conn.all("INSERT INTO t VALUES (1)").await.unwrap();
        let count = conn.all("SELECT COUNT(*) AS n FROM t").await.unwrap();
        conn.close().await.unwrap();

        assert!(created.is_empty());
        assert!(inserted.is_empty());
        assert_eq!(count[0].get("n"), Some(&Value::Integer(1)));
    }

    #[tokio::test]
    async fn test_invalid_sql_is_query_error() {
        let (_dir, store) = temp_store();
        let mut conn = store.open().await.unwrap();

        let err = conn.all("SELEKT 1").await.unwrap_err();
        // The connection stays usable after a failed statement
        let rows = conn.all("SELECT 1 AS one").await.unwrap();
        conn.close().await.unwrap();

        match err {
            StoreError::Query(message) => assert!(message.contains("syntax error")),
            other => panic!("expected query error, got {other:?}"),
        }
        assert_eq!(rows[0].get("one"), Some(&Value::Integer(1)));
    }

    #[tokio::test]
    async fn test_missing_table_is_query_error() {
        let (_dir, store) = temp_store();
        let mut conn = store.open().await.unwrap();

        let err = conn.all("SELECT * FROM nope").await.unwrap_err();
        conn.close().await.unwrap();

        assert!(matches!(err, StoreError::Query(ref m) if m.contains("no such table")));
    }

    #[test]
    fn test_has_statement() {
        assert!(!has_statement(""));
        assert!(!has_statement("   \n\t"));
        assert!(!has_statement(";;"));
        assert!(!has_statement("-- just a comment"));
        assert!(!has_statement("/* block */ -- line\n ;"));
        assert!(!has_statement("/* unterminated"));
        assert!(has_statement("SELECT 1"));
        assert!(has_statement("-- leading\nSELECT 1"));
        assert!(has_statement("/* x */ SELEKT"));
    }

    #[tokio::test]
    async fn test_blank_and_comment_sql_yield_no_rows() {
        let (_dir, store) = temp_store();
        let mut conn = store.open().await.unwrap();

        for sql in ["", "   ", "-- c", "/* nothing */;"] {
            let rows = conn.all(sql).await.unwrap();
            assert!(rows.is_empty(), "{sql:?} returned rows");
        }
        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_drop_without_close_still_releases() {
        let (_dir, store) = temp_store();
        {
            let mut conn = store.open().await.unwrap();
            conn.all("SELECT 1").await.unwrap();
            assert_eq!(store.stats().open_now(), 1);
        }

        assert_eq!(store.stats().opened(), 1);
        assert_eq!(store.stats().closed(), 1);
        assert_eq!(store.stats().open_now(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_stats() {
        let (_dir, store) = temp_store();
        let other = store.clone();

        other.open().await.unwrap().close().await.unwrap();
        store.open().await.unwrap().close().await.unwrap();

        assert_eq!(store.stats().opened(), 2);
        assert_eq!(other.stats().closed(), 2);
    }
}
