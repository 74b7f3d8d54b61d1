// src/db/sqlite_executor.rs
use parking_lot::Mutex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::{DatabaseExecutor, ExecOutcome, QueryResult};
use crate::error::{LdbError, Result};

/// SQLite-backed executor holding a single connection.
pub struct SqliteExecutor {
    conn: Mutex<Connection>,
}

impl SqliteExecutor {
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening database at: {}", path.display());
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run a batch of statements, e.g. a schema script.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.lock().execute_batch(sql)?;
        Ok(())
    }
}

/// Text form of a cell. NULL becomes the empty string.
fn cell_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

impl DatabaseExecutor for SqliteExecutor {
    fn query_rows(&self, sql: &str) -> Result<QueryResult> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(cell_text(row.get_ref(i)?));
            }
            out.push(cells);
        }

        debug!(rows = out.len(), columns = width, "Query materialized");
        Ok(QueryResult { columns, rows: out })
    }

    fn query_scalar(&self, sql: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        if stmt.column_count() != 1 {
            return Err(LdbError::Database(format!(
                "scalar query must return exactly 1 column, got {}",
                stmt.column_count()
            )));
        }
        let value = stmt
            .query_row([], |row| Ok(cell_text(row.get_ref(0)?)))
            .optional()?;
        Ok(value)
    }

    fn exec(&self, sql: &str) -> Result<ExecOutcome> {
        let conn = self.conn.lock();
        let changed = conn.execute(sql, [])?;
        Ok(ExecOutcome {
            last_insert_id: conn.last_insert_rowid(),
            rows_affected: changed as i64,
        })
    }
}
