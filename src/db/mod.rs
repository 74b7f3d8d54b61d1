// src/db/mod.rs
// Database capability consumed by the cache-aside layer

pub mod row_set;
pub mod sqlite_executor;

pub use row_set::{decode_payload, encode_payload, Row, RowSet};
pub use sqlite_executor::SqliteExecutor;

use crate::error::Result;

/// Columns and text cells of a read, in database order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryResult {
    /// Pair every cell with its column name.
    pub fn into_row_set(self) -> RowSet {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|cells| columns.iter().cloned().zip(cells).collect::<Row>())
            .collect()
    }
}

/// Outcome of a mutating statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub last_insert_id: i64,
    pub rows_affected: i64,
}

/// Narrow surface over the relational database.
///
/// Timeouts and cancellation belong to the implementation; the layer above
/// makes exactly one call per operation and never retries.
pub trait DatabaseExecutor: Send + Sync {
    /// Run a read and materialize every row.
    fn query_rows(&self, sql: &str) -> Result<QueryResult>;

    /// Run a single-column read. `Ok(None)` means no row matched.
    fn query_scalar(&self, sql: &str) -> Result<Option<String>>;

    fn exec(&self, sql: &str) -> Result<ExecOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_row_set_pairs_columns() {
        let result = QueryResult {
            columns: vec!["id".into(), "name".into()],
            rows: vec![
                vec!["1".into(), "ana".into()],
                vec!["2".into(), "luis".into()],
            ],
        };
        let rows = result.into_row_set();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some("ana"));
        assert_eq!(rows[1].get("id"), Some("2"));
        assert_eq!(rows[1].columns().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn test_empty_result() {
        let result = QueryResult {
            columns: vec!["id".into()],
            rows: vec![],
        };
        assert!(result.into_row_set().is_empty());
    }
}
