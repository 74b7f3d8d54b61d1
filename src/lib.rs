//! Cache-aside data access over a relational database.
//!
//! Reads can be memoized in an external key-value cache under
//! `group + "_" + md5(query)`; mutations always go to the database.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ldb::{Ldb, MemoryCache, QueryOptions, SqliteExecutor};
//!
//! # fn main() -> ldb::Result<()> {
//! let ldb = Ldb::new(
//!     Arc::new(SqliteExecutor::open_in_memory()?),
//!     Arc::new(MemoryCache::new()),
//! );
//! let phones = ldb.query(
//!     "SELECT numero FROM contacto_telefono",
//!     &QueryOptions::cached("contacts").with_ttl(600),
//! )?;
//! println!("{} numbers", phones.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod hashing;
pub mod logging;
pub mod query;

pub use cache::{build_key, CacheClient, CacheStats, MemoryCache, RedisCache};
pub use config::LdbConfig;
pub use db::{DatabaseExecutor, ExecOutcome, QueryResult, Row, RowSet, SqliteExecutor};
pub use error::{report_or_fail, ErrorKind, LdbError, Result, Severity};
pub use query::{CacheWritePolicy, Ldb, MutationKind, QueryOptions, DEFAULT_TTL_SECS, NOT_FOUND};
