//! SQLite executor for sieve query plans
//!
//! Renders a [`sieveql::plan::QueryPlan`] into a single parameterized SQLite statement and runs it on a
//! bb8-pooled rusqlite connection. Every user-supplied value travels as a bound parameter; identifiers come
//! only from registered schemas and are always double-quoted.
//!
//! Array-typed columns are expected to hold JSON arrays and are matched through `json_each`.
//!
//! # Example
//!
//! ```rust,ignore
//! use sieve_storage_sqlite::SqliteExecutor;
//!
//! let executor = SqliteExecutor::open("tasks.db").await?;
//! let paginator = sieve_core::Paginator::new(executor);
//! ```

mod connection;
mod engine;
mod error;
pub mod sql_builder;
mod value;

pub use connection::{SqliteConfig, SqliteConnectionManager};
pub use engine::{Row as SqliteRow, SqliteExecutor, DEFAULT_POOL_SIZE};
pub use error::SqliteError;
pub use value::SqliteValue;

// Initialize tracing for tests
#[cfg(test)]
#[ctor::ctor]
fn init_tracing() {
    use std::str::FromStr;
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(tracing::Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).with_test_writer().init();
    }
}
