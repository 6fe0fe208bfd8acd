//! SQLite executor implementation

use std::path::Path;

use async_trait::async_trait;
use rusqlite::params_from_iter;
use sieve_core::QueryExecutor;
use sieveql::plan::QueryPlan;
use tracing::debug;

use crate::connection::SqliteConnectionManager;
use crate::error::SqliteError;
use crate::sql_builder::SqlBuilder;
use crate::value::SqliteValue;

/// Default connection pool size
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// One result row, keyed by projected column alias.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Runs query plans against a pooled SQLite database.
pub struct SqliteExecutor {
    pool: bb8::Pool<SqliteConnectionManager>,
}

impl SqliteExecutor {
    /// Create a new executor with an existing pool
    pub fn new(pool: bb8::Pool<SqliteConnectionManager>) -> Self { Self { pool } }

    /// Open a file-based SQLite database
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let manager = SqliteConnectionManager::file(path.as_ref());
        let pool = bb8::Pool::builder().max_size(DEFAULT_POOL_SIZE).build(manager).await?;
        Ok(Self::new(pool))
    }

    /// Open an in-memory SQLite database (for testing)
    pub async fn open_in_memory() -> anyhow::Result<Self> {
        let manager = SqliteConnectionManager::memory();
        // A single connection keeps the in-memory database alive
        let pool = bb8::Pool::builder().max_size(1).build(manager).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &bb8::Pool<SqliteConnectionManager> { &self.pool }

    /// Runs raw statements, e.g. DDL and fixture data.
    pub async fn execute_batch(&self, sql: impl Into<String>) -> Result<(), SqliteError> {
        let sql = sql.into();
        let conn = self.pool.get().await.map_err(|e| SqliteError::Pool(e.to_string()))?;
        conn.with_connection(move |c| Ok(c.execute_batch(&sql)?)).await
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    type Row = Row;
    type Error = SqliteError;

    async fn count(&self, plan: &QueryPlan) -> Result<u64, SqliteError> {
        let (sql, params) = SqlBuilder::count(plan)?.build();
        debug!("SqliteExecutor.count: {} {:?}", sql, params);

        let conn = self.pool.get().await.map_err(|e| SqliteError::Pool(e.to_string()))?;
        let count: i64 = conn.with_connection(move |c| Ok(c.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?)).await?;
        Ok(count.max(0) as u64)
    }

    async fn fetch(&self, plan: &QueryPlan) -> Result<Vec<Row>, SqliteError> {
        let (sql, params) = SqlBuilder::select(plan)?.build();
        debug!("SqliteExecutor.fetch: {} {:?}", sql, params);

        let conn = self.pool.get().await.map_err(|e| SqliteError::Pool(e.to_string()))?;
        let rows = conn
            .with_connection(move |c| {
                let mut stmt = c.prepare(&sql)?;
                let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
                let mut rows = stmt.query(params_from_iter(params.iter()))?;

                let mut results = Vec::new();
                while let Some(row) = rows.next()? {
                    let mut map = Row::new();
                    for (i, name) in columns.iter().enumerate() {
                        let value: rusqlite::types::Value = row.get(i)?;
                        map.insert(name.clone(), SqliteValue::from(value).into_json());
                    }
                    results.push(map);
                }
                Ok(results)
            })
            .await?;

        debug!("SqliteExecutor.fetch: {} rows", rows.len());
        Ok(rows)
    }
}
