//! Connection manager for bb8 pool with rusqlite

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rusqlite::{Connection, InterruptHandle};
use tokio::sync::Mutex;

use crate::error::SqliteError;

/// Configuration for SQLite connections
#[derive(Clone, Debug)]
pub enum SqliteConfig {
    /// File-based database
    File(PathBuf),
    /// In-memory database (for testing)
    Memory,
}

/// Opens rusqlite connections for a bb8 pool.
///
/// rusqlite::Connection is not Sync, so every pooled connection sits behind a Mutex and is only touched
/// from spawn_blocking.
pub struct SqliteConnectionManager {
    config: SqliteConfig,
}

impl SqliteConnectionManager {
    pub fn new(config: SqliteConfig) -> Self { Self { config } }

    pub fn file(path: impl Into<PathBuf>) -> Self { Self::new(SqliteConfig::File(path.into())) }

    pub fn memory() -> Self { Self::new(SqliteConfig::Memory) }

    fn create_connection(&self) -> Result<Connection, SqliteError> {
        let conn = match &self.config {
            SqliteConfig::File(path) => Connection::open(path)?,
            SqliteConfig::Memory => Connection::open_in_memory()?,
        };

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;
             PRAGMA cache_size=-64000;
             PRAGMA temp_store=MEMORY;",
        )?;

        Ok(conn)
    }
}

/// A pooled SQLite connection plus the handle used to abort its running statement.
pub struct PooledConnection {
    inner: Arc<Mutex<Connection>>,
    interrupt: Arc<InterruptHandle>,
}

impl PooledConnection {
    pub fn new(conn: Connection) -> Self {
        let interrupt = Arc::new(conn.get_interrupt_handle());
        Self { inner: Arc::new(Mutex::new(conn)), interrupt }
    }

    /// Runs `f` on the connection inside spawn_blocking.
    ///
    /// Dropping the returned future before it resolves interrupts whatever statement `f` is executing, or
    /// keeps `f` from starting at all if the blocking task has not reached the connection yet.
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T, SqliteError>
    where
        F: FnOnce(&Connection) -> Result<T, SqliteError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.inner.clone();
        let abandoned = Arc::new(AtomicBool::new(false));
        let mut guard = InterruptOnDrop { handle: Some(self.interrupt.clone()), abandoned: abandoned.clone() };
        let result = tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            // SQLite discards an interrupt that arrives while no statement is running
            if abandoned.load(Ordering::SeqCst) {
                return Err(SqliteError::Abandoned);
            }
            f(&conn)
        })
        .await;
        guard.disarm();
        result.map_err(|e| SqliteError::TaskJoin(e.to_string()))?
    }
}

impl Clone for PooledConnection {
    fn clone(&self) -> Self { Self { inner: self.inner.clone(), interrupt: self.interrupt.clone() } }
}

struct InterruptOnDrop {
    handle: Option<Arc<InterruptHandle>>,
    abandoned: Arc<AtomicBool>,
}

impl InterruptOnDrop {
    fn disarm(&mut self) { self.handle = None; }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::debug!("interrupting abandoned SQLite statement");
            self.abandoned.store(true, Ordering::SeqCst);
            handle.interrupt();
        }
    }
}

impl bb8::ManageConnection for SqliteConnectionManager {
    type Connection = PooledConnection;
    type Error = SqliteError;

    fn connect(&self) -> impl std::future::Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let config = self.config.clone();
        async move {
            let manager = SqliteConnectionManager::new(config);
            tokio::task::spawn_blocking(move || manager.create_connection().map(PooledConnection::new))
                .await
                .map_err(|e| SqliteError::TaskJoin(e.to_string()))?
        }
    }

    #[allow(refining_impl_trait)]
    fn is_valid<'a, 'b>(&'a self, conn: &'b mut Self::Connection) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send {
        let conn_inner = conn.inner.clone();
        async move {
            tokio::task::spawn_blocking(move || {
                let guard = conn_inner.blocking_lock();
                guard.execute_batch("SELECT 1").map_err(SqliteError::from)
            })
            .await
            .map_err(|e| SqliteError::TaskJoin(e.to_string()))?
        }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool { false }
}
