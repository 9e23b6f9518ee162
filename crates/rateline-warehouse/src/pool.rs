//! Connections sharing one embedded `DuckDB` instance.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ::duckdb::Connection;
use tracing::debug;

use crate::WarehouseError;

/// Hands out connections to a single database instance.
///
/// Every connection is cloned from the one opened by [`ConnectionPool::open`],
/// so tables seeded through one connection are visible to all others. Up to
/// `max_idle` returned connections are kept for reuse.
#[derive(Clone)]
pub struct ConnectionPool {
    shared: Arc<Shared>,
}

struct Shared {
    db_path: PathBuf,
    root: Mutex<Connection>,
    idle: Mutex<Vec<Connection>>,
    max_idle: usize,
}

impl ConnectionPool {
    pub fn open(path: impl Into<PathBuf>, max_idle: usize) -> Result<Self, WarehouseError> {
        let db_path = path.into();
        let root = Connection::open(&db_path)?;
        debug!(path = %db_path.display(), max_idle, "opened local warehouse database");

        Ok(Self {
            shared: Arc::new(Shared {
                db_path,
                root: Mutex::new(root),
                idle: Mutex::new(Vec::new()),
                max_idle,
            }),
        })
    }

    pub fn acquire(&self) -> Result<PooledConnection, WarehouseError> {
        let reused = self
            .shared
            .idle
            .lock()
            .map_err(|_| WarehouseError::PoolPoisoned)?
            .pop();

        let connection = match reused {
            Some(connection) => connection,
            None => self
                .shared
                .root
                .lock()
                .map_err(|_| WarehouseError::PoolPoisoned)?
                .try_clone()?,
        };

        Ok(PooledConnection {
            connection: Some(connection),
            shared: Arc::clone(&self.shared),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.shared.db_path
    }

    fn idle_len(&self) -> usize {
        self.shared.idle.lock().map_or(0, |idle| idle.len())
    }
}

/// A connection that goes back to the pool when dropped.
pub struct PooledConnection {
    connection: Option<Connection>,
    shared: Arc<Shared>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("connection is only taken on drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };
        if let Ok(mut idle) = self.shared.idle.lock() {
            if idle.len() < self.shared.max_idle {
                idle.push(connection);
            }
        }
    }
}
