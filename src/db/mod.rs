use crate::error::{Mir2GraphError, Result};
use rusqlite::Connection;
use std::path::Path;
use tokio::task;

pub mod schema;

/// Database connection wrapper
pub struct Db {
    path: std::path::PathBuf,
}

impl Db {
    /// Create a new database connection manager
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Open a new database connection with the pragmas the loader relies on
    pub fn open_connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).map_err(Mir2GraphError::Database)?;

        // WAL mode for better concurrency, NORMAL sync for speed,
        // foreign keys for referential integrity of relationships
        conn.execute_batch(
            "PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON;",
        )?;

        Ok(conn)
    }

    /// Execute a closure with a database connection in a blocking task
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        task::spawn_blocking(move || {
            let mut conn = Connection::open(&path).map_err(Mir2GraphError::Database)?;

            conn.execute_batch(
                "PRAGMA journal_mode = WAL; \
                 PRAGMA synchronous = NORMAL; \
                 PRAGMA foreign_keys = ON;",
            )?;

            f(&mut conn)
        })
        .await
        .map_err(|e| {
            Mir2GraphError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("database task failed: {e}"),
            ))
        })?
    }
}
