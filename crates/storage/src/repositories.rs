// Repository layer for the per-bundle resource store
//
// evalscope writes one benchmark_data.db per run. Only the `result` table is
// read, and only through a read-only connection.

use crate::models::MemoryUsageRow;
use runstats_core::AggregateError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the resource store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot open resource store {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("resource query failed on {path}: {source}")]
    Query {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl From<StorageError> for AggregateError {
    fn from(e: StorageError) -> Self {
        AggregateError::store(e.to_string())
    }
}

// CAST keeps the column type REAL when the store holds integer costs
const MEMORY_USAGE_QUERY: &str = r#"
    SELECT
        CAST(AVG(max_gpu_memory_cost) AS REAL) AS avg_memory,
        CAST(MAX(max_gpu_memory_cost) AS REAL) AS max_memory,
        CAST(MIN(max_gpu_memory_cost) AS REAL) AS min_memory
    FROM result
"#;

#[derive(Clone)]
pub struct ResourceDatabase {
    pool: SqlitePool,
    path: PathBuf,
}

impl ResourceDatabase {
    /// Open an existing store read-only
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(path).read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|source| StorageError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ============================================
    // Resource usage
    // ============================================

    pub async fn memory_usage(&self) -> Result<MemoryUsageRow> {
        sqlx::query_as::<_, MemoryUsageRow>(MEMORY_USAGE_QUERY)
            .fetch_one(&self.pool)
            .await
            .map_err(|source| StorageError::Query {
                path: self.path.clone(),
                source,
            })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
