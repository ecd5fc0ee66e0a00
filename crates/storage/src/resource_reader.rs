// Database-backed ResourceReader implementation
//
// Opens the store, runs the memory aggregate query, and closes the pool
// before returning. No connection outlives a single bundle.

use async_trait::async_trait;
use runstats_core::{ResourceMetrics, ResourceReader, Result};
use std::path::Path;

use crate::repositories::ResourceDatabase;

/// Reads GPU memory aggregates from evalscope's SQLite store
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteResourceReader;

impl SqliteResourceReader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResourceReader for SqliteResourceReader {
    async fn read_memory(&self, store_path: &Path) -> Result<ResourceMetrics> {
        let db = ResourceDatabase::open(store_path).await?;
        let usage = db.memory_usage().await;
        db.close().await;

        let metrics = ResourceMetrics::from(usage?);
        tracing::debug!(
            path = %store_path.display(),
            avg = metrics.avg_gpu_memory,
            max = metrics.max_gpu_memory,
            min = metrics.min_gpu_memory,
            "Read resource store"
        );
        Ok(metrics)
    }
}
