// In-memory ResourceReader implementations
//
// Used by tests and by callers that want to skip the SQLite store entirely.

use crate::error::{AggregateError, Result};
use crate::record::ResourceMetrics;
use crate::traits::ResourceReader;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Reader that never finds resource data
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResourceReader;

#[async_trait]
impl ResourceReader for NoopResourceReader {
    async fn read_memory(&self, store_path: &Path) -> Result<ResourceMetrics> {
        Err(AggregateError::store(format!(
            "resource reading disabled for {}",
            store_path.display()
        )))
    }
}

/// Reader backed by a map of store path → metrics, recording every lookup
#[derive(Debug, Default)]
pub struct InMemoryResourceReader {
    metrics: HashMap<PathBuf, ResourceMetrics>,
    reads: Mutex<Vec<PathBuf>>,
}

impl InMemoryResourceReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register metrics for a store path
    pub fn with_metrics(
        mut self,
        store_path: impl Into<PathBuf>,
        metrics: ResourceMetrics,
    ) -> Self {
        self.metrics.insert(store_path.into(), metrics);
        self
    }

    /// Paths that were read, in call order
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads
            .lock()
            .map(|reads| reads.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResourceReader for InMemoryResourceReader {
    async fn read_memory(&self, store_path: &Path) -> Result<ResourceMetrics> {
        if let Ok(mut reads) = self.reads.lock() {
            reads.push(store_path.to_path_buf());
        }
        self.metrics
            .get(store_path)
            .copied()
            .ok_or_else(|| AggregateError::store(format!("no table in {}", store_path.display())))
    }
}
