// Pluggable backends for the aggregation pipeline
//
// The normalizer only knows that a bundle may carry a resource store file;
// reading it is delegated so the core stays free of database drivers.

use crate::error::Result;
use crate::record::ResourceMetrics;
use async_trait::async_trait;
use std::path::Path;

/// Reads aggregated memory usage from a bundle's resource store
#[async_trait]
pub trait ResourceReader: Send + Sync {
    /// Aggregate avg/max/min memory cost over every stored request
    async fn read_memory(&self, store_path: &Path) -> Result<ResourceMetrics>;
}

#[async_trait]
impl<T: ResourceReader + ?Sized> ResourceReader for std::sync::Arc<T> {
    async fn read_memory(&self, store_path: &Path) -> Result<ResourceMetrics> {
        (**self).read_memory(store_path).await
    }
}
