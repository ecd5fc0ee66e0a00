// Database models

use runstats_core::ResourceMetrics;
use sqlx::FromRow;

// ============================================
// Resource usage
// ============================================

/// Aggregates over `result.max_gpu_memory_cost`. All NULL for an empty table.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct MemoryUsageRow {
    pub avg_memory: Option<f64>,
    pub max_memory: Option<f64>,
    pub min_memory: Option<f64>,
}

impl From<MemoryUsageRow> for ResourceMetrics {
    fn from(row: MemoryUsageRow) -> Self {
        ResourceMetrics {
            avg_gpu_memory: row.avg_memory.unwrap_or(0.0),
            max_gpu_memory: row.max_memory.unwrap_or(0.0),
            min_gpu_memory: row.min_memory.unwrap_or(0.0),
        }
    }
}
