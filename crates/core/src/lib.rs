// Benchmark Result Aggregation
//
// This crate turns a directory of evalscope perf result bundles into run
// records and per-configuration statistics.
//
// Key design decisions:
// - Pipeline stages are plain functions/structs: collector → normalizer → grouper → stats → export
// - Run records are typed; optional data (resource metrics, percentiles) is explicit
// - Percentile columns are discovered per group in a separate pass before summarizing
// - The SQLite resource store is read through the ResourceReader trait (see runstats-storage)
// - Per-bundle failures are collected, never fatal to the run

pub mod aggregator;
pub mod artifacts;
pub mod collector;
pub mod config;
pub mod error;
pub mod export;
pub mod grouper;
pub mod import;
pub mod naming;
pub mod normalizer;
pub mod prompt;
pub mod record;
pub mod stats;
pub mod traits;

// In-memory implementations for examples and testing
pub mod memory;

// Re-exports for convenience
pub use aggregator::{dataset_rows, AggregationReport, Aggregator};
pub use collector::{collect_bundles, Bundle};
pub use config::AggregateConfig;
pub use error::{AggregateError, Result};
pub use export::{export_rows, output_path, DataKind, DataSelection, ExportFormat, ExportOutcome};
pub use grouper::{group_by_config, RecordGroup};
pub use import::read_rows;
pub use naming::percentile_key;
pub use normalizer::{collect_records, Collection, RecordNormalizer};
pub use prompt::{PromptClass, PromptClassifier};
pub use record::{
    CoreField, PercentileMetrics, ResourceMetrics, Row, RunMetrics, RunRecord, TrackedField,
};
pub use stats::{compute_statistics, tracked_fields, GroupStatistics, Summary};
pub use traits::ResourceReader;
