// End-to-end aggregation run
//
// collect bundles → normalize → (raw rows) → group + statistics → (stats rows) → export

use crate::collector::collect_bundles;
use crate::config::AggregateConfig;
use crate::error::{AggregateError, Result};
use crate::export::{export_rows, DataKind, ExportOutcome};
use crate::normalizer::{collect_records, RecordNormalizer};
use crate::record::{Row, RunRecord};
use crate::stats::{compute_statistics, GroupStatistics};
use crate::traits::ResourceReader;
use std::path::PathBuf;

/// What an aggregation run produced
#[derive(Debug, Default)]
pub struct AggregationReport {
    pub bundles: usize,
    pub records: Vec<RunRecord>,
    pub statistics: Vec<GroupStatistics>,
    pub failures: Vec<(PathBuf, AggregateError)>,
    pub exports: Vec<(DataKind, ExportOutcome)>,
}

impl AggregationReport {
    /// No bundle produced a record
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Drives one aggregation run with a given resource reader
pub struct Aggregator<R> {
    config: AggregateConfig,
    normalizer: RecordNormalizer<R>,
}

impl<R: ResourceReader> Aggregator<R> {
    pub fn new(config: AggregateConfig, resources: R) -> Self {
        let normalizer = RecordNormalizer::new(resources).with_classifier(config.classifier);
        Self { config, normalizer }
    }

    pub fn config(&self) -> &AggregateConfig {
        &self.config
    }

    /// Collect and normalize without exporting
    pub async fn collect(&self) -> AggregationReport {
        let bundles = collect_bundles(&self.config.results_dir);
        let collection = collect_records(&bundles, &self.normalizer).await;
        let statistics = compute_statistics(&collection.records);

        AggregationReport {
            bundles: bundles.len(),
            records: collection.records,
            statistics,
            failures: collection.failures,
            exports: Vec::new(),
        }
    }

    /// Collect, then export the selected datasets.
    ///
    /// An empty collection skips exporting entirely.
    pub async fn run(&self) -> Result<AggregationReport> {
        let mut report = self.collect().await;

        if report.is_empty() {
            tracing::warn!(
                results_dir = %self.config.results_dir.display(),
                "No benchmark records found, nothing to export"
            );
            return Ok(report);
        }

        for kind in [DataKind::Raw, DataKind::Stats] {
            if !self.config.data.includes(kind) {
                continue;
            }
            let rows = dataset_rows(&report, kind);
            let path = self.config.output_path(kind);
            let outcome = export_rows(&rows, &path, self.config.format)?;
            report.exports.push((kind, outcome));
        }

        Ok(report)
    }
}

/// Export rows for one dataset
pub fn dataset_rows(report: &AggregationReport, kind: DataKind) -> Vec<Row> {
    match kind {
        DataKind::Raw => report.records.iter().map(RunRecord::to_row).collect(),
        DataKind::Stats => report
            .statistics
            .iter()
            .map(GroupStatistics::to_row)
            .collect(),
    }
}
