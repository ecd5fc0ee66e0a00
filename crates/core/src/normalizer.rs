// Bundle → RunRecord normalization
//
// One bundle produces exactly one record or one error. Optional artifacts
// never fail a bundle: a bad percentile table is logged and treated as absent,
// an unreadable resource store is logged and reads as zero memory usage.

use crate::artifacts::{
    read_percentiles, read_required, ArgsArtifact, SummaryArtifact, ARGS_FILE, PERCENTILE_FILE,
    RESOURCE_DB_FILE, SUMMARY_FILE,
};
use crate::collector::Bundle;
use crate::error::{AggregateError, Result};
use crate::prompt::{PromptClass, PromptClassifier};
use crate::record::{PercentileMetrics, ResourceMetrics, RunMetrics, RunRecord};
use crate::traits::ResourceReader;
use std::path::PathBuf;

/// Turns bundles into run records
pub struct RecordNormalizer<R> {
    resources: R,
    classifier: PromptClassifier,
}

impl<R: ResourceReader> RecordNormalizer<R> {
    pub fn new(resources: R) -> Self {
        Self {
            resources,
            classifier: PromptClassifier::default(),
        }
    }

    /// Override the prompt classification strategy
    pub fn with_classifier(mut self, classifier: PromptClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Normalize one bundle
    pub async fn normalize(&self, bundle: &Bundle) -> Result<RunRecord> {
        let summary: SummaryArtifact = read_required(&bundle.artifact(SUMMARY_FILE))?;
        let args: ArgsArtifact = read_required(&bundle.artifact(ARGS_FILE))?;

        let percentiles = self.read_percentiles(bundle);
        let resources = self.read_resources(bundle).await;

        let prompt = args.prompt.as_deref().unwrap_or_default();
        let prompt_length = self
            .classifier
            .classify(prompt)
            .unwrap_or(PromptClass::Short);

        Ok(RunRecord {
            config: bundle.config.clone(),
            timestamp: bundle.timestamp.clone(),
            model: args.model.unwrap_or_else(|| bundle.model_dir.clone()),
            parallel: args.parallel.unwrap_or(0),
            prompt_length,
            max_tokens: args.max_tokens.unwrap_or(0),
            metrics: summary_metrics(&summary),
            resources,
            percentiles,
        })
    }

    fn read_percentiles(&self, bundle: &Bundle) -> PercentileMetrics {
        let path = bundle.artifact(PERCENTILE_FILE);
        if !path.is_file() {
            return PercentileMetrics::new();
        }
        match read_percentiles(&path) {
            Ok(metrics) => metrics,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable percentile table");
                PercentileMetrics::new()
            }
        }
    }

    async fn read_resources(&self, bundle: &Bundle) -> Option<ResourceMetrics> {
        let path = bundle.artifact(RESOURCE_DB_FILE);
        if !path.is_file() {
            return None;
        }
        match self.resources.read_memory(&path).await {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot read resource store, using zeros");
                Some(ResourceMetrics::default())
            }
        }
    }
}

fn summary_metrics(summary: &SummaryArtifact) -> RunMetrics {
    let or_zero = |v: Option<f64>| v.unwrap_or(0.0);
    RunMetrics {
        requests: or_zero(summary.total_requests).max(0.0).round() as u64,
        time_taken: or_zero(summary.time_taken),
        output_throughput: or_zero(summary.output_throughput),
        total_throughput: or_zero(summary.total_throughput),
        request_throughput: or_zero(summary.request_throughput),
        latency: or_zero(summary.latency),
        ttft: or_zero(summary.ttft),
        token_latency: or_zero(summary.token_latency),
        inter_token_latency: or_zero(summary.inter_token_latency),
        input_tokens: or_zero(summary.input_tokens),
        output_tokens: or_zero(summary.output_tokens),
    }
}

/// Records that normalized, plus the bundles that failed
#[derive(Debug, Default)]
pub struct Collection {
    pub records: Vec<RunRecord>,
    pub failures: Vec<(PathBuf, AggregateError)>,
}

impl Collection {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Normalize every bundle, continuing past per-bundle failures
pub async fn collect_records<R: ResourceReader>(
    bundles: &[Bundle],
    normalizer: &RecordNormalizer<R>,
) -> Collection {
    let mut collection = Collection::default();

    for bundle in bundles {
        match normalizer.normalize(bundle).await {
            Ok(record) => {
                tracing::info!(bundle = %bundle.label(), "Processed bundle");
                collection.records.push(record);
            }
            Err(e) => {
                tracing::error!(path = %bundle.path.display(), error = %e, "Failed to process bundle");
                collection.failures.push((bundle.path.clone(), e));
            }
        }
    }

    tracing::info!(
        records = collection.records.len(),
        failures = collection.failures.len(),
        "Collected raw records"
    );
    collection
}
