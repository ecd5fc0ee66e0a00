// Aggregate command

use crate::output::{print_field, print_table_header, print_table_row, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use runstats_core::config::{DEFAULT_OUTPUT_PREFIX, DEFAULT_RESULTS_DIR};
use runstats_core::{
    AggregateConfig, AggregationReport, Aggregator, DataSelection, ExportFormat, ExportOutcome,
    PromptClassifier,
};
use runstats_storage::SqliteResourceReader;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct AggregateArgs {
    /// Root of the config/timestamp/model result tree
    #[arg(long, env = "RUNSTATS_RESULTS_DIR", default_value = DEFAULT_RESULTS_DIR)]
    pub results_dir: PathBuf,

    /// Export file format
    #[arg(long, default_value = "csv", value_parser = ["csv", "json"])]
    pub format: String,

    /// Output path prefix (`_raw`/`_stats` and the extension are appended)
    #[arg(long, env = "RUNSTATS_OUTPUT_PREFIX", default_value = DEFAULT_OUTPUT_PREFIX)]
    pub output: String,

    /// Datasets to export
    #[arg(long, default_value = "both", value_parser = ["raw", "stats", "both"])]
    pub data_type: String,

    /// Prompts longer than this many characters are classified as long
    #[arg(long, default_value_t = PromptClassifier::DEFAULT_THRESHOLD)]
    pub prompt_threshold: usize,
}

impl AggregateArgs {
    pub fn to_config(&self) -> Result<AggregateConfig> {
        let format: ExportFormat = self.format.parse().map_err(anyhow::Error::msg)?;
        let data: DataSelection = self.data_type.parse().map_err(anyhow::Error::msg)?;

        Ok(AggregateConfig::new(&self.results_dir)
            .with_format(format)
            .with_output_prefix(self.output.as_str())
            .with_data(data)
            .with_classifier(PromptClassifier::length_threshold(
                self.prompt_threshold,
            )))
    }
}

#[derive(Debug, Serialize)]
struct FailureOutput {
    path: PathBuf,
    error: String,
}

#[derive(Debug, Serialize)]
struct ExportOutput {
    dataset: String,
    path: Option<PathBuf>,
    rows: usize,
}

#[derive(Debug, Serialize)]
struct AggregateOutput {
    results_dir: PathBuf,
    bundles: usize,
    records: usize,
    groups: usize,
    failures: Vec<FailureOutput>,
    exports: Vec<ExportOutput>,
}

impl AggregateOutput {
    fn new(config: &AggregateConfig, report: &AggregationReport) -> Self {
        Self {
            results_dir: config.results_dir.clone(),
            bundles: report.bundles,
            records: report.records.len(),
            groups: report.statistics.len(),
            failures: report
                .failures
                .iter()
                .map(|(path, e)| FailureOutput {
                    path: path.clone(),
                    error: e.to_string(),
                })
                .collect(),
            exports: report
                .exports
                .iter()
                .map(|(kind, outcome)| match outcome {
                    ExportOutcome::Written { path, rows } => ExportOutput {
                        dataset: kind.to_string(),
                        path: Some(path.clone()),
                        rows: *rows,
                    },
                    ExportOutcome::Skipped => ExportOutput {
                        dataset: kind.to_string(),
                        path: None,
                        rows: 0,
                    },
                })
                .collect(),
        }
    }
}

pub async fn run(args: AggregateArgs, output: OutputFormat, quiet: bool) -> Result<()> {
    let config = args.to_config()?;
    tracing::info!(
        results_dir = %config.results_dir.display(),
        format = %config.format,
        "Starting aggregation"
    );

    let aggregator = Aggregator::new(config, SqliteResourceReader::new());
    let report = aggregator
        .run()
        .await
        .context("Failed to export aggregated data")?;
    let summary = AggregateOutput::new(aggregator.config(), &report);

    if !output.is_text() {
        return output.print_value(&summary);
    }
    if quiet {
        return Ok(());
    }

    print_field("Results dir", &summary.results_dir.display().to_string());
    print_field("Bundles", &summary.bundles.to_string());
    print_field("Records", &summary.records.to_string());
    print_field("Groups", &summary.groups.to_string());
    print_field("Failures", &summary.failures.len().to_string());
    for export in &summary.exports {
        let target = match &export.path {
            Some(path) => format!("{} ({} rows)", path.display(), export.rows),
            None => "skipped".to_string(),
        };
        print_field(&format!("Export {}", export.dataset), &target);
    }

    if !report.statistics.is_empty() {
        println!();
        print_table_header(&[
            ("CONFIG", 24),
            ("COUNT", 6),
            ("PARALLEL", 8),
            ("PROMPT", 7),
            ("LATENCY AVG", 12),
            ("THROUGHPUT AVG", 14),
        ]);
        for group in &report.statistics {
            let mean = |name: &str| {
                group
                    .field(name)
                    .map(|s| format!("{:.3}", s.mean))
                    .unwrap_or_else(|| "-".to_string())
            };
            print_table_row(&[
                (&group.config, 24),
                (&group.count.to_string(), 6),
                (&group.parallel.to_string(), 8),
                (group.prompt_length.as_str(), 7),
                (&mean("latency"), 12),
                (&mean("output_throughput"), 14),
            ]);
        }
    }

    for failure in &summary.failures {
        eprintln!("Failed: {} ({})", failure.path.display(), failure.error);
    }

    Ok(())
}
