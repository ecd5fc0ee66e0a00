// Bundle artifact formats
//
// evalscope perf writes one directory per run containing:
// - benchmark_summary.json     (required) flat map of "Human readable key": number
// - benchmark_args.json        (required) the run arguments
// - benchmark_percentile.json  (optional) list of rows keyed by "Percentiles"
// - benchmark_data.db          (optional) SQLite store with per-request results

use crate::error::{AggregateError, Result};
use crate::naming::percentile_key;
use crate::record::PercentileMetrics;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::path::Path;

pub const SUMMARY_FILE: &str = "benchmark_summary.json";
pub const ARGS_FILE: &str = "benchmark_args.json";
pub const PERCENTILE_FILE: &str = "benchmark_percentile.json";
pub const RESOURCE_DB_FILE: &str = "benchmark_data.db";

/// Label column of the percentile table
pub const PERCENTILE_LABEL_COLUMN: &str = "Percentiles";

/// Summary metrics; absent, null or non-numeric entries read as zero
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryArtifact {
    #[serde(
        rename = "Total requests",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub total_requests: Option<f64>,

    #[serde(
        rename = "Time taken for tests (s)",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub time_taken: Option<f64>,

    #[serde(
        rename = "Output token throughput (tok/s)",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub output_throughput: Option<f64>,

    #[serde(
        rename = "Total token throughput (tok/s)",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub total_throughput: Option<f64>,

    #[serde(
        rename = "Request throughput (req/s)",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub request_throughput: Option<f64>,

    #[serde(
        rename = "Average latency (s)",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub latency: Option<f64>,

    #[serde(
        rename = "Average time to first token (s)",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub ttft: Option<f64>,

    #[serde(
        rename = "Average time per output token (s)",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub token_latency: Option<f64>,

    #[serde(
        rename = "Average inter-token latency (s)",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub inter_token_latency: Option<f64>,

    #[serde(
        rename = "Average input tokens per request",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub input_tokens: Option<f64>,

    #[serde(
        rename = "Average output tokens per request",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub output_tokens: Option<f64>,
}

/// Run arguments; only the fields the aggregator uses.
///
/// Counts accept floats and numeric strings; negatives clamp to zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArgsArtifact {
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: Option<String>,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub parallel: Option<u64>,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub max_tokens: Option<u64>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub prompt: Option<String>,
}

// ============================================
// Lenient field parsing
// ============================================

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number).filter(|n| n.is_finite()))
}

fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    Ok(value.map(|n| n.max(0.0).round() as u64))
}

/// Strings as-is; other non-null values as their JSON text
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Read and deserialize a JSON artifact
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|e| AggregateError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| AggregateError::parse(path, e))
}

/// Read a required artifact, mapping a missing file to `MissingArtifact`
pub fn read_required<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(AggregateError::MissingArtifact(path.to_path_buf()));
    }
    read_json(path)
}

/// Read the optional percentile table and flatten it to canonical keys
pub fn read_percentiles(path: &Path) -> Result<PercentileMetrics> {
    let rows: Vec<Map<String, Value>> = read_json(path)?;
    Ok(flatten_percentile_rows(&rows))
}

/// Flatten percentile rows into `{label}_{metric}` keys.
///
/// Rows without a label and non-numeric cells are skipped.
pub fn flatten_percentile_rows(rows: &[Map<String, Value>]) -> PercentileMetrics {
    let mut metrics = PercentileMetrics::new();
    for row in rows {
        let Some(label) = row.get(PERCENTILE_LABEL_COLUMN).and_then(Value::as_str) else {
            tracing::debug!("Skipping percentile row without a label");
            continue;
        };
        for (column, value) in row {
            if column == PERCENTILE_LABEL_COLUMN {
                continue;
            }
            if let Some(number) = value.as_f64() {
                metrics.insert(percentile_key(label, column), number);
            }
        }
    }
    metrics
}
