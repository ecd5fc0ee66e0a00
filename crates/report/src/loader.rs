// Report data loading
//
// Accepts any of the three row shapes the pipeline produces:
// - raw exports (one row per run: config, requests, latency, ...)
// - stats exports (one row per config: count, latency_avg, ...)
// - chart-ready rows (qps, avg_latency_ms, ...) from other tools
//
// Every shape is adapted into ReportRow. Lookups of `X` fall back to `X_avg`
// so stats exports render with their mean values.

use crate::error::{ReportError, Result};
use runstats_core::export::csv_cell;
use runstats_core::{read_rows, Row};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Which producer a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataShape {
    /// Per-config statistics (`config` + `count`)
    Stats,
    /// Already chart-ready (`qps`)
    Chart,
    /// Per-run records
    Raw,
}

impl DataShape {
    pub fn detect(row: &Row) -> Self {
        if row.contains_key("config") && row.contains_key("count") {
            DataShape::Stats
        } else if row.contains_key("qps") {
            DataShape::Chart
        } else {
            DataShape::Raw
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataShape::Stats => "stats",
            DataShape::Chart => "chart",
            DataShape::Raw => "raw",
        }
    }
}

/// Success/error information for a row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Reliability {
    /// The source carried a success rate
    Measured { success_rate: f64, error_rate: f64 },
    /// No success data; displayed as an assumed 100% / 0%
    Unknown,
}

impl Reliability {
    pub fn success_rate(&self) -> f64 {
        match self {
            Reliability::Measured { success_rate, .. } => *success_rate,
            Reliability::Unknown => 100.0,
        }
    }

    pub fn error_rate(&self) -> f64 {
        match self {
            Reliability::Measured { error_rate, .. } => *error_rate,
            Reliability::Unknown => 0.0,
        }
    }

    pub fn is_assumed(&self) -> bool {
        matches!(self, Reliability::Unknown)
    }
}

/// One chart/table row. Latency fields carry whatever unit the source used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub test_name: String,
    pub parallel: u64,
    pub num_requests: u64,
    pub qps: f64,
    pub output_token_throughput: f64,
    pub avg_latency_ms: f64,
    pub avg_ttft_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub reliability: Reliability,
}

impl ReportRow {
    pub fn success_rate(&self) -> f64 {
        self.reliability.success_rate()
    }

    pub fn error_rate(&self) -> f64 {
        self.reliability.error_rate()
    }
}

// ============================================
// Field adaptation
// ============================================

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `key`, falling back to `{key}_avg`
fn lookup(row: &Row, key: &str) -> Option<f64> {
    row.get(key)
        .and_then(numeric)
        .or_else(|| row.get(&format!("{}_avg", key)).and_then(numeric))
}

/// First key in `keys` that yields a number
fn first_of(row: &Row, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| lookup(row, key))
}

fn count(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

fn test_name(row: &Row, parallel: u64) -> String {
    ["test_name", "config"]
        .iter()
        .filter_map(|key| row.get(*key))
        .map(csv_cell)
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| format!("test_{}", parallel))
}

fn qps(row: &Row) -> f64 {
    if let Some(qps) = first_of(row, &["qps", "request_throughput"]) {
        return qps;
    }
    match (lookup(row, "requests"), lookup(row, "time_taken")) {
        (Some(requests), Some(time_taken)) if time_taken > 0.0 => requests / time_taken,
        _ => 0.0,
    }
}

fn percentile_latency(row: &Row, percentile: u8, average: f64) -> f64 {
    let keys = [
        format!("p{}_latency_ms", percentile),
        format!("p{}_latency", percentile),
        format!("{}p_latency_", percentile),
    ];
    keys.iter()
        .find_map(|key| lookup(row, key))
        .unwrap_or(average)
}

fn reliability(row: &Row) -> Reliability {
    match lookup(row, "success_rate") {
        Some(success_rate) => Reliability::Measured {
            success_rate,
            error_rate: lookup(row, "error_rate").unwrap_or(100.0 - success_rate),
        },
        None => Reliability::Unknown,
    }
}

/// Adapt one loaded row of any shape into a ReportRow
pub fn adapt_row(row: &Row) -> ReportRow {
    let parallel = lookup(row, "parallel").map(count).unwrap_or(0);
    let avg_latency_ms = first_of(row, &["avg_latency_ms", "latency"]).unwrap_or(0.0);

    ReportRow {
        test_name: test_name(row, parallel),
        parallel,
        num_requests: first_of(row, &["num_requests", "requests"])
            .map(count)
            .unwrap_or(0),
        qps: qps(row),
        output_token_throughput: first_of(row, &["output_token_throughput", "output_throughput"])
            .unwrap_or(0.0),
        avg_latency_ms,
        avg_ttft_ms: first_of(row, &["avg_ttft_ms", "ttft"]).unwrap_or(0.0),
        p50_latency_ms: percentile_latency(row, 50, avg_latency_ms),
        p95_latency_ms: percentile_latency(row, 95, avg_latency_ms),
        p99_latency_ms: percentile_latency(row, 99, avg_latency_ms),
        reliability: reliability(row),
    }
}

// ============================================
// Loading
// ============================================

/// A loaded, adapted report dataset
#[derive(Debug, Clone)]
pub struct ReportData {
    pub source: PathBuf,
    pub shape: DataShape,
    /// Source columns of the first row
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl ReportData {
    /// File name of the source, for display
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Check that `path` is an existing file. Unexpected extensions only warn.
pub fn validate_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ReportError::InputNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ReportError::NotAFile(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    if !matches!(extension.as_deref(), Some("csv") | Some("json")) {
        tracing::warn!(path = %path.display(), "Input is not a .csv or .json file, reading as CSV");
    }
    Ok(())
}

/// Load and adapt a CSV or JSON export. Empty input is an error.
pub fn load_rows(path: &Path) -> Result<ReportData> {
    validate_input(path)?;
    tracing::info!(path = %path.display(), "Loading report data");

    let rows = read_rows(path)?;
    let Some(first) = rows.first() else {
        return Err(ReportError::EmptyData(path.to_path_buf()));
    };

    let shape = DataShape::detect(first);
    let columns = first.keys().cloned().collect();
    let rows: Vec<ReportRow> = rows.iter().map(adapt_row).collect();

    tracing::info!(records = rows.len(), shape = shape.as_str(), "Loaded report data");
    Ok(ReportData {
        source: path.to_path_buf(),
        shape,
        columns,
        rows,
    })
}

/// File and dataset details shown by `report --info`
#[derive(Debug, Clone, Serialize)]
pub struct DataInfo {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
    pub record_count: usize,
    pub shape: DataShape,
    pub columns: Vec<String>,
}

impl DataInfo {
    pub fn from_data(data: &ReportData) -> Result<Self> {
        let metadata = fs::metadata(&data.source).map_err(|e| ReportError::io(&data.source, e))?;
        let path = fs::canonicalize(&data.source).unwrap_or_else(|_| data.source.clone());

        Ok(Self {
            path,
            name: data.source_name(),
            size_bytes: metadata.len(),
            record_count: data.len(),
            shape: data.shape,
            columns: data.columns.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_detect_shape() {
        assert_eq!(
            DataShape::detect(&row(json!({"config": "c", "count": 2}))),
            DataShape::Stats
        );
        assert_eq!(DataShape::detect(&row(json!({"qps": 1.0}))), DataShape::Chart);
        assert_eq!(
            DataShape::detect(&row(json!({"config": "c", "requests": 10}))),
            DataShape::Raw
        );
    }

    #[test]
    fn test_adapt_raw_row() {
        let adapted = adapt_row(&row(json!({
            "config": "p4_short",
            "parallel": 4,
            "requests": 100,
            "time_taken": 10.0,
            "output_throughput": 512.0,
            "latency": 1.25,
            "ttft": 0.2,
            "p95_latency": 2.0
        })));

        assert_eq!(adapted.test_name, "p4_short");
        assert_eq!(adapted.parallel, 4);
        assert_eq!(adapted.num_requests, 100);
        assert_eq!(adapted.qps, 10.0);
        assert_eq!(adapted.output_token_throughput, 512.0);
        assert_eq!(adapted.avg_latency_ms, 1.25);
        assert_eq!(adapted.avg_ttft_ms, 0.2);
        assert_eq!(adapted.p95_latency_ms, 2.0);
        // No percentile data: falls back to the average latency
        assert_eq!(adapted.p50_latency_ms, 1.25);
        assert_eq!(adapted.p99_latency_ms, 1.25);
        assert_eq!(adapted.reliability, Reliability::Unknown);
    }

    #[test]
    fn test_adapt_prefers_request_throughput() {
        let adapted = adapt_row(&row(json!({
            "request_throughput": 7.5,
            "requests": 100,
            "time_taken": 10.0
        })));
        assert_eq!(adapted.qps, 7.5);
    }

    #[test]
    fn test_adapt_zero_time_taken() {
        let adapted = adapt_row(&row(json!({"requests": 100, "time_taken": 0})));
        assert_eq!(adapted.qps, 0.0);

        let adapted = adapt_row(&row(json!({"requests": 100})));
        assert_eq!(adapted.qps, 0.0);
    }

    #[test]
    fn test_adapt_missing_name_uses_parallel() {
        let adapted = adapt_row(&row(json!({"parallel": 16})));
        assert_eq!(adapted.test_name, "test_16");

        let adapted = adapt_row(&row(json!({})));
        assert_eq!(adapted.test_name, "test_0");
        assert_eq!(adapted.parallel, 0);
    }

    #[test]
    fn test_adapt_stats_row_uses_averages() {
        let adapted = adapt_row(&row(json!({
            "config": "p8_long",
            "count": 3,
            "parallel": 8,
            "request_throughput_avg": 4.0,
            "latency_avg": 2.5,
            "ttft_avg": 0.5,
            "output_throughput_avg": 300.0,
            "p99_latency_avg": 6.0
        })));

        assert_eq!(adapted.test_name, "p8_long");
        assert_eq!(adapted.qps, 4.0);
        assert_eq!(adapted.avg_latency_ms, 2.5);
        assert_eq!(adapted.avg_ttft_ms, 0.5);
        assert_eq!(adapted.output_token_throughput, 300.0);
        assert_eq!(adapted.p99_latency_ms, 6.0);
        assert_eq!(adapted.p95_latency_ms, 2.5);
    }

    #[test]
    fn test_adapt_legacy_percentile_names() {
        let adapted = adapt_row(&row(json!({
            "latency": 1.0,
            "50p_latency_": 0.9,
            "95p_latency_": 1.8,
            "99p_latency_": 2.7
        })));
        assert_eq!(adapted.p50_latency_ms, 0.9);
        assert_eq!(adapted.p95_latency_ms, 1.8);
        assert_eq!(adapted.p99_latency_ms, 2.7);
    }

    #[test]
    fn test_adapt_chart_row_keeps_fields() {
        let adapted = adapt_row(&row(json!({
            "test_name": "short_p2",
            "parallel": "2",
            "num_requests": 50,
            "qps": 3.5,
            "avg_latency_ms": 120.0,
            "p95_latency_ms": 180.0,
            "success_rate": 96.0
        })));
        assert_eq!(adapted.test_name, "short_p2");
        assert_eq!(adapted.parallel, 2);
        assert_eq!(adapted.num_requests, 50);
        assert_eq!(adapted.qps, 3.5);
        assert_eq!(adapted.p95_latency_ms, 180.0);
        assert_eq!(
            adapted.reliability,
            Reliability::Measured {
                success_rate: 96.0,
                error_rate: 4.0
            }
        );
    }

    #[test]
    fn test_unknown_reliability_is_assumed() {
        let unknown = Reliability::Unknown;
        assert!(unknown.is_assumed());
        assert_eq!(unknown.success_rate(), 100.0);
        assert_eq!(unknown.error_rate(), 0.0);

        let measured = Reliability::Measured {
            success_rate: 90.0,
            error_rate: 2.0,
        };
        assert!(!measured.is_assumed());
        assert_eq!(measured.error_rate(), 2.0);
    }

    #[test]
    fn test_validate_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            validate_input(&missing),
            Err(ReportError::InputNotFound(_))
        ));
        assert!(matches!(
            validate_input(dir.path()),
            Err(ReportError::NotAFile(_))
        ));

        let odd = dir.path().join("data.txt");
        fs::write(&odd, "a,b\n1,2\n").unwrap();
        assert!(validate_input(&odd).is_ok());
    }

    #[test]
    fn test_load_rows_empty_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "config,requests\n").unwrap();
        assert!(matches!(load_rows(&path), Err(ReportError::EmptyData(_))));
    }

    #[test]
    fn test_load_rows_and_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary_stats.json");
        fs::write(
            &path,
            json!([
                {"config": "p4_short", "count": 2, "parallel": 4, "latency_avg": 1.0},
                {"config": "p8_short", "count": 2, "parallel": 8, "latency_avg": 2.0}
            ])
            .to_string(),
        )
        .unwrap();

        let data = load_rows(&path).unwrap();
        assert_eq!(data.shape, DataShape::Stats);
        assert_eq!(data.len(), 2);
        assert_eq!(data.columns, vec!["config", "count", "parallel", "latency_avg"]);
        assert_eq!(data.source_name(), "summary_stats.json");

        let info = DataInfo::from_data(&data).unwrap();
        assert_eq!(info.name, "summary_stats.json");
        assert_eq!(info.record_count, 2);
        assert_eq!(info.size_bytes, fs::metadata(&path).unwrap().len());
        assert!(info.path.is_absolute());
    }
}
