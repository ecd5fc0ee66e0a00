// Row export to CSV or JSON
//
// Both formats take the same ordered rows. CSV columns are the first row's
// keys followed by any later keys in first-seen order; JSON is the row list
// as-is.

use crate::error::{AggregateError, Result};
use crate::record::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Row-oriented text with a header line
    #[default]
    Csv,
    /// Pretty-printed array of objects
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Which dataset an export holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Raw,
    Stats,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Raw => "raw",
            DataKind::Stats => "stats",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which datasets to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSelection {
    Raw,
    Stats,
    #[default]
    Both,
}

impl DataSelection {
    pub fn includes(&self, kind: DataKind) -> bool {
        matches!(
            (self, kind),
            (DataSelection::Both, _)
                | (DataSelection::Raw, DataKind::Raw)
                | (DataSelection::Stats, DataKind::Stats)
        )
    }
}

impl FromStr for DataSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(DataSelection::Raw),
            "stats" => Ok(DataSelection::Stats),
            "both" => Ok(DataSelection::Both),
            other => Err(format!("unknown data type: {}", other)),
        }
    }
}

/// `{prefix}_{raw|stats}.{csv|json}`
pub fn output_path(prefix: &str, kind: DataKind, format: ExportFormat) -> PathBuf {
    PathBuf::from(format!("{}_{}.{}", prefix, kind, format.extension()))
}

/// Result of an export call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, rows: usize },
    /// Nothing to export; no file was created
    Skipped,
}

/// Write `rows` to `path` in `format`. Empty input writes nothing.
pub fn export_rows(rows: &[Row], path: &Path, format: ExportFormat) -> Result<ExportOutcome> {
    if rows.is_empty() {
        tracing::warn!(path = %path.display(), "No data to export");
        return Ok(ExportOutcome::Skipped);
    }

    match format {
        ExportFormat::Csv => write_csv(rows, path)?,
        ExportFormat::Json => write_json(rows, path)?,
    }

    tracing::info!(path = %path.display(), rows = rows.len(), %format, "Exported data");
    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        rows: rows.len(),
    })
}

/// Union of row keys: first row's order, then new keys as they appear
pub fn csv_header(rows: &[Row]) -> Vec<&str> {
    let mut seen: HashSet<&str> = HashSet::new();
    rows.iter()
        .flat_map(|row| row.keys())
        .map(String::as_str)
        .filter(|key| seen.insert(*key))
        .collect()
}

fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    let header = csv_header(rows);
    let mut writer = csv::Writer::from_path(path).map_err(|e| AggregateError::csv(path, e))?;

    let first_len = rows.first().map(|row| row.len()).unwrap_or(0);
    if header.len() > first_len {
        tracing::debug!(
            added = ?&header[first_len..],
            "Columns missing from the first row were appended to the header"
        );
    }

    writer
        .write_record(&header)
        .map_err(|e| AggregateError::csv(path, e))?;

    for row in rows {
        let cells: Vec<String> = header
            .iter()
            .map(|column| row.get(*column).map(csv_cell).unwrap_or_default())
            .collect();
        writer
            .write_record(&cells)
            .map_err(|e| AggregateError::csv(path, e))?;
    }

    writer.flush().map_err(|e| AggregateError::io(path, e))
}

fn write_json(rows: &[Row], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| AggregateError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, rows)
        .map_err(|e| AggregateError::io(path, e.into()))?;
    writer.flush().map_err(|e| AggregateError::io(path, e))
}

/// Render one JSON value as a CSV cell
pub fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RunRecord;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path("summary", DataKind::Raw, ExportFormat::Csv),
            PathBuf::from("summary_raw.csv")
        );
        assert_eq!(
            output_path("out/run1", DataKind::Stats, ExportFormat::Json),
            PathBuf::from("out/run1_stats.json")
        );
    }

    #[test]
    fn test_parse_format_and_selection() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!("both".parse::<DataSelection>(), Ok(DataSelection::Both));
        assert_eq!("stats".parse::<DataSelection>(), Ok(DataSelection::Stats));
    }

    #[test]
    fn test_data_selection_includes() {
        assert!(DataSelection::Both.includes(DataKind::Raw));
        assert!(DataSelection::Both.includes(DataKind::Stats));
        assert!(DataSelection::Raw.includes(DataKind::Raw));
        assert!(!DataSelection::Raw.includes(DataKind::Stats));
        assert!(!DataSelection::Stats.includes(DataKind::Raw));
    }

    #[test]
    fn test_export_empty_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary_raw.csv");
        let outcome = export_rows(&[], &path, ExportFormat::Csv).unwrap();
        assert_eq!(outcome, ExportOutcome::Skipped);
        assert!(!path.exists());

        let json_path = dir.path().join("summary_raw.json");
        assert_eq!(
            export_rows(&[], &json_path, ExportFormat::Json).unwrap(),
            ExportOutcome::Skipped
        );
        assert!(!json_path.exists());
    }

    #[test]
    fn test_export_csv_header_is_union_of_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![
            row(json!({"config": "a,b", "requests": 100, "latency": 1.5})),
            row(json!({"config": "c", "latency": 2.0, "extra": "kept"})),
        ];

        let outcome = export_rows(&rows, &path, ExportFormat::Csv).unwrap();
        assert_eq!(
            outcome,
            ExportOutcome::Written {
                path: path.clone(),
                rows: 2
            }
        );

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["config,requests,latency,extra", "\"a,b\",100,1.5,", "c,,2.0,kept"]
        );
    }

    #[test]
    fn test_export_csv_keeps_percentiles_missing_from_first_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary_raw.csv");

        let first = RunRecord::new("a_short", "t1", "m");
        let mut second = RunRecord::new("b_long", "t1", "m");
        second.percentiles.insert("p95_latency", 2.5);
        second.percentiles.insert("p99_latency", 3.0);
        let rows = vec![first.to_row(), second.to_row()];

        let header = csv_header(&rows);
        assert_eq!(&header[header.len() - 2..], &["p95_latency", "p99_latency"]);

        export_rows(&rows, &path, ExportFormat::Csv).unwrap();
        let reloaded = crate::import::read_rows(&path).unwrap();
        assert!(!reloaded[0].contains_key("p95_latency"));
        assert_eq!(reloaded[1]["p95_latency"], json!(2.5));
        assert_eq!(reloaded[1]["p99_latency"], json!(3.0));
    }

    #[test]
    fn test_export_json_keeps_order_and_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let rows = vec![row(json!({"zeta": 1, "model": "通义千问", "alpha": 2.5}))];

        export_rows(&rows, &path, ExportFormat::Json).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("通义千问"));
        let zeta = text.find("\"zeta\"").unwrap();
        let alpha = text.find("\"alpha\"").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn test_csv_cell() {
        assert_eq!(csv_cell(&Value::Null), "");
        assert_eq!(csv_cell(&json!("text")), "text");
        assert_eq!(csv_cell(&json!(3)), "3");
        assert_eq!(csv_cell(&json!(0.25)), "0.25");
        assert_eq!(csv_cell(&json!(true)), "true");
    }
}
