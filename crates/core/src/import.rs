// Load exported rows back from CSV or JSON
//
// CSV cells are typed by trying integer, then float, then falling back to
// text; empty cells are dropped so "missing" stays missing.

use crate::error::{AggregateError, Result};
use crate::record::Row;
use serde_json::{Number, Value};
use std::path::Path;

/// Read rows from `path`, choosing the parser by extension (`.json` or CSV)
pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let rows = if is_json {
        read_json_rows(path)?
    } else {
        read_csv_rows(path)?
    };
    tracing::debug!(path = %path.display(), rows = rows.len(), "Loaded rows");
    Ok(rows)
}

/// Read a JSON array of objects, or a single object
pub fn read_json_rows(path: &Path) -> Result<Vec<Row>> {
    let text = std::fs::read_to_string(path).map_err(|e| AggregateError::io(path, e))?;
    let value: Value =
        serde_json::from_str(strip_bom(&text)).map_err(|e| AggregateError::parse(path, e))?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(map),
                _ => Err(AggregateError::invalid(
                    path,
                    format!("element {} is not an object", index),
                )),
            })
            .collect(),
        Value::Object(map) => Ok(vec![map]),
        _ => Err(AggregateError::invalid(
            path,
            "expected an array of objects",
        )),
    }
}

/// Read a CSV file with a header line
pub fn read_csv_rows(path: &Path) -> Result<Vec<Row>> {
    let text = std::fs::read_to_string(path).map_err(|e| AggregateError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(strip_bom(&text).as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AggregateError::csv(path, e))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AggregateError::csv(path, e))?;
        let mut row = Row::new();
        for (column, cell) in headers.iter().zip(record.iter()) {
            if let Some(value) = typed_cell(cell) {
                row.insert(column.to_string(), value);
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Parse a CSV cell into the narrowest JSON value
pub fn typed_cell(cell: &str) -> Option<Value> {
    if cell.is_empty() {
        return None;
    }
    if let Ok(int) = cell.parse::<i64>() {
        return Some(Value::from(int));
    }
    if let Ok(float) = cell.parse::<f64>() {
        if let Some(number) = Number::from_f64(float) {
            return Some(Value::Number(number));
        }
    }
    Some(Value::String(cell.to_string()))
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}
