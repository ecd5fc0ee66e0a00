// Descriptive statistics over grouped run records
//
// Two phases per group:
// 1. tracked_fields: core fields + every percentile key seen in any record
// 2. GroupStatistics::compute: summarize each field over the records that have it
//    (core fields are always present; percentile keys may be missing)

use crate::grouper::{group_by_config, RecordGroup};
use crate::prompt::PromptClass;
use crate::record::{CoreField, Row, RunRecord, TrackedField};
use serde_json::Value;
use std::collections::HashSet;

/// Percentile key prefixes recognised during field discovery
pub const PERCENTILE_PREFIXES: [&str; 10] = [
    "p10_", "p25_", "p50_", "p66_", "p75_", "p80_", "p90_", "p95_", "p98_", "p99_",
];

/// Column suffixes emitted per tracked field
pub const STAT_SUFFIXES: [&str; 4] = ["avg", "std", "min", "max"];

pub fn is_percentile_key(key: &str) -> bool {
    PERCENTILE_PREFIXES
        .iter()
        .any(|prefix| key.starts_with(prefix))
}

/// count / mean / sample std-dev / min / max of a value set
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Summarize `values`.
    ///
    /// Empty input is all zeros. A single value has a standard deviation of
    /// exactly zero; two or more use the n-1 sample formula.
    pub fn from_values(values: &[f64]) -> Self {
        match values {
            [] => Summary::default(),
            [only] => Summary {
                count: 1,
                mean: *only,
                std_dev: 0.0,
                min: *only,
                max: *only,
            },
            _ => {
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let variance =
                    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
                Summary {
                    count: values.len(),
                    mean,
                    std_dev: variance.sqrt(),
                    min: values.iter().copied().fold(f64::INFINITY, f64::min),
                    max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                }
            }
        }
    }
}

/// Phase one: the fields to summarize for a set of records.
///
/// Core fields first, then percentile keys in first-seen order across all
/// records. A key present in only one record is still tracked.
pub fn tracked_fields(records: &[&RunRecord]) -> Vec<TrackedField> {
    let mut fields: Vec<TrackedField> = CoreField::ALL.into_iter().map(TrackedField::Core).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    for record in records {
        for key in record.percentiles.keys() {
            if is_percentile_key(key) && seen.insert(key) {
                fields.push(TrackedField::Percentile(key.to_string()));
            }
        }
    }

    fields
}

/// Statistics for one configuration group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStatistics {
    pub config: String,
    pub count: usize,
    pub model: String,
    pub parallel: u64,
    pub prompt_length: PromptClass,
    pub max_tokens: u64,
    pub fields: Vec<(TrackedField, Summary)>,
}

impl GroupStatistics {
    /// Phase two: summarize every tracked field of a group.
    ///
    /// Returns `None` for an empty group.
    pub fn compute(group: &RecordGroup<'_>) -> Option<Self> {
        let first = group.representative()?;

        let fields = tracked_fields(&group.records)
            .into_iter()
            .map(|field| {
                let values: Vec<f64> = group
                    .records
                    .iter()
                    .filter_map(|record| record.field_value(&field))
                    .collect();
                let summary = Summary::from_values(&values);
                (field, summary)
            })
            .collect();

        Some(Self {
            config: group.config.to_string(),
            count: group.len(),
            model: first.model.clone(),
            parallel: first.parallel,
            prompt_length: first.prompt_length,
            max_tokens: first.max_tokens,
            fields,
        })
    }

    /// Summary of one field by name
    pub fn field(&self, name: &str) -> Option<&Summary> {
        self.fields
            .iter()
            .find(|(field, _)| field.name() == name)
            .map(|(_, summary)| summary)
    }

    /// Flatten into an export row: identity columns, then
    /// `{field}_avg`, `{field}_std`, `{field}_min`, `{field}_max` per field
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("config".into(), Value::from(self.config.as_str()));
        row.insert("count".into(), Value::from(self.count));
        row.insert("model".into(), Value::from(self.model.as_str()));
        row.insert("parallel".into(), Value::from(self.parallel));
        row.insert(
            "prompt_length".into(),
            Value::from(self.prompt_length.as_str()),
        );
        row.insert("max_tokens".into(), Value::from(self.max_tokens));

        for (field, summary) in &self.fields {
            let values = [summary.mean, summary.std_dev, summary.min, summary.max];
            for (suffix, value) in STAT_SUFFIXES.iter().zip(values) {
                row.insert(format!("{}_{}", field.name(), suffix), Value::from(value));
            }
        }
        row
    }
}

/// Group records by configuration and summarize each group
pub fn compute_statistics(records: &[RunRecord]) -> Vec<GroupStatistics> {
    group_by_config(records)
        .iter()
        .filter_map(GroupStatistics::compute)
        .collect()
}
