// Run record types
//
// One RunRecord per benchmark bundle. Core metrics default to zero when the
// summary artifact lacks them. Resource metrics are `None` when the bundle has
// no SQLite store, yet still read as zero in rows and statistics. Percentile
// metrics are whatever the percentile table contained.

use crate::prompt::PromptClass;
use serde_json::{Map, Value};
use std::fmt;

/// One exported row: ordered column name → value
pub type Row = Map<String, Value>;

/// Outcome metrics taken from the summary artifact
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunMetrics {
    pub requests: u64,
    pub time_taken: f64,
    pub output_throughput: f64,
    pub total_throughput: f64,
    pub request_throughput: f64,
    pub latency: f64,
    pub ttft: f64,
    pub token_latency: f64,
    pub inter_token_latency: f64,
    pub input_tokens: f64,
    pub output_tokens: f64,
}

/// Memory usage aggregated from the embedded resource store
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceMetrics {
    pub avg_gpu_memory: f64,
    pub max_gpu_memory: f64,
    pub min_gpu_memory: f64,
}

/// Insertion-ordered percentile values keyed by canonical name (`p95_latency`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PercentileMetrics {
    entries: Vec<(String, f64)>,
}

impl PercentileMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value. Overwriting keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for PercentileMetrics {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut metrics = PercentileMetrics::new();
        for (key, value) in iter {
            metrics.insert(key, value);
        }
        metrics
    }
}

/// One completed benchmark execution
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub config: String,
    pub timestamp: String,
    pub model: String,
    pub parallel: u64,
    pub prompt_length: PromptClass,
    pub max_tokens: u64,
    pub metrics: RunMetrics,
    pub resources: Option<ResourceMetrics>,
    pub percentiles: PercentileMetrics,
}

impl RunRecord {
    /// Create a record with zeroed metrics
    pub fn new(
        config: impl Into<String>,
        timestamp: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            config: config.into(),
            timestamp: timestamp.into(),
            model: model.into(),
            parallel: 0,
            prompt_length: PromptClass::Short,
            max_tokens: 0,
            metrics: RunMetrics::default(),
            resources: None,
            percentiles: PercentileMetrics::new(),
        }
    }

    /// Value of a statistics field, `None` when this record does not carry it
    pub fn field_value(&self, field: &TrackedField) -> Option<f64> {
        match field {
            TrackedField::Core(core) => core.value(self),
            TrackedField::Percentile(key) => self.percentiles.get(key),
        }
    }

    /// Flatten into an export row with the fixed column order
    pub fn to_row(&self) -> Row {
        let m = &self.metrics;
        let resources = self.resources.unwrap_or_default();

        let mut row = Row::new();
        row.insert("timestamp".into(), Value::from(self.timestamp.as_str()));
        row.insert("config".into(), Value::from(self.config.as_str()));
        row.insert("model".into(), Value::from(self.model.as_str()));
        row.insert("parallel".into(), Value::from(self.parallel));
        row.insert(
            "prompt_length".into(),
            Value::from(self.prompt_length.as_str()),
        );
        row.insert("max_tokens".into(), Value::from(self.max_tokens));
        row.insert("requests".into(), Value::from(m.requests));
        row.insert("time_taken".into(), Value::from(m.time_taken));
        row.insert("output_throughput".into(), Value::from(m.output_throughput));
        row.insert("total_throughput".into(), Value::from(m.total_throughput));
        row.insert(
            "request_throughput".into(),
            Value::from(m.request_throughput),
        );
        row.insert("latency".into(), Value::from(m.latency));
        row.insert("ttft".into(), Value::from(m.ttft));
        row.insert("token_latency".into(), Value::from(m.token_latency));
        row.insert(
            "inter_token_latency".into(),
            Value::from(m.inter_token_latency),
        );
        row.insert("input_tokens".into(), Value::from(m.input_tokens));
        row.insert("output_tokens".into(), Value::from(m.output_tokens));
        row.insert(
            "avg_gpu_memory".into(),
            Value::from(resources.avg_gpu_memory),
        );
        row.insert(
            "max_gpu_memory".into(),
            Value::from(resources.max_gpu_memory),
        );
        row.insert(
            "min_gpu_memory".into(),
            Value::from(resources.min_gpu_memory),
        );
        for (key, value) in self.percentiles.iter() {
            row.insert(key.to_string(), Value::from(value));
        }
        row
    }
}

// ============================================
// Statistics fields
// ============================================

/// Fixed numeric fields tracked for every group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreField {
    OutputThroughput,
    TotalThroughput,
    RequestThroughput,
    Latency,
    Ttft,
    TokenLatency,
    InterTokenLatency,
    InputTokens,
    OutputTokens,
    TimeTaken,
    AvgGpuMemory,
    MaxGpuMemory,
    MinGpuMemory,
    Requests,
}

impl CoreField {
    /// Core fields in output column order
    pub const ALL: [CoreField; 14] = [
        CoreField::OutputThroughput,
        CoreField::TotalThroughput,
        CoreField::RequestThroughput,
        CoreField::Latency,
        CoreField::Ttft,
        CoreField::TokenLatency,
        CoreField::InterTokenLatency,
        CoreField::InputTokens,
        CoreField::OutputTokens,
        CoreField::TimeTaken,
        CoreField::AvgGpuMemory,
        CoreField::MaxGpuMemory,
        CoreField::MinGpuMemory,
        CoreField::Requests,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CoreField::OutputThroughput => "output_throughput",
            CoreField::TotalThroughput => "total_throughput",
            CoreField::RequestThroughput => "request_throughput",
            CoreField::Latency => "latency",
            CoreField::Ttft => "ttft",
            CoreField::TokenLatency => "token_latency",
            CoreField::InterTokenLatency => "inter_token_latency",
            CoreField::InputTokens => "input_tokens",
            CoreField::OutputTokens => "output_tokens",
            CoreField::TimeTaken => "time_taken",
            CoreField::AvgGpuMemory => "avg_gpu_memory",
            CoreField::MaxGpuMemory => "max_gpu_memory",
            CoreField::MinGpuMemory => "min_gpu_memory",
            CoreField::Requests => "requests",
        }
    }

    /// Every core field has a value; missing resource metrics count as zero
    fn value(&self, record: &RunRecord) -> Option<f64> {
        let m = &record.metrics;
        let resources = record.resources.unwrap_or_default();
        match self {
            CoreField::OutputThroughput => Some(m.output_throughput),
            CoreField::TotalThroughput => Some(m.total_throughput),
            CoreField::RequestThroughput => Some(m.request_throughput),
            CoreField::Latency => Some(m.latency),
            CoreField::Ttft => Some(m.ttft),
            CoreField::TokenLatency => Some(m.token_latency),
            CoreField::InterTokenLatency => Some(m.inter_token_latency),
            CoreField::InputTokens => Some(m.input_tokens),
            CoreField::OutputTokens => Some(m.output_tokens),
            CoreField::TimeTaken => Some(m.time_taken),
            CoreField::AvgGpuMemory => Some(resources.avg_gpu_memory),
            CoreField::MaxGpuMemory => Some(resources.max_gpu_memory),
            CoreField::MinGpuMemory => Some(resources.min_gpu_memory),
            CoreField::Requests => Some(m.requests as f64),
        }
    }
}

/// A field the statistics engine summarizes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackedField {
    Core(CoreField),
    Percentile(String),
}

impl TrackedField {
    pub fn name(&self) -> &str {
        match self {
            TrackedField::Core(core) => core.name(),
            TrackedField::Percentile(key) => key,
        }
    }
}

impl fmt::Display for TrackedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
