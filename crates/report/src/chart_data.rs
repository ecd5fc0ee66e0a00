// Chart.js configuration building
//
// Rows are sorted by concurrency (stable) and bucketed by prompt class using
// the name-substring classifier. Each chart has one dataset per bucket; the
// x-axis labels come from the short bucket.

use crate::loader::ReportRow;
use runstats_core::{PromptClass, PromptClassifier};
use serde_json::{json, Value};

/// Number of charts in every report
pub const CHART_COUNT: usize = 5;

const X_AXIS_TITLE: &str = "Concurrency";

fn class_color(class: PromptClass) -> &'static str {
    match class {
        PromptClass::Short => "#667eea",
        PromptClass::Medium => "#28a745",
        PromptClass::Long => "#ff6b6b",
    }
}

fn error_color(class: PromptClass) -> &'static str {
    match class {
        PromptClass::Short | PromptClass::Long => "#dc3545",
        PromptClass::Medium => "#ffc107",
    }
}

/// `#rrggbb` → `rgba(r, g, b, alpha)`
fn rgba(hex: &str, alpha: f64) -> String {
    let channel = |range: std::ops::Range<usize>| {
        hex.trim_start_matches('#')
            .get(range)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0)
    };
    format!(
        "rgba({}, {}, {}, {})",
        channel(0..2),
        channel(2..4),
        channel(4..6),
        alpha
    )
}

fn bar_dataset(label: String, data: Vec<f64>, color: &str) -> Value {
    json!({
        "label": label,
        "data": data,
        "backgroundColor": rgba(color, 0.8),
        "borderColor": color,
        "borderWidth": 2,
        "borderRadius": 6
    })
}

fn bar_chart(labels: &[u64], datasets: Vec<Value>, y_title: &str, y_max: Option<f64>) -> Value {
    let mut y_axis = json!({
        "title": {
            "display": true,
            "text": y_title,
            "font": {"size": 14, "weight": "bold"}
        },
        "beginAtZero": true
    });
    if let (Some(max), Some(axis)) = (y_max, y_axis.as_object_mut()) {
        axis.insert("max".into(), json!(max));
    }

    json!({
        "type": "bar",
        "data": {
            "labels": labels,
            "datasets": datasets
        },
        "options": {
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": {
                "legend": {"display": true, "position": "top"},
                "tooltip": {
                    "backgroundColor": "rgba(0,0,0,0.8)",
                    "padding": 12,
                    "titleFont": {"size": 14},
                    "bodyFont": {"size": 13}
                }
            },
            "scales": {
                "x": {
                    "title": {
                        "display": true,
                        "text": X_AXIS_TITLE,
                        "font": {"size": 14, "weight": "bold"}
                    },
                    "grid": {"display": false}
                },
                "y": y_axis
            }
        }
    })
}

/// One chart: where it renders and what it draws
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub canvas_id: &'static str,
    pub title: &'static str,
    pub config: Value,
}

/// Sorted, bucketed view of the report rows
#[derive(Debug)]
pub struct ChartDataExtractor<'a> {
    rows: Vec<&'a ReportRow>,
    buckets: Vec<(PromptClass, Vec<&'a ReportRow>)>,
}

impl<'a> ChartDataExtractor<'a> {
    pub fn new(rows: &'a [ReportRow]) -> Self {
        let mut sorted: Vec<&ReportRow> = rows.iter().collect();
        sorted.sort_by_key(|row| row.parallel);

        let classifier = PromptClassifier::NameSubstring;
        let buckets = PromptClass::ALL
            .into_iter()
            .map(|class| {
                let members = sorted
                    .iter()
                    .copied()
                    .filter(|row| classifier.classify(&row.test_name) == Some(class))
                    .collect();
                (class, members)
            })
            .collect();

        Self {
            rows: sorted,
            buckets,
        }
    }

    /// All rows, sorted by concurrency
    pub fn rows(&self) -> &[&'a ReportRow] {
        &self.rows
    }

    /// Rows of one prompt class, sorted by concurrency
    pub fn bucket(&self, class: PromptClass) -> &[&'a ReportRow] {
        self.buckets
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, rows)| rows.as_slice())
            .unwrap_or_default()
    }

    /// X-axis labels: short-bucket concurrencies, or every distinct
    /// concurrency when there are no short rows
    pub fn labels(&self) -> Vec<u64> {
        let short = self.bucket(PromptClass::Short);
        if !short.is_empty() {
            return short.iter().map(|row| row.parallel).collect();
        }
        let mut labels: Vec<u64> = self.rows.iter().map(|row| row.parallel).collect();
        labels.dedup();
        labels
    }

    fn per_class(&self, label: &str, metric: impl Fn(&ReportRow) -> f64) -> Vec<Value> {
        PromptClass::ALL
            .into_iter()
            .map(|class| {
                let data = self.bucket(class).iter().map(|&row| metric(row)).collect();
                bar_dataset(format!("{} ({})", label, class), data, class_color(class))
            })
            .collect()
    }

    pub fn qps_chart(&self) -> Value {
        let datasets = self.per_class("QPS", |row| row.qps);
        bar_chart(&self.labels(), datasets, "QPS (requests/s)", None)
    }

    pub fn throughput_chart(&self) -> Value {
        let datasets = self.per_class("Token throughput", |row| row.output_token_throughput);
        bar_chart(&self.labels(), datasets, "Tokens/s", None)
    }

    pub fn latency_chart(&self) -> Value {
        let datasets = self.per_class("P95 latency", |row| row.p95_latency_ms);
        bar_chart(&self.labels(), datasets, "P95 latency (ms)", None)
    }

    pub fn ttft_chart(&self) -> Value {
        let datasets = self.per_class("TTFT", |row| row.avg_ttft_ms);
        bar_chart(&self.labels(), datasets, "TTFT (ms)", None)
    }

    /// Success and error rate per class. Buckets containing rows without
    /// measured reliability are labelled as assumed.
    pub fn success_chart(&self) -> Value {
        let mut datasets = Vec::new();
        for class in PromptClass::ALL {
            let rows = self.bucket(class);
            let marker = if rows.iter().any(|row| row.reliability.is_assumed()) {
                ", assumed"
            } else {
                ""
            };
            datasets.push(bar_dataset(
                format!("Success rate ({}{})", class, marker),
                rows.iter().map(|row| row.success_rate()).collect(),
                class_color(class),
            ));
            datasets.push(bar_dataset(
                format!("Error rate ({}{})", class, marker),
                rows.iter().map(|row| row.error_rate()).collect(),
                error_color(class),
            ));
        }
        bar_chart(&self.labels(), datasets, "Percent (%)", Some(100.0))
    }

    /// The five report charts in display order
    pub fn charts(&self) -> Vec<ChartSpec> {
        vec![
            ChartSpec {
                canvas_id: "qpsChart",
                title: "QPS by concurrency",
                config: self.qps_chart(),
            },
            ChartSpec {
                canvas_id: "throughputChart",
                title: "Token throughput",
                config: self.throughput_chart(),
            },
            ChartSpec {
                canvas_id: "latencyChart",
                title: "P95 latency",
                config: self.latency_chart(),
            },
            ChartSpec {
                canvas_id: "ttftChart",
                title: "Time to first token (TTFT)",
                config: self.ttft_chart(),
            },
            ChartSpec {
                canvas_id: "successChart",
                title: "Success and error rate",
                config: self.success_chart(),
            },
        ]
    }

    /// Full sorted dataset, including rows that fit no bucket
    pub fn dataset(&self) -> Value {
        json!({
            "parallels": self.rows.iter().map(|row| row.parallel).collect::<Vec<_>>(),
            "rows": self.rows,
        })
    }
}
