// Report-level statistics
//
// Computed over adapted ReportRows (one per table row), not over run records.
// Every calculator returns None for an empty dataset.

use crate::loader::ReportRow;
use serde::Serialize;

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::NEG_INFINITY, f64::max)
}

fn min(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(f64::INFINITY, f64::min)
}

/// Headline numbers for the summary cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicStats {
    pub max_qps: f64,
    /// Concurrency of the first row reaching `max_qps`
    pub max_qps_parallel: u64,
    pub max_throughput: f64,
    pub min_latency: f64,
    pub avg_success_rate: f64,
    pub total_tests: usize,
}

impl BasicStats {
    pub fn compute(rows: &[ReportRow]) -> Option<Self> {
        let first = rows.first()?;
        let peak = rows
            .iter()
            .skip(1)
            .fold(first, |best, row| if row.qps > best.qps { row } else { best });

        Some(Self {
            max_qps: peak.qps,
            max_qps_parallel: peak.parallel,
            max_throughput: max(rows.iter().map(|r| r.output_token_throughput)),
            min_latency: min(rows.iter().map(|r| r.avg_latency_ms)),
            avg_success_rate: mean(rows.iter().map(ReportRow::success_rate)),
            total_tests: rows.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThroughputStats {
    pub max_throughput: f64,
    pub min_throughput: f64,
    pub avg_throughput: f64,
    pub total_throughput: f64,
}

impl ThroughputStats {
    pub fn compute(rows: &[ReportRow]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let values = || rows.iter().map(|r| r.output_token_throughput);
        Some(Self {
            max_throughput: max(values()),
            min_throughput: min(values()),
            avg_throughput: mean(values()),
            total_throughput: values().sum(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyStats {
    pub min_avg_latency: f64,
    pub max_avg_latency: f64,
    pub avg_avg_latency: f64,
    pub min_ttft: f64,
    pub max_ttft: f64,
    pub avg_ttft: f64,
}

impl LatencyStats {
    pub fn compute(rows: &[ReportRow]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let latency = || rows.iter().map(|r| r.avg_latency_ms);
        let ttft = || rows.iter().map(|r| r.avg_ttft_ms);
        Some(Self {
            min_avg_latency: min(latency()),
            max_avg_latency: max(latency()),
            avg_avg_latency: mean(latency()),
            min_ttft: min(ttft()),
            max_ttft: max(ttft()),
            avg_ttft: mean(ttft()),
        })
    }
}

/// Success/error statistics. Rows with unknown reliability count as
/// 100% / 0% and are tallied in `assumed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessStats {
    pub avg_success_rate: f64,
    pub min_success_rate: f64,
    pub max_success_rate: f64,
    pub avg_error_rate: f64,
    pub max_error_rate: f64,
    pub measured: usize,
    pub assumed: usize,
}

impl SuccessStats {
    pub fn compute(rows: &[ReportRow]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let success = || rows.iter().map(ReportRow::success_rate);
        let error = || rows.iter().map(ReportRow::error_rate);
        let assumed = rows.iter().filter(|r| r.reliability.is_assumed()).count();
        Some(Self {
            avg_success_rate: mean(success()),
            min_success_rate: min(success()),
            max_success_rate: max(success()),
            avg_error_rate: mean(error()),
            max_error_rate: max(error()),
            measured: rows.len() - assumed,
            assumed,
        })
    }
}

/// Everything `report --summary` prints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub basic: BasicStats,
    pub throughput: ThroughputStats,
    pub latency: LatencyStats,
    pub success: SuccessStats,
}

impl PerformanceSummary {
    pub fn compute(rows: &[ReportRow]) -> Option<Self> {
        Some(Self {
            basic: BasicStats::compute(rows)?,
            throughput: ThroughputStats::compute(rows)?,
            latency: LatencyStats::compute(rows)?,
            success: SuccessStats::compute(rows)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Reliability;

    fn report_row(parallel: u64, qps: f64, latency: f64) -> ReportRow {
        ReportRow {
            test_name: format!("p{}_short", parallel),
            parallel,
            num_requests: 100,
            qps,
            output_token_throughput: qps * 100.0,
            avg_latency_ms: latency,
            avg_ttft_ms: latency / 10.0,
            p50_latency_ms: latency,
            p95_latency_ms: latency,
            p99_latency_ms: latency,
            reliability: Reliability::Unknown,
        }
    }

    #[test]
    fn test_empty_dataset_has_no_summary() {
        assert!(PerformanceSummary::compute(&[]).is_none());
        assert!(BasicStats::compute(&[]).is_none());
        assert!(SuccessStats::compute(&[]).is_none());
    }

    #[test]
    fn test_basic_stats() {
        let rows = vec![
            report_row(1, 2.0, 500.0),
            report_row(4, 6.0, 800.0),
            report_row(8, 6.0, 1200.0),
        ];
        let stats = BasicStats::compute(&rows).unwrap();
        assert_eq!(stats.max_qps, 6.0);
        // First row reaching the maximum wins
        assert_eq!(stats.max_qps_parallel, 4);
        assert_eq!(stats.max_throughput, 600.0);
        assert_eq!(stats.min_latency, 500.0);
        assert_eq!(stats.avg_success_rate, 100.0);
        assert_eq!(stats.total_tests, 3);
    }

    #[test]
    fn test_throughput_and_latency_stats() {
        let rows = vec![report_row(1, 1.0, 100.0), report_row(2, 3.0, 300.0)];

        let throughput = ThroughputStats::compute(&rows).unwrap();
        assert_eq!(throughput.max_throughput, 300.0);
        assert_eq!(throughput.min_throughput, 100.0);
        assert_eq!(throughput.avg_throughput, 200.0);
        assert_eq!(throughput.total_throughput, 400.0);

        let latency = LatencyStats::compute(&rows).unwrap();
        assert_eq!(latency.min_avg_latency, 100.0);
        assert_eq!(latency.max_avg_latency, 300.0);
        assert_eq!(latency.avg_avg_latency, 200.0);
        assert_eq!(latency.min_ttft, 10.0);
        assert_eq!(latency.max_ttft, 30.0);
    }

    #[test]
    fn test_success_stats_counts_assumed_rows() {
        let mut measured = report_row(2, 1.0, 100.0);
        measured.reliability = Reliability::Measured {
            success_rate: 90.0,
            error_rate: 10.0,
        };
        let rows = vec![report_row(1, 1.0, 100.0), measured];

        let stats = SuccessStats::compute(&rows).unwrap();
        assert_eq!(stats.avg_success_rate, 95.0);
        assert_eq!(stats.min_success_rate, 90.0);
        assert_eq!(stats.max_success_rate, 100.0);
        assert_eq!(stats.avg_error_rate, 5.0);
        assert_eq!(stats.max_error_rate, 10.0);
        assert_eq!(stats.measured, 1);
        assert_eq!(stats.assumed, 1);
    }
}
