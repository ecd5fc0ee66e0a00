// Performance Report Generation
//
// Turns an aggregation export (or any chart-ready CSV/JSON) into a single
// static HTML page with summary cards, Chart.js bar charts and tables.
//
// Pipeline: loader → statistics → chart_data → html → renderer

pub mod chart_data;
pub mod error;
pub mod html;
pub mod loader;
pub mod renderer;
pub mod statistics;

pub use chart_data::{ChartDataExtractor, ChartSpec, CHART_COUNT};
pub use error::{ReportError, Result};
pub use loader::{adapt_row, load_rows, DataInfo, DataShape, Reliability, ReportData, ReportRow};
pub use renderer::{default_output_path, ReportRenderer, ReportSummary};
pub use statistics::{
    BasicStats, LatencyStats, PerformanceSummary, SuccessStats, ThroughputStats,
};
