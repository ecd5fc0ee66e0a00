// Report assembly and output

use crate::chart_data::{ChartDataExtractor, CHART_COUNT};
use crate::error::{ReportError, Result};
use crate::html;
use crate::loader::ReportData;
use crate::statistics::{BasicStats, PerformanceSummary};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// `{dir}/{stem}_report.html` next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    input.with_file_name(format!("{}_report.html", stem))
}

/// What `ReportRenderer::write` produced
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub output_file: PathBuf,
    pub data_source: String,
    pub record_count: usize,
    pub charts_count: usize,
    pub file_size_kb: f64,
    pub stats: Option<PerformanceSummary>,
}

pub struct ReportRenderer {
    data: ReportData,
    generated_at: DateTime<Local>,
}

impl ReportRenderer {
    pub fn new(data: ReportData) -> Self {
        Self {
            data,
            generated_at: Local::now(),
        }
    }

    /// Fix the header timestamp
    pub fn with_generated_at(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn data(&self) -> &ReportData {
        &self.data
    }

    /// Render the complete HTML document
    pub fn render(&self) -> Result<String> {
        let rows = &self.data.rows;
        let stats = BasicStats::compute(rows)
            .ok_or_else(|| ReportError::EmptyData(self.data.source.clone()))?;
        let assumed = rows.iter().filter(|r| r.reliability.is_assumed()).count();

        let extractor = ChartDataExtractor::new(rows);
        let charts = extractor.charts();
        let generated_at = self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string();

        let parts = [
            html::header(&generated_at),
            html::stats_cards(&stats, assumed),
            html::charts_section(&charts),
            html::table_section(&extractor),
            html::footer(&self.data.source_name()),
            html::scripts(&charts, &extractor.dataset())?,
        ];
        Ok(parts.join("\n"))
    }

    /// Render and write to `path`
    pub fn write(&self, path: &Path) -> Result<ReportSummary> {
        tracing::info!(path = %path.display(), "Generating HTML report");
        let document = self.render()?;
        fs::write(path, &document).map_err(|e| ReportError::io(path, e))?;

        let size = fs::metadata(path)
            .map(|m| m.len())
            .map_err(|e| ReportError::io(path, e))?;
        let file_size_kb = size as f64 / 1024.0;
        tracing::info!(path = %path.display(), size_kb = file_size_kb, "HTML report written");

        Ok(ReportSummary {
            output_file: path.to_path_buf(),
            data_source: self.data.source_name(),
            record_count: self.data.len(),
            charts_count: CHART_COUNT,
            file_size_kb,
            stats: PerformanceSummary::compute(&self.data.rows),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("out/summary_stats.csv")),
            PathBuf::from("out/summary_stats_report.html")
        );
        assert_eq!(
            default_output_path(Path::new("data.json")),
            PathBuf::from("data_report.html")
        );
    }
}
