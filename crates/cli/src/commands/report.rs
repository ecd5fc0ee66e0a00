// Report command

use crate::output::{print_field, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use runstats_report::{
    default_output_path, load_rows, DataInfo, PerformanceSummary, ReportRenderer, ReportSummary,
};
use std::path::PathBuf;

#[derive(Args)]
pub struct ReportArgs {
    /// CSV or JSON data file
    pub input: PathBuf,

    /// Output HTML file (default: `{input stem}_report.html` next to the input)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Only show data file information
    #[arg(long)]
    pub info: bool,

    /// Only show the performance summary
    #[arg(long)]
    pub summary: bool,
}

pub fn run(args: ReportArgs, output: OutputFormat, quiet: bool) -> Result<()> {
    let data = load_rows(&args.input)
        .with_context(|| format!("Failed to load report data from {}", args.input.display()))?;

    if args.info {
        let info = DataInfo::from_data(&data)?;
        return print_info(&info, output);
    }

    if args.summary {
        let summary =
            PerformanceSummary::compute(&data.rows).context("No rows to summarize")?;
        return print_summary(&summary, output);
    }

    let path = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));
    let report = ReportRenderer::new(data)
        .write(&path)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    if !output.is_text() {
        return output.print_value(&report);
    }
    if !quiet {
        print_report(&report);
    }
    Ok(())
}

fn print_info(info: &DataInfo, output: OutputFormat) -> Result<()> {
    if !output.is_text() {
        return output.print_value(info);
    }

    print_field("Path", &info.path.display().to_string());
    print_field("Name", &info.name);
    print_field("Size", &format!("{} bytes", info.size_bytes));
    print_field("Records", &info.record_count.to_string());
    print_field("Shape", info.shape.as_str());
    if !info.columns.is_empty() {
        print_field("Columns", &info.columns.join(", "));
    }
    Ok(())
}

fn print_summary(summary: &PerformanceSummary, output: OutputFormat) -> Result<()> {
    if !output.is_text() {
        return output.print_value(summary);
    }

    let basic = &summary.basic;
    print_field(
        "Peak QPS",
        &format!(
            "{:.2} (concurrency {})",
            basic.max_qps, basic.max_qps_parallel
        ),
    );
    print_field(
        "Peak throughput",
        &format!("{:.0} tokens/s", basic.max_throughput),
    );
    print_field("Lowest latency", &format!("{:.0} ms", basic.min_latency));
    print_field(
        "TTFT range",
        &format!(
            "{:.0} - {:.0} ms",
            summary.latency.min_ttft, summary.latency.max_ttft
        ),
    );

    let success = &summary.success;
    let success_text = if success.assumed > 0 {
        format!(
            "{:.1}% ({} of {} rows assumed)",
            basic.avg_success_rate, success.assumed, basic.total_tests
        )
    } else {
        format!("{:.1}%", basic.avg_success_rate)
    };
    print_field("Avg success", &success_text);
    print_field("Max error", &format!("{:.1}%", success.max_error_rate));
    print_field("Test groups", &basic.total_tests.to_string());
    Ok(())
}

fn print_report(report: &ReportSummary) {
    print_field("Report", &report.output_file.display().to_string());
    print_field("Data source", &report.data_source);
    print_field("Records", &report.record_count.to_string());
    print_field("Charts", &report.charts_count.to_string());
    print_field("File size", &format!("{:.1} KB", report.file_size_kb));

    let absolute = std::fs::canonicalize(&report.output_file)
        .unwrap_or_else(|_| report.output_file.clone());
    print_field("Open", &format!("file://{}", absolute.display()));
}
