// HTML templates for the performance report
//
// Each function renders one section of the page. All text that comes from the
// data is escaped; JSON embedded in <script> has `</` escaped.

use crate::chart_data::{ChartDataExtractor, ChartSpec};
use crate::error::Result;
use crate::loader::ReportRow;
use crate::statistics::BasicStats;
use runstats_core::PromptClass;
use serde_json::Value;

pub const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.0/dist/chart.umd.min.js";
pub const DATE_ADAPTER_URL: &str =
    "https://cdn.jsdelivr.net/npm/chartjs-adapter-date-fns/dist/chartjs-adapter-date-fns.bundle.min.js";

const ASSUMED_NOTE: &str = "assumed: the source has no success/error data";

const STYLES: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            padding: 20px;
            color: #333;
        }
        .container {
            max-width: 1400px;
            margin: 0 auto;
            background: white;
            border-radius: 20px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.3);
            overflow: hidden;
        }
        .header {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            padding: 40px;
            text-align: center;
        }
        .header h1 { font-size: 2.5em; margin-bottom: 10px; font-weight: 700; }
        .header p { font-size: 1.1em; opacity: 0.9; }
        .stats-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(250px, 1fr));
            gap: 20px;
            padding: 40px;
            background: #f8f9fa;
        }
        .stat-card {
            background: white;
            padding: 25px;
            border-radius: 15px;
            box-shadow: 0 4px 6px rgba(0,0,0,0.1);
        }
        .stat-card h3 {
            color: #667eea;
            font-size: 0.9em;
            text-transform: uppercase;
            letter-spacing: 1px;
            margin-bottom: 10px;
        }
        .stat-card .value { font-size: 2.2em; font-weight: 700; margin-bottom: 5px; }
        .stat-card .label { color: #666; font-size: 0.9em; }
        .charts-section { padding: 40px; }
        .chart-container {
            background: white;
            padding: 30px;
            border-radius: 15px;
            margin-bottom: 30px;
            box-shadow: 0 4px 6px rgba(0,0,0,0.1);
        }
        .chart-container h2, .table-container h2 {
            margin-bottom: 20px;
            font-size: 1.5em;
            border-left: 4px solid #667eea;
            padding-left: 15px;
        }
        .chart-wrapper { position: relative; height: 400px; }
        .table-container { padding: 40px; background: #f8f9fa; }
        .table-section {
            margin-bottom: 40px;
            padding: 20px;
            background: white;
            border-radius: 15px;
            box-shadow: 0 4px 6px rgba(0,0,0,0.1);
        }
        .table-section h3 {
            margin-bottom: 20px;
            font-size: 1.2em;
            border-left: 4px solid #667eea;
            padding-left: 12px;
        }
        table { width: 100%; border-collapse: collapse; }
        th {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            padding: 15px;
            text-align: left;
            font-size: 0.9em;
            text-transform: uppercase;
        }
        td { padding: 12px 15px; border-bottom: 1px solid #eee; }
        tr:hover { background: #f8f9fa; }
        .success { color: #28a745; font-weight: 600; }
        .warning { color: #ffc107; font-weight: 600; }
        .danger { color: #dc3545; font-weight: 600; }
        .assumed { font-style: italic; opacity: 0.7; }
        .note { color: #666; font-size: 0.85em; margin-top: 10px; }
        .footer { text-align: center; padding: 30px; background: #f8f9fa; color: #666; font-size: 0.9em; }
        @media (max-width: 768px) {
            .stats-grid { grid-template-columns: 1fr; }
            .header h1 { font-size: 1.8em; }
            table { font-size: 0.85em; }
        }
"#;

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Serialize for inline <script> embedding
pub fn script_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub fn success_class(rate: f64) -> &'static str {
    if rate >= 95.0 {
        "success"
    } else if rate >= 90.0 {
        "warning"
    } else {
        "danger"
    }
}

pub fn error_class(rate: f64) -> &'static str {
    if rate == 0.0 {
        "success"
    } else if rate < 5.0 {
        "warning"
    } else {
        "danger"
    }
}

// ============================================
// Page sections
// ============================================

pub fn header(generated_at: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Performance Test Report</title>
    <script src="{chart_js}"></script>
    <script src="{adapter}"></script>
    <style>{styles}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Performance Test Report</h1>
            <p>Generated: {generated_at}</p>
        </div>
"#,
        chart_js = CHART_JS_URL,
        adapter = DATE_ADAPTER_URL,
        styles = STYLES,
        generated_at = html_escape(generated_at),
    )
}

pub fn stats_cards(stats: &BasicStats, assumed: usize) -> String {
    let success_label = if assumed > 0 {
        format!(
            "Total tests: {} groups ({} assumed)",
            stats.total_tests, assumed
        )
    } else {
        format!("Total tests: {} groups", stats.total_tests)
    };

    format!(
        r#"        <div class="stats-grid">
            <div class="stat-card">
                <h3>Peak QPS</h3>
                <div class="value">{max_qps:.2}</div>
                <div class="label">Concurrency: {parallel}</div>
            </div>
            <div class="stat-card">
                <h3>Peak throughput</h3>
                <div class="value">{throughput:.0}</div>
                <div class="label">tokens/s</div>
            </div>
            <div class="stat-card">
                <h3>Lowest latency</h3>
                <div class="value">{latency:.0}</div>
                <div class="label">ms</div>
            </div>
            <div class="stat-card">
                <h3>Average success rate</h3>
                <div class="value">{success:.1}%</div>
                <div class="label">{success_label}</div>
            </div>
        </div>
"#,
        max_qps = stats.max_qps,
        parallel = stats.max_qps_parallel,
        throughput = stats.max_throughput,
        latency = stats.min_latency,
        success = stats.avg_success_rate,
        success_label = html_escape(&success_label),
    )
}

pub fn charts_section(charts: &[ChartSpec]) -> String {
    let containers: String = charts
        .iter()
        .map(|chart| {
            format!(
                r#"            <div class="chart-container">
                <h2>{title}</h2>
                <div class="chart-wrapper"><canvas id="{id}"></canvas></div>
            </div>
"#,
                title = html_escape(chart.title),
                id = chart.canvas_id,
            )
        })
        .collect();

    format!(
        "        <div class=\"charts-section\">\n{}        </div>\n",
        containers
    )
}

fn rate_cell(rate: f64, class: &str, assumed: bool) -> String {
    if assumed {
        format!(
            r#"<td class="{} assumed" title="{}">{:.1}%*</td>"#,
            class, ASSUMED_NOTE, rate
        )
    } else {
        format!(r#"<td class="{}">{:.1}%</td>"#, class, rate)
    }
}

fn table_row(row: &ReportRow) -> String {
    let assumed = row.reliability.is_assumed();
    format!(
        "                    <tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.0}</td><td>{:.0}</td>\
         <td>{:.0}</td><td>{:.0}</td><td>{:.0}</td>{}{}</tr>\n",
        row.parallel,
        row.num_requests,
        row.qps,
        row.output_token_throughput,
        row.avg_latency_ms,
        row.p95_latency_ms,
        row.p99_latency_ms,
        row.avg_ttft_ms,
        rate_cell(row.success_rate(), success_class(row.success_rate()), assumed),
        rate_cell(row.error_rate(), error_class(row.error_rate()), assumed),
    )
}

fn class_title(class: PromptClass) -> &'static str {
    match class {
        PromptClass::Short => "Short prompt tests",
        PromptClass::Medium => "Medium prompt tests",
        PromptClass::Long => "Long prompt tests",
    }
}

pub fn table_section(extractor: &ChartDataExtractor<'_>) -> String {
    let mut html = String::from(
        "        <div class=\"table-container\">\n            <h2>Detailed results</h2>\n",
    );

    for class in PromptClass::ALL {
        let rows = extractor.bucket(class);
        let body: String = rows.iter().map(|row| table_row(row)).collect();
        let note = if rows.iter().any(|row| row.reliability.is_assumed()) {
            format!("                <p class=\"note\">* {}</p>\n", ASSUMED_NOTE)
        } else {
            String::new()
        };

        html.push_str(&format!(
            r#"            <div class="table-section">
                <h3>{title}</h3>
                <table>
                    <thead><tr>
                        <th>Concurrency</th><th>Requests</th><th>QPS</th>
                        <th>Throughput<br>(tok/s)</th><th>Avg latency<br>(ms)</th>
                        <th>P95 latency<br>(ms)</th><th>P99 latency<br>(ms)</th>
                        <th>TTFT<br>(ms)</th><th>Success</th><th>Error</th>
                    </tr></thead>
                    <tbody>
{body}                    </tbody>
                </table>
{note}            </div>
"#,
            title = class_title(class),
            body = body,
            note = note,
        ));
    }

    html.push_str("        </div>\n");
    html
}

pub fn footer(source_name: &str) -> String {
    format!(
        r#"        <div class="footer">
            <p>Performance Test Report | Data source: {}</p>
        </div>
    </div>
"#,
        html_escape(source_name)
    )
}

pub fn scripts(charts: &[ChartSpec], dataset: &Value) -> Result<String> {
    let mut js = format!(
        r#"    <script>
        Chart.defaults.font.family = '-apple-system, BlinkMacSystemFont, "Segoe UI", Roboto';
        Chart.defaults.color = '#666';

        const reportData = {};
        const parallels = reportData.parallels;
"#,
        script_json(dataset)?
    );

    for chart in charts {
        js.push_str(&format!(
            "        new Chart(document.getElementById('{}'), {});\n",
            chart.canvas_id,
            script_json(&chart.config)?
        ));
    }

    js.push_str("    </script>\n</body>\n</html>\n");
    Ok(js)
}
