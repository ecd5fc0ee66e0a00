// Canonical column naming for percentile metrics
//
// A percentile table row carries a label ("95%") and metric columns
// ("Latency (s)"). Both halves are normalized here and nowhere else:
//
//   percentile_key("95%", "Latency (s)")        == "p95_latency"
//   percentile_key("50%", "Output (tok/s)")     == "p50_output_(tok/s)"
//   percentile_key("p99", "TTFT (s)")           == "p99_ttft"

use regex::Regex;
use std::sync::LazyLock;

/// Unit suffix stripped from metric names
pub const SECONDS_SUFFIX: &str = "(s)";

static LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[pP]?\s*(\d+(?:\.\d+)?)\s*%?$").expect("percentile label pattern is valid")
});

/// Normalize a percentile label into its `pNN` form.
///
/// Numeric labels with or without `%` and with or without a leading `p`
/// map to `p{number}`. Anything else is lowercased with whitespace
/// collapsed to underscores and kept as-is.
pub fn percentile_label(label: &str) -> String {
    let trimmed = label.trim();
    match LABEL_PATTERN.captures(trimmed) {
        Some(caps) => format!("p{}", &caps[1]),
        None => sanitize_metric_name(trimmed),
    }
}

/// Sanitize a metric column name: drop the literal `(s)` unit, lowercase,
/// and join whitespace-separated words with `_`.
pub fn sanitize_metric_name(metric: &str) -> String {
    metric
        .replace(SECONDS_SUFFIX, "")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Build the canonical record key for one percentile table cell.
pub fn percentile_key(label: &str, metric: &str) -> String {
    format!("{}_{}", percentile_label(label), sanitize_metric_name(metric))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_key_strips_seconds_unit() {
        assert_eq!(percentile_key("95%", "Latency (s)"), "p95_latency");
        assert_eq!(percentile_key("99%", "TTFT (s)"), "p99_ttft");
    }

    #[test]
    fn test_percentile_key_keeps_other_units() {
        assert_eq!(
            percentile_key("50%", "Output (tok/s)"),
            "p50_output_(tok/s)"
        );
    }

    #[test]
    fn test_percentile_label_forms() {
        assert_eq!(percentile_label("10%"), "p10");
        assert_eq!(percentile_label(" 25 % "), "p25");
        assert_eq!(percentile_label("p66"), "p66");
        assert_eq!(percentile_label("P80%"), "p80");
        assert_eq!(percentile_label("99.9%"), "p99.9");
        assert_eq!(percentile_label("Max Value"), "max_value");
    }

    #[test]
    fn test_sanitize_metric_name() {
        assert_eq!(sanitize_metric_name("Input tokens"), "input_tokens");
        assert_eq!(sanitize_metric_name("ITL (s)"), "itl");
        assert_eq!(sanitize_metric_name("  Decode   speed "), "decode_speed");
    }
}
