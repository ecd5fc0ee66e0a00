// Integration tests for a full aggregation run
//
// Builds a results tree on disk, runs the Aggregator, and checks the
// exported raw/stats files.

use runstats_core::memory::{InMemoryResourceReader, NoopResourceReader};
use runstats_core::{
    read_rows, AggregateConfig, Aggregator, DataKind, DataSelection, ExportFormat, ExportOutcome,
    ResourceMetrics,
};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

struct BundleSpec<'a> {
    config: &'a str,
    timestamp: &'a str,
    latency: f64,
    percentiles: Option<Value>,
}

fn write_bundle(root: &Path, spec: &BundleSpec<'_>) -> PathBuf {
    let dir = root.join(spec.config).join(spec.timestamp).join("qwen");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("benchmark_summary.json"),
        json!({
            "Total requests": 100,
            "Time taken for tests (s)": 10.0,
            "Request throughput (req/s)": 10.0,
            "Output token throughput (tok/s)": 512.5,
            "Average latency (s)": spec.latency,
            "Average time to first token (s)": 0.2
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("benchmark_args.json"),
        json!({"model": "qwen", "parallel": 4, "max_tokens": 128, "prompt": "hello"}).to_string(),
    )
    .unwrap();
    if let Some(percentiles) = &spec.percentiles {
        fs::write(dir.join("benchmark_percentile.json"), percentiles.to_string()).unwrap();
    }
    dir
}

fn results_tree(root: &Path) {
    write_bundle(
        root,
        &BundleSpec {
            config: "p4_short",
            timestamp: "20250101_000000",
            latency: 1.0,
            percentiles: Some(json!([{"Percentiles": "95%", "Latency (s)": 1.5}])),
        },
    );
    write_bundle(
        root,
        &BundleSpec {
            config: "p4_short",
            timestamp: "20250102_000000",
            latency: 3.0,
            percentiles: Some(json!([
                {"Percentiles": "95%", "Latency (s)": 3.5},
                {"Percentiles": "99%", "Latency (s)": 4.0}
            ])),
        },
    );
    write_bundle(
        root,
        &BundleSpec {
            config: "p8_long",
            timestamp: "20250101_000000",
            latency: 2.0,
            percentiles: None,
        },
    );
    // Missing benchmark_args.json: never collected
    let orphan = root.join("p16_long").join("20250101_000000").join("qwen");
    fs::create_dir_all(&orphan).unwrap();
    fs::write(orphan.join("benchmark_summary.json"), "{}").unwrap();
}

fn config_for(dir: &Path, format: ExportFormat) -> AggregateConfig {
    AggregateConfig::new(dir.join("results"))
        .with_format(format)
        .with_output_prefix(dir.join("out").join("summary").to_string_lossy())
}

#[tokio::test]
async fn test_aggregate_csv_both_datasets() {
    let dir = tempfile::tempdir().unwrap();
    results_tree(&dir.path().join("results"));
    fs::create_dir_all(dir.path().join("out")).unwrap();

    let config = config_for(dir.path(), ExportFormat::Csv);
    let report = Aggregator::new(config.clone(), NoopResourceReader)
        .run()
        .await
        .unwrap();

    assert_eq!(report.bundles, 3);
    assert_eq!(report.records.len(), 3);
    assert!(report.failures.is_empty());
    assert_eq!(report.statistics.len(), 2);
    assert_eq!(report.exports.len(), 2);

    let raw = read_rows(&config.output_path(DataKind::Raw)).unwrap();
    assert_eq!(raw.len(), 3);
    assert_eq!(raw[0]["config"], json!("p4_short"));
    assert_eq!(raw[0]["requests"], json!(100));
    assert_eq!(raw[0]["prompt_length"], json!("short"));
    // p99_latency only exists in the second record but is still a column
    assert_eq!(raw[0]["p95_latency"], json!(1.5));
    assert!(!raw[0].contains_key("p99_latency"));
    assert_eq!(raw[1]["p99_latency"], json!(4.0));
    // The p8_long record has no percentile table: empty cells are dropped.
    assert!(!raw[2].contains_key("p95_latency"));

    let stats = read_rows(&config.output_path(DataKind::Stats)).unwrap();
    assert_eq!(stats.len(), 2);
    let short = &stats[0];
    assert_eq!(short["config"], json!("p4_short"));
    assert_eq!(short["count"], json!(2));
    assert_eq!(short["latency_avg"], json!(2.0));
    assert_eq!(short["latency_min"], json!(1.0));
    assert_eq!(short["latency_max"], json!(3.0));
    let std = short["latency_std"].as_f64().unwrap();
    assert!((std - 2f64.sqrt()).abs() < 1e-9);
    assert_eq!(short["p95_latency_avg"], json!(2.5));
    assert_eq!(short["p99_latency_avg"], json!(4.0));
    assert_eq!(short["p99_latency_std"], json!(0.0));
}

#[tokio::test]
async fn test_aggregate_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    results_tree(&dir.path().join("results"));
    fs::create_dir_all(dir.path().join("out")).unwrap();

    let config = config_for(dir.path(), ExportFormat::Json).with_data(DataSelection::Raw);
    let report = Aggregator::new(config.clone(), NoopResourceReader)
        .run()
        .await
        .unwrap();

    assert_eq!(report.exports.len(), 1);
    assert!(!config.output_path(DataKind::Stats).exists());

    let reloaded = read_rows(&config.output_path(DataKind::Raw)).unwrap();
    let original: Vec<_> = report.records.iter().map(|r| r.to_row()).collect();
    assert_eq!(reloaded.len(), original.len());

    for (before, after) in original.iter().zip(&reloaded) {
        assert_eq!(
            before.keys().collect::<Vec<_>>(),
            after.keys().collect::<Vec<_>>()
        );
        for (key, value) in before {
            let reloaded_value = &after[key];
            match (value.as_f64(), reloaded_value.as_f64()) {
                (Some(a), Some(b)) => assert_eq!(a, b, "numeric mismatch for {}", key),
                _ => assert_eq!(value, reloaded_value, "mismatch for {}", key),
            }
        }
    }
}

#[tokio::test]
async fn test_aggregate_reads_resource_store() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("results");
    let bundle = write_bundle(
        &root,
        &BundleSpec {
            config: "p4_short",
            timestamp: "t1",
            latency: 1.0,
            percentiles: None,
        },
    );
    let store = bundle.join("benchmark_data.db");
    fs::write(&store, b"").unwrap();

    let reader = InMemoryResourceReader::new().with_metrics(
        &store,
        ResourceMetrics {
            avg_gpu_memory: 30.0,
            max_gpu_memory: 32.0,
            min_gpu_memory: 28.0,
        },
    );
    let config = config_for(dir.path(), ExportFormat::Csv);
    let report = Aggregator::new(config, reader).collect().await;

    assert_eq!(report.records.len(), 1);
    let stats = &report.statistics[0];
    assert_eq!(stats.field("avg_gpu_memory").unwrap().mean, 30.0);
    assert_eq!(stats.field("max_gpu_memory").unwrap().max, 32.0);
}

#[tokio::test]
async fn test_aggregate_empty_results_skips_export() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), ExportFormat::Csv);

    let report = Aggregator::new(config.clone(), NoopResourceReader)
        .run()
        .await
        .unwrap();

    assert!(report.is_empty());
    assert!(report.exports.is_empty());
    assert!(!config.output_path(DataKind::Raw).exists());
    assert!(!config.output_path(DataKind::Stats).exists());
}

#[tokio::test]
async fn test_aggregate_reports_broken_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("results");
    results_tree(&root);
    let broken = root.join("p8_long").join("20250101_000000").join("qwen");
    fs::write(broken.join("benchmark_args.json"), "{ nope").unwrap();
    fs::create_dir_all(dir.path().join("out")).unwrap();

    let config = config_for(dir.path(), ExportFormat::Csv);
    let report = Aggregator::new(config, NoopResourceReader)
        .run()
        .await
        .unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, broken);
    assert!(matches!(
        report.exports[0].1,
        ExportOutcome::Written { rows: 2, .. }
    ));
}

#[tokio::test]
async fn test_aggregate_csv_keeps_percentiles_when_first_group_has_none() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("results");
    write_bundle(
        &root,
        &BundleSpec {
            config: "a_short",
            timestamp: "t1",
            latency: 1.0,
            percentiles: None,
        },
    );
    write_bundle(
        &root,
        &BundleSpec {
            config: "b_long",
            timestamp: "t1",
            latency: 2.0,
            percentiles: Some(json!([{"Percentiles": "95%", "Latency (s)": 2.5}])),
        },
    );
    fs::create_dir_all(dir.path().join("out")).unwrap();

    let config = config_for(dir.path(), ExportFormat::Csv);
    Aggregator::new(config.clone(), NoopResourceReader)
        .run()
        .await
        .unwrap();

    let raw = read_rows(&config.output_path(DataKind::Raw)).unwrap();
    assert!(!raw[0].contains_key("p95_latency"));
    assert_eq!(raw[1]["p95_latency"], json!(2.5));

    let stats = read_rows(&config.output_path(DataKind::Stats)).unwrap();
    assert_eq!(stats[0]["config"], json!("a_short"));
    assert!(!stats[0].contains_key("p95_latency_avg"));
    assert_eq!(stats[1]["p95_latency_avg"], json!(2.5));
}

#[tokio::test]
async fn test_aggregate_unreadable_store_counts_as_zero_memory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("results");
    let readable = write_bundle(
        &root,
        &BundleSpec {
            config: "p4_short",
            timestamp: "t1",
            latency: 1.0,
            percentiles: None,
        },
    );
    let unreadable = write_bundle(
        &root,
        &BundleSpec {
            config: "p4_short",
            timestamp: "t2",
            latency: 1.0,
            percentiles: None,
        },
    );
    let store = readable.join("benchmark_data.db");
    fs::write(&store, b"").unwrap();
    fs::write(unreadable.join("benchmark_data.db"), b"").unwrap();

    let reader = InMemoryResourceReader::new().with_metrics(
        &store,
        ResourceMetrics {
            avg_gpu_memory: 20.0,
            max_gpu_memory: 20.0,
            min_gpu_memory: 20.0,
        },
    );
    let config = config_for(dir.path(), ExportFormat::Csv);
    let report = Aggregator::new(config, reader).collect().await;

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[1].resources, Some(ResourceMetrics::default()));
    let memory = report.statistics[0].field("avg_gpu_memory").unwrap();
    assert_eq!(memory.count, 2);
    assert_eq!(memory.mean, 10.0);
    assert_eq!(memory.min, 0.0);
    assert_eq!(report.statistics[0].to_row()["avg_gpu_memory_avg"], json!(10.0));
}
