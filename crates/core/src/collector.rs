// Result bundle discovery
//
// Layout: <root>/<config>/<timestamp>/<model>/{benchmark_summary.json, benchmark_args.json}
// Anything that does not fit the layout is skipped, never an error.

use crate::artifacts::{ARGS_FILE, SUMMARY_FILE};
use std::fs;
use std::path::{Path, PathBuf};

/// One benchmark run directory with its position in the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Bundle {
    pub path: PathBuf,
    pub config: String,
    pub timestamp: String,
    pub model_dir: String,
}

impl Bundle {
    /// Build a bundle from a `config/timestamp/model` directory path
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name_at = |p: Option<&Path>| {
            p.and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        let timestamp_dir = path.parent();
        let config_dir = timestamp_dir.and_then(Path::parent);
        Self {
            model_dir: name_at(Some(path.as_path())),
            timestamp: name_at(timestamp_dir),
            config: name_at(config_dir),
            path,
        }
    }

    /// Short `config/timestamp` label for logs
    pub fn label(&self) -> String {
        format!("{}/{}", self.config, self.timestamp)
    }

    pub fn artifact(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    /// Both required artifacts exist
    pub fn is_complete(&self) -> bool {
        self.artifact(SUMMARY_FILE).is_file() && self.artifact(ARGS_FILE).is_file()
    }
}

/// Find every complete bundle under `root`, sorted by full path.
///
/// A missing root yields an empty list and a warning.
pub fn collect_bundles(root: &Path) -> Vec<Bundle> {
    if !root.is_dir() {
        tracing::warn!(root = %root.display(), "Results directory does not exist");
        return Vec::new();
    }

    let mut bundles = Vec::new();
    for config_dir in subdirectories(root) {
        for timestamp_dir in subdirectories(&config_dir) {
            for model_dir in subdirectories(&timestamp_dir) {
                let bundle = Bundle::from_path(model_dir);
                if bundle.is_complete() {
                    bundles.push(bundle);
                } else {
                    tracing::debug!(path = %bundle.path.display(), "Skipping incomplete bundle");
                }
            }
        }
    }

    bundles.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::info!(count = bundles.len(), root = %root.display(), "Discovered result bundles");
    bundles
}

fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "Cannot read directory");
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect()
}
